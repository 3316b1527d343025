use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decoder::Attributes;
use crate::rect::Rect;

/// A laid-out element decoded from one document of a snapshot.
///
/// `node_id` and `parent_id` are indices into that document's node table and are only
/// meaningful within the same frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub frame_id: String,
    pub parent_id: Option<usize>,
    pub node_id: usize,
    pub backend_node_id: i64,
    pub name: String,
    pub attributes: Attributes,
    pub styles: BTreeMap<String, String>,
    pub bounds: Rect,
    pub is_clickable: bool,
    pub can_scroll_up: bool,
    pub can_scroll_down: bool,
    pub can_scroll_left: bool,
    pub can_scroll_right: bool,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Plain,
    TextInput {
        text: String,
    },
    CheckableInput {
        value: String,
        selected: bool,
    },
    Select {
        is_multi_select: bool,
        options: Vec<String>,
        option_values: Vec<String>,
        selected_option_indices: Vec<usize>,
    },
}

impl Element {
    /// Attribute value; `None` both when absent and when present without a value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_scrollable(&self) -> bool {
        self.can_scroll_up || self.can_scroll_down || self.can_scroll_left || self.can_scroll_right
    }

    pub fn can_scroll(&self, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Up => self.can_scroll_up,
            ScrollDirection::Down => self.can_scroll_down,
            ScrollDirection::Left => self.can_scroll_left,
            ScrollDirection::Right => self.can_scroll_right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::Left => "left",
            ScrollDirection::Right => "right",
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrollDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            "left" => Ok(ScrollDirection::Left),
            "right" => Ok(ScrollDirection::Right),
            other => Err(format!("invalid scroll direction: {other}")),
        }
    }
}
