//! Wire model of `DOMSnapshot.captureSnapshot`.
//!
//! Every string-valued field is an index into [`DomSnapshot::strings`]; `-1` means absent.
//! Only the fields the tagger reads are modelled, everything else is ignored on decode.

use serde::{Deserialize, Serialize};

pub const ELEMENT_NODE: i32 = 1;
pub const TEXT_NODE: i32 = 3;

/// Index into the shared string table.
pub type StringIndex = i32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshot {
    #[serde(default)]
    pub documents: Vec<DocumentSnapshot>,
    #[serde(default)]
    pub strings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSnapshot {
    pub frame_id: StringIndex,
    pub nodes: NodeTreeSnapshot,
    pub layout: LayoutTreeSnapshot,
    pub content_width: f64,
    pub content_height: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeTreeSnapshot {
    pub parent_index: Vec<i32>,
    pub node_type: Vec<i32>,
    pub node_name: Vec<StringIndex>,
    pub node_value: Vec<StringIndex>,
    pub backend_node_id: Vec<i64>,
    /// Flat `[name, value, name, value, ...]` string indices per node.
    pub attributes: Vec<Vec<StringIndex>>,
    pub input_value: Option<RareStringData>,
    pub input_checked: Option<RareBooleanData>,
    pub option_selected: Option<RareBooleanData>,
    pub content_document_index: Option<RareIntegerData>,
    pub is_clickable: Option<RareBooleanData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutTreeSnapshot {
    pub node_index: Vec<i32>,
    /// Computed style values in the order they were requested.
    pub styles: Vec<Vec<StringIndex>>,
    pub bounds: Vec<Vec<f64>>,
    pub text: Vec<StringIndex>,
    pub offset_rects: Vec<Vec<f64>>,
    pub scroll_rects: Vec<Vec<f64>>,
    pub client_rects: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RareStringData {
    pub index: Vec<i32>,
    pub value: Vec<StringIndex>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RareBooleanData {
    pub index: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RareIntegerData {
    pub index: Vec<i32>,
    pub value: Vec<i32>,
}

/// Borrowed view over the snapshot's shared string table.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    strings: &'a [String],
}

impl<'a> StringTable<'a> {
    pub fn new(strings: &'a [String]) -> Self {
        Self { strings }
    }

    pub fn get(&self, index: StringIndex) -> Option<&'a str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
