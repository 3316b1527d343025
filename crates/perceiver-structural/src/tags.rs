//! Externally visible tag model built from confirmed elements.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::element::{Element, ElementKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseTag {
    pub tag_name: String,
    pub annotation_number: i64,
    pub inner_text: String,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub html_id: Option<String>,
    #[serde(default)]
    pub html_class: Option<String>,
    #[serde(default)]
    pub can_scroll_up: bool,
    #[serde(default)]
    pub can_scroll_down: bool,
    #[serde(default)]
    pub can_scroll_left: bool,
    #[serde(default)]
    pub can_scroll_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorTag {
    #[serde(flatten)]
    pub base: BaseTag,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTag {
    #[serde(flatten)]
    pub base: BaseTag,
    #[serde(rename = "type", default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectTag {
    #[serde(flatten)]
    pub base: BaseTag,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagKind {
    Base,
    Anchor,
    Input,
    Select,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Base => "BASE",
            TagKind::Anchor => "ANCHOR",
            TagKind::Input => "INPUT",
            TagKind::Select => "SELECT",
        }
    }
}

/// One tag per confirmed element. Serialized flat, discriminated by `tag_name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Tag {
    Anchor(AnchorTag),
    Input(InputTag),
    Select(SelectTag),
    Base(BaseTag),
}

impl Tag {
    pub fn from_element(annotation_number: i64, element: &Element, inner_text: String) -> Tag {
        let mut base = BaseTag {
            tag_name: element.name.clone(),
            annotation_number,
            inner_text,
            aria_label: None,
            html_id: element.attr("id").map(str::to_string),
            html_class: element.attr("class").map(str::to_string),
            can_scroll_up: element.can_scroll_up,
            can_scroll_down: element.can_scroll_down,
            can_scroll_left: element.can_scroll_left,
            can_scroll_right: element.can_scroll_right,
        };
        let aria_label = element.attr("aria-label").map(str::to_string);

        match &element.kind {
            // a TEXTAREA keeps its own name and the plain base shape
            ElementKind::TextInput { .. } | ElementKind::CheckableInput { .. }
                if !element.is_named("input") =>
            {
                Tag::Base(base)
            }
            ElementKind::TextInput { text } => Tag::Input(InputTag {
                base: BaseTag {
                    tag_name: "INPUT".into(),
                    aria_label,
                    ..base
                },
                input_type: element.attr("type").map(str::to_string),
                value: Some(text.clone()),
                placeholder: element.attr("placeholder").map(str::to_string),
            }),
            ElementKind::CheckableInput { selected, .. } => Tag::Input(InputTag {
                base: BaseTag {
                    tag_name: "INPUT".into(),
                    aria_label,
                    ..base
                },
                input_type: element.attr("type").map(str::to_string),
                value: Some(selected.to_string()),
                placeholder: element.attr("placeholder").map(str::to_string),
            }),
            ElementKind::Select { options, .. } => Tag::Select(SelectTag {
                base: BaseTag {
                    tag_name: "SELECT".into(),
                    aria_label,
                    ..base
                },
                options: options.clone(),
            }),
            ElementKind::Plain if element.is_named("a") => {
                base.tag_name = "A".into();
                base.aria_label = aria_label;
                Tag::Anchor(AnchorTag {
                    base,
                    role: element.attr("role").map(str::to_string),
                })
            }
            ElementKind::Plain => Tag::Base(base),
        }
    }

    /// Parses a serialized tag, falling back to the base shape when the
    /// kind-specific one does not fit.
    pub fn from_json(value: &Value) -> Result<Tag, serde_json::Error> {
        fn specific<T: DeserializeOwned>(value: &Value) -> Option<T> {
            serde_json::from_value(value.clone()).ok()
        }
        let parsed = match value.get("tag_name").and_then(Value::as_str) {
            Some("A") => specific(value).map(Tag::Anchor),
            Some("INPUT") => specific(value).map(Tag::Input),
            Some("SELECT") => specific(value).map(Tag::Select),
            _ => None,
        };
        match parsed {
            Some(tag) => Ok(tag),
            None => serde_json::from_value(value.clone()).map(Tag::Base),
        }
    }

    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Anchor(_) => TagKind::Anchor,
            Tag::Input(_) => TagKind::Input,
            Tag::Select(_) => TagKind::Select,
            Tag::Base(_) => TagKind::Base,
        }
    }

    pub fn base(&self) -> &BaseTag {
        match self {
            Tag::Anchor(tag) => &tag.base,
            Tag::Input(tag) => &tag.base,
            Tag::Select(tag) => &tag.base,
            Tag::Base(tag) => tag,
        }
    }

    pub fn annotation_number(&self) -> i64 {
        self.base().annotation_number
    }

    pub fn tag_name(&self) -> &str {
        &self.base().tag_name
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Tag::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn element(name: &str, attrs: &[(&str, &str)], kind: ElementKind) -> Element {
        Element {
            frame_id: "main".into(),
            parent_id: None,
            node_id: 3,
            backend_node_id: 30,
            name: name.into(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
            styles: BTreeMap::new(),
            bounds: Rect::new(0, 0, 10, 10),
            is_clickable: false,
            can_scroll_up: false,
            can_scroll_down: false,
            can_scroll_left: false,
            can_scroll_right: false,
            kind,
        }
    }

    #[test]
    fn checkbox_value_is_lowercase_selection_state() {
        let checkbox = element(
            "INPUT",
            &[("type", "checkbox"), ("aria-label", "Agree")],
            ElementKind::CheckableInput {
                value: "on".into(),
                selected: true,
            },
        );
        let tag = Tag::from_element(0, &checkbox, String::new());
        assert_eq!(tag.kind(), TagKind::Input);
        let Tag::Input(input) = &tag else {
            panic!("expected input tag");
        };
        assert_eq!(input.value.as_deref(), Some("true"));
        assert_eq!(input.input_type.as_deref(), Some("checkbox"));
        assert_eq!(input.base.aria_label.as_deref(), Some("Agree"));
    }

    #[test]
    fn textarea_is_a_base_tag_under_its_own_name() {
        let area = element(
            "TEXTAREA",
            &[("placeholder", "Say hi"), ("aria-label", "Message"), ("id", "msg")],
            ElementKind::TextInput { text: "hello".into() },
        );
        let tag = Tag::from_element(4, &area, "hello".into());
        assert_eq!(tag.kind(), TagKind::Base);
        assert_eq!(tag.tag_name(), "TEXTAREA");
        assert_eq!(tag.base().html_id.as_deref(), Some("msg"));
        assert_eq!(tag.base().aria_label, None);

        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["tag_name"], "TEXTAREA");
        assert!(json.get("type").is_none());
        assert!(json.get("value").is_none());
    }

    #[test]
    fn anchors_and_plain_elements() {
        let link = element("A", &[("role", "button"), ("id", "go")], ElementKind::Plain);
        let tag = Tag::from_element(1, &link, "Go".into());
        assert_eq!(tag.kind(), TagKind::Anchor);
        assert_eq!(tag.base().html_id.as_deref(), Some("go"));

        let mut div = element("DIV", &[("aria-label", "ignored"), ("class", "card")], ElementKind::Plain);
        div.can_scroll_down = true;
        let tag = Tag::from_element(2, &div, "Card".into());
        assert_eq!(tag.kind(), TagKind::Base);
        assert_eq!(tag.tag_name(), "DIV");
        assert_eq!(tag.base().aria_label, None);
        assert_eq!(tag.base().html_class.as_deref(), Some("card"));
        assert!(tag.base().can_scroll_down);
    }

    #[test]
    fn serializes_flat_and_parses_back() {
        let select = element(
            "SELECT",
            &[],
            ElementKind::Select {
                is_multi_select: false,
                options: vec!["Red".into(), "Blue".into()],
                option_values: vec!["r".into(), "b".into()],
                selected_option_indices: vec![0],
            },
        );
        let tag = Tag::from_element(7, &select, "Red".into());
        let json = serde_json::to_value(&tag).expect("serialize");
        assert_eq!(json["tag_name"], "SELECT");
        assert_eq!(json["options"], json!(["Red", "Blue"]));
        assert!(json.get("base").is_none());
        assert_eq!(Tag::from_json(&json).expect("parse"), tag);
    }

    #[test]
    fn mismatched_shape_falls_back_to_base() {
        let raw = json!({
            "tag_name": "SELECT",
            "annotation_number": 3,
            "inner_text": "pick one"
        });
        let tag: Tag = serde_json::from_value(raw).expect("parse");
        assert_eq!(tag.kind(), TagKind::Base);
        assert_eq!(tag.annotation_number(), 3);

        assert!(Tag::from_json(&json!({ "tag_name": "DIV" })).is_err());
    }
}
