use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::element::Element;
use crate::tags::Tag;

/// Elements confirmed by one tagging pass, addressed by annotation number.
///
/// Numbers run from `first_annotation` up to `first_annotation + len - 1`; anything
/// outside that range belongs to another pass and is rejected.
#[derive(Debug, Clone, Default)]
pub struct TaggedElements {
    first_annotation: i64,
    elements: Vec<Element>,
    points: HashMap<i64, (i32, i32)>,
}

impl TaggedElements {
    pub fn new(first_annotation: i64) -> Self {
        Self {
            first_annotation,
            ..Self::default()
        }
    }

    /// Appends a confirmed element with its hit point and returns its annotation number.
    pub fn push(&mut self, element: Element, point: (i32, i32)) -> i64 {
        let annotation = self.next_annotation();
        self.elements.push(element);
        self.points.insert(annotation, point);
        annotation
    }

    pub fn first_annotation(&self) -> i64 {
        self.first_annotation
    }

    pub fn next_annotation(&self) -> i64 {
        self.first_annotation + self.elements.len() as i64
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, annotation: i64) -> Option<&Element> {
        let offset = annotation.checked_sub(self.first_annotation)?;
        usize::try_from(offset)
            .ok()
            .and_then(|idx| self.elements.get(idx))
    }

    /// Root-document point where the element was confirmed visible.
    pub fn point_for(&self, annotation: i64) -> Option<(i32, i32)> {
        self.points.get(&annotation).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(move |(idx, element)| (self.first_annotation + idx as i64, element))
    }
}

/// Tags keyed by stringified annotation number, kept in tagging order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap(pub Vec<Tag>);

impl TagMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        let annotation: i64 = key.parse().ok()?;
        self.0.iter().find(|t| t.annotation_number() == annotation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &Tag)> {
        self.0
            .iter()
            .map(|tag| (tag.annotation_number().to_string(), tag))
    }

    pub fn tags(&self) -> &[Tag] {
        &self.0
    }
}

impl Serialize for TagMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, tag) in self.iter() {
            map.serialize_entry(&key, tag)?;
        }
        map.end()
    }
}
