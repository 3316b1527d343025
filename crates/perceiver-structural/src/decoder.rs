//! Per-document tree view over a [`DomSnapshot`].
//!
//! Strings stay in the shared table and are resolved on access; the only structures built
//! eagerly are the child adjacency list, the node→layout index and the rare-table lookups.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::rect::Rect;
use crate::snapshot::{
    DocumentSnapshot, DomSnapshot, RareBooleanData, StringTable, ELEMENT_NODE,
};

/// Attribute name → value; `None` when the snapshot carries the name without a value.
pub type Attributes = BTreeMap<String, Option<String>>;

/// All documents of one snapshot, decoded once and shared by every later stage.
pub struct DecodedSnapshot<'a> {
    pub strings: StringTable<'a>,
    pub documents: Vec<DocumentTree<'a>>,
}

impl<'a> DecodedSnapshot<'a> {
    pub fn new(snapshot: &'a DomSnapshot, queried_styles: &'a [String]) -> Self {
        let strings = StringTable::new(&snapshot.strings);
        let documents = snapshot
            .documents
            .iter()
            .map(|doc| DocumentTree::new(doc, strings, queried_styles))
            .collect();
        Self { strings, documents }
    }
}

pub struct DocumentTree<'a> {
    doc: &'a DocumentSnapshot,
    strings: StringTable<'a>,
    queried_styles: &'a [String],
    children: Vec<Vec<usize>>,
    layout_by_node: HashMap<usize, usize>,
    root: Option<usize>,
    checked: HashSet<usize>,
    option_selected: HashSet<usize>,
    clickable: HashSet<usize>,
}

fn rare_set(table: Option<&RareBooleanData>) -> HashSet<usize> {
    table
        .map(|t| t.index.iter().filter_map(|&i| usize::try_from(i).ok()).collect())
        .unwrap_or_default()
}

impl<'a> DocumentTree<'a> {
    pub fn new(
        doc: &'a DocumentSnapshot,
        strings: StringTable<'a>,
        queried_styles: &'a [String],
    ) -> Self {
        let nodes = &doc.nodes;
        let count = nodes.parent_index.len();

        let mut children = vec![Vec::new(); count];
        for (idx, &parent) in nodes.parent_index.iter().enumerate() {
            if let Some(list) = usize::try_from(parent).ok().and_then(|p| children.get_mut(p)) {
                list.push(idx);
            }
        }

        let mut layout_by_node = HashMap::with_capacity(doc.layout.node_index.len());
        for (layout_idx, &node) in doc.layout.node_index.iter().enumerate() {
            if let Ok(node) = usize::try_from(node) {
                layout_by_node.entry(node).or_insert(layout_idx);
            }
        }

        let root = (0..count).find(|&idx| {
            nodes.node_type.get(idx).copied() == Some(ELEMENT_NODE)
                && nodes.parent_index.get(idx).copied() == Some(0)
        });

        Self {
            doc,
            strings,
            queried_styles,
            children,
            layout_by_node,
            root,
            checked: rare_set(nodes.input_checked.as_ref()),
            option_selected: rare_set(nodes.option_selected.as_ref()),
            clickable: rare_set(nodes.is_clickable.as_ref()),
        }
    }

    pub fn snapshot(&self) -> &'a DocumentSnapshot {
        self.doc
    }

    pub fn strings(&self) -> StringTable<'a> {
        self.strings
    }

    pub fn frame_id(&self) -> &'a str {
        self.strings.get(self.doc.frame_id).unwrap_or_default()
    }

    pub fn content_size(&self) -> Rect {
        Rect::from_cdp(&[0.0, 0.0, self.doc.content_width, self.doc.content_height])
    }

    pub fn node_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self, node: usize) -> &[usize] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.doc
            .nodes
            .parent_index
            .get(node)
            .and_then(|&p| usize::try_from(p).ok())
    }

    pub fn node_type(&self, node: usize) -> i32 {
        self.doc.nodes.node_type.get(node).copied().unwrap_or(0)
    }

    pub fn node_name(&self, node: usize) -> Option<&'a str> {
        self.doc
            .nodes
            .node_name
            .get(node)
            .and_then(|&i| self.strings.get(i))
    }

    pub fn node_value(&self, node: usize) -> Option<&'a str> {
        self.doc
            .nodes
            .node_value
            .get(node)
            .and_then(|&i| self.strings.get(i))
    }

    pub fn backend_node_id(&self, node: usize) -> i64 {
        self.doc
            .nodes
            .backend_node_id
            .get(node)
            .copied()
            .unwrap_or_default()
    }

    /// Pairs the flat attribute list into a map.
    pub fn attributes(&self, node: usize) -> Attributes {
        let Some(flat) = self.doc.nodes.attributes.get(node) else {
            return Attributes::new();
        };
        flat.chunks_exact(2)
            .filter_map(|pair| {
                let name = self.strings.get(pair[0])?;
                let value = self.strings.get(pair[1]).map(str::to_string);
                Some((name.to_string(), value))
            })
            .collect()
    }

    pub fn is_checked(&self, node: usize) -> bool {
        self.checked.contains(&node)
    }

    pub fn is_option_selected(&self, node: usize) -> bool {
        self.option_selected.contains(&node)
    }

    pub fn is_clickable(&self, node: usize) -> bool {
        self.clickable.contains(&node)
    }

    /// Current value of a text-like control, if the snapshot recorded one.
    pub fn input_value(&self, node: usize) -> Option<&'a str> {
        let table = self.doc.nodes.input_value.as_ref()?;
        let pos = table.index.iter().position(|&i| i as i64 == node as i64)?;
        table.value.get(pos).and_then(|&s| self.strings.get(s))
    }

    /// `(host node, child document index)` pairs for every iframe-like node.
    pub fn content_documents(&self) -> Vec<(usize, usize)> {
        let Some(table) = self.doc.nodes.content_document_index.as_ref() else {
            return Vec::new();
        };
        table
            .index
            .iter()
            .zip(&table.value)
            .filter_map(|(&node, &doc)| {
                Some((usize::try_from(node).ok()?, usize::try_from(doc).ok()?))
            })
            .collect()
    }

    pub fn layout_index(&self, node: usize) -> Option<usize> {
        self.layout_by_node.get(&node).copied()
    }

    pub fn is_rendered(&self, node: usize) -> bool {
        self.layout_by_node.contains_key(&node)
    }

    /// Layout entries in snapshot order as `(layout index, node index)`.
    pub fn layout_nodes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.doc
            .layout
            .node_index
            .iter()
            .enumerate()
            .filter_map(|(layout_idx, &node)| Some((layout_idx, usize::try_from(node).ok()?)))
    }

    pub fn style(&self, layout_idx: usize, name: &str) -> Option<&'a str> {
        let pos = self.queried_styles.iter().position(|s| s == name)?;
        let idx = *self.doc.layout.styles.get(layout_idx)?.get(pos)?;
        self.strings.get(idx)
    }

    pub fn styles(&self, layout_idx: usize) -> BTreeMap<String, String> {
        let Some(values) = self.doc.layout.styles.get(layout_idx) else {
            return BTreeMap::new();
        };
        self.queried_styles
            .iter()
            .zip(values)
            .filter_map(|(name, &idx)| Some((name.clone(), self.strings.get(idx)?.to_string())))
            .collect()
    }

    pub fn layout_text(&self, layout_idx: usize) -> Option<&'a str> {
        self.doc
            .layout
            .text
            .get(layout_idx)
            .and_then(|&i| self.strings.get(i))
    }

    pub fn bounds(&self, layout_idx: usize) -> Rect {
        rect_at(&self.doc.layout.bounds, layout_idx)
    }

    pub fn client_rect(&self, layout_idx: usize) -> Rect {
        rect_at(&self.doc.layout.client_rects, layout_idx)
    }

    pub fn scroll_rect(&self, layout_idx: usize) -> Rect {
        rect_at(&self.doc.layout.scroll_rects, layout_idx)
    }

    /// The document element: first ELEMENT whose parent is the document node.
    pub fn root_node(&self) -> Option<usize> {
        self.root
    }

    /// `(client rect, scroll rect)` of the document element, if it is laid out.
    pub fn root_rects(&self) -> Option<(Rect, Rect)> {
        let layout_idx = self.layout_index(self.root?)?;
        Some((self.client_rect(layout_idx), self.scroll_rect(layout_idx)))
    }
}

fn rect_at(rects: &[Vec<f64>], idx: usize) -> Rect {
    rects
        .get(idx)
        .map(|r| Rect::from_cdp(r))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SnapshotBuilder;

    #[test]
    fn adjacency_preserves_child_order() {
        let mut b = SnapshotBuilder::new(800, 600);
        let html = b.root_html();
        let body = b.element(html, "BODY", &[]);
        let first = b.element(body, "DIV", &[]);
        let second = b.element(body, "SPAN", &[]);
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        let tree = &decoded.documents[0];

        assert_eq!(tree.children(0), &[html]);
        assert_eq!(tree.children(body), &[first, second]);
        assert_eq!(tree.root_node(), Some(html));
        assert_eq!(tree.node_name(second), Some("SPAN"));
        assert_eq!(tree.frame_id(), "main");
    }

    #[test]
    fn attributes_pair_names_with_optional_values() {
        let mut b = SnapshotBuilder::new(800, 600);
        let html = b.root_html();
        let input = b.element(html, "INPUT", &[("type", Some("checkbox")), ("disabled", None)]);
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        let attrs = decoded.documents[0].attributes(input);

        assert_eq!(attrs.get("type"), Some(&Some("checkbox".to_string())));
        assert_eq!(attrs.get("disabled"), Some(&None));
        assert!(!attrs.contains_key("value"));
    }

    #[test]
    fn missing_root_is_reported_as_none() {
        let mut b = SnapshotBuilder::new(800, 600);
        b.orphan_text("loose");
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        assert!(decoded.documents[0].root_node().is_none());
        assert!(decoded.documents[0].root_rects().is_none());
    }
}
