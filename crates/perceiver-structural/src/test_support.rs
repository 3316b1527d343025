//! Programmatic snapshot construction for tests in this and downstream crates.

use std::collections::{BTreeMap, HashMap};

use crate::rect::Rect;
use crate::snapshot::{
    DocumentSnapshot, DomSnapshot, LayoutTreeSnapshot, NodeTreeSnapshot, RareBooleanData,
    RareIntegerData, RareStringData, ELEMENT_NODE, TEXT_NODE,
};
use crate::tagger::default_queried_styles;

const DOCUMENT_NODE: i32 = 9;

struct NodeSpec {
    parent: i32,
    node_type: i32,
    name: String,
    value: Option<String>,
    backend: i64,
    attrs: Vec<(String, Option<String>)>,
    layout: Option<LayoutSpec>,
}

struct LayoutSpec {
    bounds: Rect,
    client: Rect,
    scroll: Rect,
    styles: BTreeMap<String, String>,
    text: Option<String>,
}

struct DocSpec {
    frame_id: String,
    width: i32,
    height: i32,
    nodes: Vec<NodeSpec>,
    checked: Vec<usize>,
    selected: Vec<usize>,
    clickable: Vec<usize>,
    input_values: Vec<(usize, String)>,
    content_docs: Vec<(usize, usize)>,
}

impl DocSpec {
    fn new(frame_id: &str, width: i32, height: i32) -> Self {
        Self {
            frame_id: frame_id.to_string(),
            width,
            height,
            nodes: Vec::new(),
            checked: Vec::new(),
            selected: Vec::new(),
            clickable: Vec::new(),
            input_values: Vec::new(),
            content_docs: Vec::new(),
        }
    }
}

fn default_styles(element: bool) -> BTreeMap<String, String> {
    let mut styles = BTreeMap::new();
    for name in default_queried_styles() {
        let value = match name.as_str() {
            "display" if element => "block",
            "display" => "inline",
            "visibility" | "overflow-x" | "overflow-y" => "visible",
            "cursor" | "pointer-events" | "z-index" => "auto",
            "white-space" => "normal",
            "opacity" => "1",
            "transform" | "clip-path" => "none",
            _ => "0px",
        };
        styles.insert(name, value.to_string());
    }
    styles
}

/// Builds a [`DomSnapshot`] document by document. Node indices returned by the builder
/// are indices into the current document's node table.
pub struct SnapshotBuilder {
    docs: Vec<DocSpec>,
    current: usize,
    next_backend: i64,
}

impl SnapshotBuilder {
    /// Starts with the main document (`frameId` "main") and its `#document` node.
    pub fn new(width: i32, height: i32) -> Self {
        let mut builder = Self {
            docs: Vec::new(),
            current: 0,
            next_backend: 1,
        };
        builder.add_document("main", width, height);
        builder.select_document(0);
        builder
    }

    /// Adds a document (with its `#document` node) and returns its index.
    pub fn add_document(&mut self, frame_id: &str, width: i32, height: i32) -> usize {
        let mut doc = DocSpec::new(frame_id, width, height);
        doc.nodes.push(NodeSpec {
            parent: -1,
            node_type: DOCUMENT_NODE,
            name: "#document".into(),
            value: None,
            backend: self.next_backend,
            attrs: Vec::new(),
            layout: None,
        });
        self.next_backend += 1;
        self.docs.push(doc);
        self.docs.len() - 1
    }

    pub fn select_document(&mut self, index: usize) {
        self.current = index;
    }

    fn doc(&mut self) -> &mut DocSpec {
        &mut self.docs[self.current]
    }

    fn push(&mut self, spec: NodeSpec) -> usize {
        let doc = self.doc();
        doc.nodes.push(spec);
        doc.nodes.len() - 1
    }

    /// `<html>` laid out over the whole content size, with matching client and scroll rects.
    pub fn root_html(&mut self) -> usize {
        let (w, h) = (self.doc().width, self.doc().height);
        let html = self.element(0, "HTML", &[]);
        self.layout(html, Rect::new(0, 0, w, h));
        self.scroll(html, Rect::new(0, 0, w, h), Rect::new(0, 0, w, h));
        html
    }

    /// Adds an element without a layout entry.
    pub fn element(&mut self, parent: usize, name: &str, attrs: &[(&str, Option<&str>)]) -> usize {
        let backend = self.next_backend;
        self.next_backend += 1;
        self.push(NodeSpec {
            parent: parent as i32,
            node_type: ELEMENT_NODE,
            name: name.to_string(),
            value: None,
            backend,
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            layout: None,
        })
    }

    /// Adds a laid-out element with default computed styles.
    pub fn boxed(
        &mut self,
        parent: usize,
        name: &str,
        attrs: &[(&str, Option<&str>)],
        bounds: Rect,
    ) -> usize {
        let node = self.element(parent, name, attrs);
        self.layout(node, bounds);
        node
    }

    /// Adds a laid-out text node; layout text equals the node value.
    pub fn text(&mut self, parent: usize, value: &str) -> usize {
        let node = self.unrendered_text(parent, value);
        let styles = default_styles(false);
        self.doc().nodes[node].layout = Some(LayoutSpec {
            bounds: Rect::default(),
            client: Rect::default(),
            scroll: Rect::default(),
            styles,
            text: Some(value.to_string()),
        });
        node
    }

    pub fn unrendered_text(&mut self, parent: usize, value: &str) -> usize {
        let backend = self.next_backend;
        self.next_backend += 1;
        self.push(NodeSpec {
            parent: parent as i32,
            node_type: TEXT_NODE,
            name: "#text".into(),
            value: Some(value.to_string()),
            backend,
            attrs: Vec::new(),
            layout: None,
        })
    }

    /// A text node hanging off the `#document` node, which never forms a root element.
    pub fn orphan_text(&mut self, value: &str) -> usize {
        self.unrendered_text(0, value)
    }

    pub fn layout(&mut self, node: usize, bounds: Rect) -> &mut Self {
        let element = self.doc().nodes[node].node_type == ELEMENT_NODE;
        self.doc().nodes[node].layout = Some(LayoutSpec {
            bounds,
            client: Rect::default(),
            scroll: Rect::default(),
            styles: default_styles(element),
            text: None,
        });
        self
    }

    pub fn style(&mut self, node: usize, name: &str, value: &str) -> &mut Self {
        if let Some(layout) = self.doc().nodes[node].layout.as_mut() {
            layout.styles.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn scroll(&mut self, node: usize, client: Rect, scroll: Rect) -> &mut Self {
        if let Some(layout) = self.doc().nodes[node].layout.as_mut() {
            layout.client = client;
            layout.scroll = scroll;
        }
        self
    }

    pub fn checked(&mut self, node: usize) -> &mut Self {
        self.doc().checked.push(node);
        self
    }

    pub fn option_selected(&mut self, node: usize) -> &mut Self {
        self.doc().selected.push(node);
        self
    }

    pub fn clickable(&mut self, node: usize) -> &mut Self {
        self.doc().clickable.push(node);
        self
    }

    pub fn input_value(&mut self, node: usize, value: &str) -> &mut Self {
        self.doc().input_values.push((node, value.to_string()));
        self
    }

    /// Marks `host` (in the current document) as hosting document `child_doc`.
    pub fn host_document(&mut self, host: usize, child_doc: usize) -> &mut Self {
        self.doc().content_docs.push((host, child_doc));
        self
    }

    pub fn backend_id(&self, node: usize) -> i64 {
        self.docs[self.current].nodes[node].backend
    }

    pub fn styles(&self) -> Vec<String> {
        default_queried_styles()
    }

    pub fn build(&self) -> DomSnapshot {
        let queried = default_queried_styles();
        let mut strings: Vec<String> = Vec::new();
        let mut interned: HashMap<String, i32> = HashMap::new();
        let mut intern = |s: &str| -> i32 {
            if let Some(&idx) = interned.get(s) {
                return idx;
            }
            strings.push(s.to_string());
            let idx = strings.len() as i32 - 1;
            interned.insert(s.to_string(), idx);
            idx
        };

        let mut documents = Vec::new();
        for doc in &self.docs {
            let mut nodes = NodeTreeSnapshot::default();
            let mut layout = LayoutTreeSnapshot::default();

            for (idx, node) in doc.nodes.iter().enumerate() {
                nodes.parent_index.push(node.parent);
                nodes.node_type.push(node.node_type);
                nodes.node_name.push(intern(&node.name));
                nodes
                    .node_value
                    .push(node.value.as_deref().map(&mut intern).unwrap_or(-1));
                nodes.backend_node_id.push(node.backend);
                let mut flat = Vec::new();
                for (name, value) in &node.attrs {
                    flat.push(intern(name));
                    flat.push(value.as_deref().map(&mut intern).unwrap_or(-1));
                }
                nodes.attributes.push(flat);

                if let Some(spec) = &node.layout {
                    layout.node_index.push(idx as i32);
                    layout.styles.push(
                        queried
                            .iter()
                            .map(|name| spec.styles.get(name).map(|v| intern(v)).unwrap_or(-1))
                            .collect(),
                    );
                    layout.bounds.push(rect_vec(spec.bounds));
                    layout.offset_rects.push(Vec::new());
                    layout.client_rects.push(rect_vec(spec.client));
                    layout.scroll_rects.push(rect_vec(spec.scroll));
                    layout
                        .text
                        .push(spec.text.as_deref().map(&mut intern).unwrap_or(-1));
                }
            }

            let as_i32 = |v: &Vec<usize>| v.iter().map(|&n| n as i32).collect::<Vec<_>>();
            if !doc.checked.is_empty() {
                nodes.input_checked = Some(RareBooleanData {
                    index: as_i32(&doc.checked),
                });
            }
            if !doc.selected.is_empty() {
                nodes.option_selected = Some(RareBooleanData {
                    index: as_i32(&doc.selected),
                });
            }
            if !doc.clickable.is_empty() {
                nodes.is_clickable = Some(RareBooleanData {
                    index: as_i32(&doc.clickable),
                });
            }
            if !doc.input_values.is_empty() {
                nodes.input_value = Some(RareStringData {
                    index: doc.input_values.iter().map(|(n, _)| *n as i32).collect(),
                    value: doc.input_values.iter().map(|(_, v)| intern(v)).collect(),
                });
            }
            if !doc.content_docs.is_empty() {
                nodes.content_document_index = Some(RareIntegerData {
                    index: doc.content_docs.iter().map(|(n, _)| *n as i32).collect(),
                    value: doc.content_docs.iter().map(|(_, d)| *d as i32).collect(),
                });
            }

            documents.push(DocumentSnapshot {
                frame_id: intern(&doc.frame_id),
                nodes,
                layout,
                content_width: f64::from(doc.width),
                content_height: f64::from(doc.height),
            });
        }

        DomSnapshot { documents, strings }
    }
}

fn rect_vec(rect: Rect) -> Vec<f64> {
    vec![
        f64::from(rect.x),
        f64::from(rect.y),
        f64::from(rect.width),
        f64::from(rect.height),
    ]
}
