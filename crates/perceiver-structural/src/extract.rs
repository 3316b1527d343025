//! Turns one document's layout table into typed [`Element`] records in viewport space.

use std::collections::HashMap;

use crate::decoder::{Attributes, DocumentTree};
use crate::element::{Element, ElementKind};
use crate::rect::Rect;
use crate::select::resolve_selects;
use crate::snapshot::ELEMENT_NODE;

/// Elements of one frame in layout order, addressable by node index.
#[derive(Debug, Clone, Default)]
pub struct FrameElements {
    elements: Vec<Element>,
    by_node: HashMap<usize, usize>,
}

impl FrameElements {
    fn insert(&mut self, element: Element) {
        match self.by_node.get(&element.node_id) {
            Some(&pos) => self.elements[pos] = element,
            None => {
                self.by_node.insert(element.node_id, self.elements.len());
                self.elements.push(element);
            }
        }
    }

    pub fn get(&self, node_id: usize) -> Option<&Element> {
        self.by_node.get(&node_id).map(|&pos| &self.elements[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_vec(self) -> Vec<Element> {
        self.elements
    }
}

/// Where a document sits and what part of the page is on screen.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext {
    pub doc_bounds: Rect,
    pub visible_rect: Rect,
    pub is_root_frame: bool,
}

struct ScrollFlags {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

fn scroll_flags(scrollable_x: bool, scrollable_y: bool, client: Rect, scroll: Rect) -> ScrollFlags {
    ScrollFlags {
        left: scrollable_x && scroll.x > 0,
        right: scrollable_x && scroll.x + client.width < scroll.width,
        up: scrollable_y && scroll.y > 0,
        down: scrollable_y && scroll.y + client.height < scroll.height,
    }
}

fn overflow_scrolls(value: Option<&str>, allow_visible: bool) -> bool {
    matches!(value, Some("auto") | Some("scroll")) || (allow_visible && value == Some("visible"))
}

/// Rendered, on-screen elements of `tree`. An unusable document (no root element, or a
/// root without layout) yields nothing.
pub fn elements_in_viewport(tree: &DocumentTree<'_>, ctx: &ExtractContext) -> FrameElements {
    let mut out = FrameElements::default();
    let (Some(root), Some((root_client, root_scroll))) = (tree.root_node(), tree.root_rects())
    else {
        return out;
    };

    let frame_id = tree.frame_id().to_string();
    let mut pending_selects = Vec::new();

    for (layout_idx, node) in tree.layout_nodes() {
        if tree.node_type(node) != ELEMENT_NODE {
            continue;
        }
        let name = tree.node_name(node).unwrap_or_default();

        let mut bounds = if node == root {
            tree.content_size()
        } else {
            tree.bounds(layout_idx)
        }
        .translate(ctx.doc_bounds.x, ctx.doc_bounds.y);
        if !ctx.is_root_frame {
            bounds = bounds
                .translate(-root_scroll.x, -root_scroll.y)
                .clip_to(&ctx.doc_bounds);
        }
        if node != root && !bounds.intersects(&ctx.visible_rect) {
            continue;
        }
        let bounds = bounds.clip_to(&ctx.visible_rect);

        let styles = tree.styles(layout_idx);
        let style = |key: &str| styles.get(key).map(String::as_str);
        if style("display") == Some("none") || style("visibility") == Some("hidden") || bounds.area() < 2
        {
            continue;
        }

        let is_html = name == "HTML";
        let flags = scroll_flags(
            overflow_scrolls(style("overflow-x"), is_html),
            overflow_scrolls(style("overflow-y"), is_html),
            tree.client_rect(layout_idx),
            tree.scroll_rect(layout_idx),
        );

        let attributes = tree.attributes(node);
        let kind = if name == "INPUT" || name == "TEXTAREA" {
            input_kind(tree, node, &attributes)
        } else {
            ElementKind::Plain
        };

        let element = Element {
            frame_id: frame_id.clone(),
            parent_id: tree.parent(node),
            node_id: node,
            backend_node_id: tree.backend_node_id(node),
            name: name.to_string(),
            attributes,
            styles,
            bounds,
            is_clickable: tree.is_clickable(node),
            can_scroll_up: flags.up,
            can_scroll_down: flags.down,
            can_scroll_left: flags.left,
            can_scroll_right: flags.right,
            kind,
        };

        let is_body = element.name == "BODY";
        let is_select = element.name == "SELECT";
        out.insert(element);

        if is_body {
            if let Some(html) = out
                .get(node)
                .and_then(|body| propagate_body_scroll(body, &out, root_client, root_scroll))
            {
                out.insert(html);
            }
        } else if is_select {
            pending_selects.push(node);
        }
    }

    for select in resolve_selects(tree, &pending_selects, &out) {
        out.insert(select);
    }
    out
}

fn input_kind(
    tree: &DocumentTree<'_>,
    node: usize,
    attributes: &Attributes,
) -> ElementKind {
    let input_type = attributes
        .get("type")
        .and_then(|v| v.as_deref())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if input_type == "radio" || input_type == "checkbox" {
        let value = match attributes.get("value") {
            Some(Some(v)) => v.clone(),
            _ => "on".to_string(),
        };
        ElementKind::CheckableInput {
            value,
            selected: tree.is_checked(node),
        }
    } else {
        ElementKind::TextInput {
            text: tree.input_value(node).unwrap_or_default().to_string(),
        }
    }
}

/// `<html>` rewritten with `<body>`'s scroll flags when body overflow reaches the viewport.
fn propagate_body_scroll(
    body: &Element,
    elements: &FrameElements,
    root_client: Rect,
    root_scroll: Rect,
) -> Option<Element> {
    let html = elements.get(body.parent_id?)?;
    if html.name != "HTML"
        || body.style("display") == Some("none")
        || html.style("display") == Some("none")
        || html.style("overflow-x") != Some("visible")
        || html.style("overflow-y") != Some("visible")
    {
        return None;
    }

    let scrolls = |v: Option<&str>| matches!(v, Some("visible") | Some("auto") | Some("scroll"));
    let flags = scroll_flags(
        scrolls(body.style("overflow-x")),
        scrolls(body.style("overflow-y")),
        root_client,
        root_scroll,
    );
    let mut html = html.clone();
    html.can_scroll_up = flags.up;
    html.can_scroll_down = flags.down;
    html.can_scroll_left = flags.left;
    html.can_scroll_right = flags.right;
    Some(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodedSnapshot;
    use crate::test_support::SnapshotBuilder;

    const VIEWPORT: Rect = Rect::new(0, 0, 1280, 800);

    fn root_ctx() -> ExtractContext {
        ExtractContext {
            doc_bounds: Rect::new(0, 0, 1280, 3000),
            visible_rect: VIEWPORT,
            is_root_frame: true,
        }
    }

    fn extract(b: &SnapshotBuilder, doc: usize, ctx: ExtractContext) -> FrameElements {
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        elements_in_viewport(&decoded.documents[doc], &ctx)
    }

    #[test]
    fn filters_hidden_offscreen_and_tiny_nodes() {
        let mut b = SnapshotBuilder::new(1280, 3000);
        let html = b.root_html();
        let body = b.boxed(html, "BODY", &[], Rect::new(0, 0, 1280, 3000));
        let shown = b.boxed(body, "BUTTON", &[], Rect::new(10, 10, 100, 30));
        let none = b.boxed(body, "DIV", &[], Rect::new(10, 50, 100, 30));
        b.style(none, "display", "none");
        let hidden = b.boxed(body, "DIV", &[], Rect::new(10, 90, 100, 30));
        b.style(hidden, "visibility", "hidden");
        b.boxed(body, "DIV", &[], Rect::new(10, 900, 100, 30));
        b.boxed(body, "DIV", &[], Rect::new(10, 130, 1, 1));
        let partial = b.boxed(body, "DIV", &[], Rect::new(1200, 780, 200, 200));

        let out = extract(&b, 0, root_ctx());
        let names: Vec<_> = out.iter().map(|e| e.node_id).collect();
        assert_eq!(names, vec![html, body, shown, partial]);
        assert_eq!(out.get(partial).unwrap().bounds, Rect::new(1200, 780, 80, 20));
        for element in out.iter() {
            assert!(element.bounds.width >= 0 && element.bounds.height >= 0);
            assert!(VIEWPORT.contains_rect(&element.bounds));
        }
    }

    #[test]
    fn inputs_become_typed_variants() {
        let mut b = SnapshotBuilder::new(1280, 800);
        let html = b.root_html();
        let check = b.boxed(html, "INPUT", &[("type", Some("Checkbox"))], Rect::new(0, 0, 20, 20));
        b.checked(check);
        let radio = b.boxed(
            html,
            "INPUT",
            &[("type", Some("radio")), ("value", Some("yes"))],
            Rect::new(0, 30, 20, 20),
        );
        let text = b.boxed(html, "INPUT", &[("type", Some("email"))], Rect::new(0, 60, 200, 20));
        b.input_value(text, "a@b.c");
        let area = b.boxed(html, "TEXTAREA", &[], Rect::new(0, 90, 200, 80));

        let out = extract(&b, 0, root_ctx());
        assert_eq!(
            out.get(check).unwrap().kind,
            ElementKind::CheckableInput {
                value: "on".into(),
                selected: true
            }
        );
        assert_eq!(
            out.get(radio).unwrap().kind,
            ElementKind::CheckableInput {
                value: "yes".into(),
                selected: false
            }
        );
        assert_eq!(
            out.get(text).unwrap().kind,
            ElementKind::TextInput {
                text: "a@b.c".into()
            }
        );
        assert_eq!(
            out.get(area).unwrap().kind,
            ElementKind::TextInput { text: String::new() }
        );
    }

    #[test]
    fn scroll_flags_follow_their_own_axis() {
        let mut b = SnapshotBuilder::new(1280, 800);
        let html = b.root_html();
        let pane = b.boxed(html, "DIV", &[], Rect::new(0, 0, 300, 300));
        b.style(pane, "overflow-x", "hidden")
            .style(pane, "overflow-y", "auto")
            .scroll(pane, Rect::new(0, 0, 300, 300), Rect::new(50, 20, 900, 1200));

        let out = extract(&b, 0, root_ctx());
        let pane = out.get(pane).unwrap();
        assert!(pane.can_scroll_up && pane.can_scroll_down);
        assert!(!pane.can_scroll_left && !pane.can_scroll_right);
    }

    #[test]
    fn body_overflow_propagates_to_html() {
        let mut b = SnapshotBuilder::new(1280, 3000);
        let html = b.root_html();
        b.scroll(html, Rect::new(0, 0, 1280, 800), Rect::new(0, 100, 1280, 3000));
        b.style(html, "overflow-x", "visible");
        let body = b.boxed(html, "BODY", &[], Rect::new(0, 0, 1280, 3000));
        b.style(body, "overflow-x", "hidden");

        let out = extract(&b, 0, root_ctx());
        let html = out.get(html).unwrap();
        assert!(html.can_scroll_up);
        assert!(html.can_scroll_down);
        assert!(!html.can_scroll_left && !html.can_scroll_right);
        assert_eq!(out.iter().next().unwrap().name, "HTML");
    }

    #[test]
    fn iframe_content_is_shifted_and_clipped_to_its_host() {
        let mut b = SnapshotBuilder::new(1280, 800);
        b.root_html();
        let child = b.add_document("child", 300, 1000);
        b.select_document(child);
        let html = b.root_html();
        b.scroll(html, Rect::new(0, 0, 300, 200), Rect::new(0, 100, 300, 1000));
        let visible = b.boxed(html, "A", &[], Rect::new(10, 150, 50, 20));
        let scrolled_away = b.boxed(html, "A", &[], Rect::new(10, 20, 50, 20));

        let ctx = ExtractContext {
            doc_bounds: Rect::new(100, 100, 300, 200),
            visible_rect: VIEWPORT,
            is_root_frame: false,
        };
        let out = extract(&b, child, ctx);
        assert_eq!(out.get(visible).unwrap().bounds, Rect::new(110, 150, 50, 20));
        assert!(out.get(scrolled_away).is_none());
        assert_eq!(out.get(html).unwrap().frame_id, "child");
    }

    #[test]
    fn rootless_document_yields_nothing() {
        let mut b = SnapshotBuilder::new(1280, 800);
        b.orphan_text("no root here");
        assert!(extract(&b, 0, root_ctx()).is_empty());
    }
}
