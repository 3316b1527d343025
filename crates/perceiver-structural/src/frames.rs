//! Absolute geometry of every frame in a snapshot.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::decoder::{DecodedSnapshot, DocumentTree};
use crate::rect::Rect;

/// Frame id → absolute content box in root-document coordinates, `None` when not rendered.
pub type FrameBounds = HashMap<String, Option<Rect>>;

const BOX_OFFSETS: [&str; 8] = [
    "border-left-width",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "padding-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
];

/// Parses a computed `Npx` length, truncating fractions. Anything else is zero.
fn px(value: Option<&str>) -> i32 {
    value
        .map(|v| v.trim().trim_end_matches("px"))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as i32)
        .unwrap_or(0)
}

/// Content box of an iframe host relative to its own document.
fn host_content_box(tree: &DocumentTree<'_>, host: usize) -> Option<Rect> {
    let layout_idx = tree.layout_index(host)?;
    let outer = tree.bounds(layout_idx);
    let [bl, bt, br, bb, pl, pt, pr, pb] = BOX_OFFSETS.map(|name| px(tree.style(layout_idx, name)));
    Some(Rect::new(
        outer.x + bl + pl,
        outer.y + bt + pt,
        outer.width - bl - br - pl - pr,
        outer.height - bt - bb - pt - pb,
    ))
}

pub fn resolve_frame_bounds(decoded: &DecodedSnapshot<'_>) -> FrameBounds {
    let mut bounds = FrameBounds::new();
    let Some(root) = decoded.documents.first() else {
        return bounds;
    };

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut relative: HashMap<usize, Option<Rect>> = HashMap::new();
    let mut scroll_offsets: HashMap<usize, Rect> = HashMap::new();

    for (doc_idx, tree) in decoded.documents.iter().enumerate() {
        let hosted = tree.content_documents();
        if hosted.is_empty() {
            continue;
        }
        if let Some((_, scroll)) = tree.root_rects() {
            scroll_offsets.insert(doc_idx, scroll);
        }
        for (host, child_doc) in hosted {
            if child_doc >= decoded.documents.len() {
                continue;
            }
            children.entry(doc_idx).or_default().push(child_doc);
            relative.insert(child_doc, host_content_box(tree, host));
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([(0usize, Some(root.content_size()))]);
    while let Some((doc_idx, absolute)) = queue.pop_front() {
        if !visited.insert(doc_idx) {
            continue;
        }
        bounds.insert(decoded.documents[doc_idx].frame_id().to_string(), absolute);

        let scroll = scroll_offsets.get(&doc_idx).filter(|_| doc_idx != 0);
        for &child in children.get(&doc_idx).map(Vec::as_slice).unwrap_or(&[]) {
            let child_bounds = match (absolute, relative.get(&child).copied().flatten()) {
                (Some(parent), Some(rect)) => {
                    let translated = rect.translate(parent.x, parent.y);
                    Some(match scroll {
                        Some(s) => translated.translate(-s.x, -s.y),
                        None => translated,
                    })
                }
                _ => None,
            };
            queue.push_back((child, child_bounds));
        }
    }

    for tree in &decoded.documents {
        bounds.entry(tree.frame_id().to_string()).or_insert(None);
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SnapshotBuilder;

    fn nested() -> SnapshotBuilder {
        let mut b = SnapshotBuilder::new(1280, 2000);
        let html = b.root_html();
        let body = b.boxed(html, "BODY", &[], Rect::new(0, 0, 1280, 2000));
        let host = b.boxed(body, "IFRAME", &[], Rect::new(100, 200, 400, 300));
        b.style(host, "border-left-width", "2px")
            .style(host, "border-top-width", "3.7px")
            .style(host, "border-right-width", "2px")
            .style(host, "border-bottom-width", "3px")
            .style(host, "padding-left", "5px")
            .style(host, "padding-top", "5px");
        let hidden_host = b.element(body, "IFRAME", &[]);

        let child = b.add_document("child", 393, 289);
        let hidden = b.add_document("hidden", 100, 100);
        let grandchild = b.add_document("grandchild", 50, 50);
        b.host_document(host, child).host_document(hidden_host, hidden);

        b.select_document(child);
        let child_html = b.root_html();
        b.scroll(
            child_html,
            Rect::new(0, 0, 393, 289),
            Rect::new(0, 40, 393, 800),
        );
        let inner_host = b.boxed(child_html, "IFRAME", &[], Rect::new(10, 100, 60, 60));
        b.host_document(inner_host, grandchild);

        b.select_document(hidden);
        b.root_html();
        b
    }

    #[test]
    fn nested_frames_accumulate_offsets_and_scroll() {
        let b = nested();
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        let bounds = resolve_frame_bounds(&decoded);

        assert_eq!(bounds["main"], Some(Rect::new(0, 0, 1280, 2000)));
        // 100 + 2 + 5, 200 + 3 + 5; width 400 - 4 - 5, height 300 - 6 - 5
        assert_eq!(bounds["child"], Some(Rect::new(107, 208, 391, 289)));
        // translated by the child origin, then shifted up by the child's 40px scroll
        assert_eq!(bounds["grandchild"], Some(Rect::new(117, 268, 60, 60)));
        assert_eq!(bounds["hidden"], None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let b = nested();
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        assert_eq!(resolve_frame_bounds(&decoded), resolve_frame_bounds(&decoded));
    }

    #[test]
    fn unreachable_documents_map_to_none() {
        let mut b = SnapshotBuilder::new(800, 600);
        b.root_html();
        let orphan = b.add_document("orphan", 10, 10);
        b.select_document(orphan);
        b.root_html();
        let snapshot = b.build();
        let styles = b.styles();
        let decoded = DecodedSnapshot::new(&snapshot, &styles);
        let bounds = resolve_frame_bounds(&decoded);
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds["orphan"], None);
    }

    #[test]
    fn px_parsing() {
        assert_eq!(px(Some("12px")), 12);
        assert_eq!(px(Some("0.5px")), 0);
        assert_eq!(px(Some("auto")), 0);
        assert_eq!(px(None), 0);
    }
}
