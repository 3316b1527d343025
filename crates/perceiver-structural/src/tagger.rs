//! One tagging pass: snapshot, per-frame extraction, hit-testing and tag construction.

use std::time::Instant;

use cdp_adapter::Cdp;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::classify::candidates;
use crate::decoder::DecodedSnapshot;
use crate::errors::PerceiverError;
use crate::extract::{elements_in_viewport, ExtractContext};
use crate::frames::resolve_frame_bounds;
use crate::metrics;
use crate::rect::Rect;
use crate::snapshot::DomSnapshot;
use crate::table::{TagMap, TaggedElements};
use crate::tags::Tag;
use crate::text::text_content;
use crate::visibility::confirm_visible;

pub const DEFAULT_INNER_TEXT_MAX_LENGTH: usize = 100;

/// Computed styles requested from `DOMSnapshot.captureSnapshot`.
pub fn default_queried_styles() -> Vec<String> {
    [
        "visibility",
        "display",
        "cursor",
        "border-left-width",
        "border-top-width",
        "border-right-width",
        "border-bottom-width",
        "padding-left",
        "padding-top",
        "padding-right",
        "padding-bottom",
        "overflow-x",
        "overflow-y",
        "white-space",
        "opacity",
        "pointer-events",
        "z-index",
        "transform",
        "clip-path",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingOptions {
    pub queried_styles: Vec<String>,
    pub inner_text_max_length: usize,
}

impl Default for TaggingOptions {
    fn default() -> Self {
        Self {
            queried_styles: default_queried_styles(),
            inner_text_max_length: DEFAULT_INNER_TEXT_MAX_LENGTH,
        }
    }
}

/// Result of one pass: the externally visible tags and the table actions resolve against.
#[derive(Debug, Clone)]
pub struct TaggingPass {
    pub tags: TagMap,
    pub table: TaggedElements,
}

pub async fn capture_snapshot<C>(cdp: &C, queried_styles: &[String]) -> Result<DomSnapshot, PerceiverError>
where
    C: Cdp + ?Sized,
{
    let raw = cdp
        .send(
            "DOMSnapshot.captureSnapshot",
            json!({
                "computedStyles": queried_styles,
                "includePaintOrder": true,
                "includeDOMRects": true,
            }),
        )
        .await?;
    serde_json::from_value(raw).map_err(|err| PerceiverError::decode(err.to_string()))
}

/// Tags every interactive element visible inside `visible_rect`, numbering from
/// `first_annotation` in document-then-layout order.
pub async fn run_pass<C>(
    cdp: &C,
    visible_rect: Rect,
    first_annotation: i64,
    options: &TaggingOptions,
) -> Result<TaggingPass, PerceiverError>
where
    C: Cdp + ?Sized,
{
    let started = Instant::now();
    let snapshot = capture_snapshot(cdp, &options.queried_styles).await?;
    let decoded = DecodedSnapshot::new(&snapshot, &options.queried_styles);
    let frame_bounds = resolve_frame_bounds(&decoded);

    let mut table = TaggedElements::new(first_annotation);
    let mut tags = Vec::new();
    let mut frames_scanned = 0usize;
    let mut candidate_count = 0usize;

    for (doc_idx, tree) in decoded.documents.iter().enumerate() {
        let Some(doc_bounds) = frame_bounds.get(tree.frame_id()).copied().flatten() else {
            continue;
        };
        if !visible_rect.intersects(&doc_bounds) {
            debug!(frame = tree.frame_id(), ?doc_bounds, "frame outside viewport");
            continue;
        }
        frames_scanned += 1;

        let ctx = ExtractContext {
            doc_bounds,
            visible_rect,
            is_root_frame: doc_idx == 0,
        };
        let in_viewport = elements_in_viewport(tree, &ctx);
        let interactive = candidates(&in_viewport);
        candidate_count += interactive.len();

        let points = join_all(
            interactive
                .iter()
                .map(|element| confirm_visible(cdp, element, &visible_rect)),
        )
        .await;

        for (element, point) in interactive.into_iter().zip(points) {
            let Some(point) = point else {
                continue;
            };
            let inner_text = text_content(tree, element.node_id, Some(options.inner_text_max_length));
            let annotation = table.push(element.clone(), point);
            tags.push(Tag::from_element(annotation, element, inner_text));
        }
    }

    let elapsed = started.elapsed();
    metrics::record_pass(elapsed);
    metrics::record_candidates(candidate_count);
    metrics::record_confirmed(table.len());
    info!(
        frames = frames_scanned,
        candidates = candidate_count,
        confirmed = table.len(),
        first_annotation,
        elapsed_ms = elapsed.as_millis() as u64,
        "tagging pass complete"
    );

    Ok(TaggingPass {
        tags: TagMap(tags),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SnapshotBuilder;
    use crate::tags::TagKind;
    use cdp_adapter::MockCdp;
    use serde_json::Value;
    use serial_test::serial;

    /// Every hit test lands on whatever node the describe call asked about.
    fn script_hits(mock: &MockCdp, snapshot: Value, hit: i64) {
        mock.respond_value("DOMSnapshot.captureSnapshot", snapshot)
            .respond("DOM.describeNode", |params| {
                Ok(json!({ "node": { "backendNodeId": params["backendNodeId"] } }))
            })
            .respond_value("DOM.getNodeForLocation", json!({ "backendNodeId": hit }));
    }

    #[tokio::test]
    #[serial]
    async fn numbers_confirmed_elements_from_the_base() {
        let mut b = SnapshotBuilder::new(1280, 800);
        let html = b.root_html();
        let body = b.boxed(html, "BODY", &[], Rect::new(0, 0, 1280, 800));
        let button = b.boxed(body, "BUTTON", &[("id", Some("save"))], Rect::new(10, 10, 80, 20));
        b.text(button, "Save");
        let snapshot = serde_json::to_value(b.build()).expect("snapshot json");

        let mock = MockCdp::new();
        script_hits(&mock, snapshot, b.backend_id(button));

        let pass = run_pass(&mock, Rect::new(0, 0, 1280, 800), 3, &TaggingOptions::default())
            .await
            .expect("pass");
        assert_eq!(pass.tags.len(), 1);
        let tag = pass.tags.get("3").expect("tag 3");
        assert_eq!(tag.kind(), TagKind::Base);
        assert_eq!(tag.base().inner_text, "Save");
        assert_eq!(pass.table.point_for(3), Some((50, 20)));

        let capture = &mock.calls_to("DOMSnapshot.captureSnapshot")[0];
        assert_eq!(capture["includePaintOrder"], true);
        assert_eq!(capture["computedStyles"][0], "visibility");
    }

    #[tokio::test]
    #[serial]
    async fn offscreen_frames_are_not_hit_tested() {
        let mut b = SnapshotBuilder::new(1280, 3000);
        let html = b.root_html();
        let host = b.boxed(html, "IFRAME", &[], Rect::new(0, 2000, 400, 300));
        let child = b.add_document("child", 400, 300);
        b.host_document(host, child);
        b.select_document(child);
        let child_html = b.root_html();
        b.boxed(child_html, "BUTTON", &[], Rect::new(0, 0, 50, 20));
        let snapshot = serde_json::to_value(b.build()).expect("snapshot json");

        let mock = MockCdp::new();
        script_hits(&mock, snapshot, -1);
        let pass = run_pass(&mock, Rect::new(0, 0, 1280, 800), 0, &TaggingOptions::default())
            .await
            .expect("pass");
        assert!(pass.tags.is_empty());
        assert!(mock.calls_to("DOM.describeNode").is_empty());
    }

    #[tokio::test]
    async fn undecodable_snapshot_is_an_error() {
        let mock = MockCdp::new();
        mock.respond_value("DOMSnapshot.captureSnapshot", json!({ "documents": "nope" }));
        let err = run_pass(&mock, Rect::new(0, 0, 10, 10), 0, &TaggingOptions::default())
            .await
            .expect_err("decode failure");
        assert!(matches!(err, PerceiverError::Decode(_)));
    }
}
