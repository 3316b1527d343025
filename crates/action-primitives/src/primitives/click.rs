//! Click and hover primitives - synthetic pointer events

use std::time::Instant;

use cdp_adapter::Cdp;
use chrono::Utc;
use perceiver_structural::{fetch_visible_rect, TaggedElements};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    errors::ActionError,
    primitives::{target, DefaultActionPrimitives},
    types::{ActionKind, ActionReport},
};

async fn mouse_moved(cdp: &dyn Cdp, x: i32, y: i32) -> Result<(), ActionError> {
    cdp.send(
        "Input.dispatchMouseEvent",
        json!({ "type": "mouseMoved", "x": x, "y": y }),
    )
    .await?;
    Ok(())
}

async fn mouse_button(cdp: &dyn Cdp, event: &str, x: i32, y: i32) -> Result<(), ActionError> {
    cdp.send(
        "Input.dispatchMouseEvent",
        json!({ "type": event, "button": "left", "x": x, "y": y, "clickCount": 1 }),
    )
    .await?;
    Ok(())
}

/// Execute click primitive
///
/// Steps:
/// 1. Resolve the annotation and its confirmed hit point
/// 2. Convert the point from page to viewport coordinates
/// 3. Move, pause, press, pause, release, move again
pub async fn execute_click(
    primitives: &DefaultActionPrimitives,
    table: &TaggedElements,
    annotation: i64,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let element = target(table, annotation)?;
    let (abs_x, abs_y) = table.point_for(annotation).ok_or_else(|| {
        ActionError::Internal(format!("annotation {annotation} has no confirmed point"))
    })?;

    let cdp = primitives.cdp();
    let visible_rect = fetch_visible_rect(cdp).await?;
    let (x, y) = visible_rect.relative_point(abs_x, abs_y);
    debug!(annotation, name = %element.name, x, y, "Dispatching click");

    let pacing = primitives.pacing();
    mouse_moved(cdp, x, y).await?;
    tokio::time::sleep(pacing.pointer_settle).await;
    mouse_button(cdp, "mousePressed", x, y).await?;
    tokio::time::sleep(pacing.press_release).await;
    mouse_button(cdp, "mouseReleased", x, y).await?;
    mouse_moved(cdp, x, y).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(annotation, latency_ms, "Click completed successfully");
    Ok(ActionReport::success(ActionKind::Click, started_at, latency_ms).with_annotation(annotation))
}

/// Execute hover primitive at viewport coordinates
pub async fn execute_hover(
    primitives: &DefaultActionPrimitives,
    x: i32,
    y: i32,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let cdp = primitives.cdp();
    mouse_moved(cdp, x, y).await?;
    tokio::time::sleep(primitives.pacing().hover_settle).await;
    mouse_moved(cdp, x, y).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    debug!(x, y, latency_ms, "Hover completed");
    Ok(ActionReport::success(ActionKind::Hover, started_at, latency_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::test_util::{element, primitives};
    use perceiver_structural::ElementKind;

    fn layout_metrics(page_y: f64) -> serde_json::Value {
        json!({
            "cssVisualViewport": {
                "clientWidth": 1280.0, "clientHeight": 800.0, "pageX": 0.0, "pageY": page_y
            },
            "cssContentSize": { "width": 1280.0, "height": 3000.0 }
        })
    }

    #[tokio::test]
    async fn click_uses_viewport_relative_point() {
        let (mock, primitives) = primitives();
        mock.respond_value("Page.getLayoutMetrics", layout_metrics(400.0));
        let mut table = TaggedElements::new(0);
        table.push(element("BUTTON", 7, ElementKind::Plain), (140, 510));

        let report = execute_click(&primitives, &table, 0).await.unwrap();
        assert_eq!(report.annotation, Some(0));

        let events = mock.calls_to("Input.dispatchMouseEvent");
        let kinds: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["mouseMoved", "mousePressed", "mouseReleased", "mouseMoved"]);
        for event in &events {
            assert_eq!((event["x"].as_i64(), event["y"].as_i64()), (Some(140), Some(110)));
        }
        assert_eq!(events[1]["button"], "left");
        assert_eq!(events[2]["clickCount"], 1);
    }

    #[tokio::test]
    async fn out_of_range_click_sends_nothing() {
        let (mock, primitives) = primitives();
        let mut table = TaggedElements::new(0);
        table.push(element("A", 1, ElementKind::Plain), (0, 0));
        table.push(element("A", 2, ElementKind::Plain), (0, 0));

        let err = execute_click(&primitives, &table, 2).await.unwrap_err();
        assert!(matches!(err, ActionError::AnnotationOutOfRange(2)));
        assert!(err.is_invalid_input());
        assert!(mock.calls().is_empty());
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn hover_moves_twice() {
        let (mock, primitives) = primitives();
        execute_hover(&primitives, 5, 6).await.unwrap();
        let events = mock.calls_to("Input.dispatchMouseEvent");
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e["type"] == "mouseMoved" && e["x"] == 5));
    }
}
