//! Scroll primitive - scroll a tagged container by 90% of its visible size

use std::time::Instant;

use chrono::Utc;
use perceiver_structural::{ScrollDirection, TaggedElements};
use serde_json::json;
use tracing::info;

use crate::{
    errors::ActionError,
    object_group::call_function_on_node,
    primitives::{target, DefaultActionPrimitives},
    types::{ActionKind, ActionReport},
};

/// Runs with the element as `this`; `<html>` reports the viewport as its client box.
pub const SCROLL_SCRIPT: &str = r#"function scrollElement(direction) {
    const element = this;
    const heightAmount = element.clientHeight * 0.9;
    const widthAmount = element.clientWidth * 0.9;
    switch (direction.toLowerCase()) {
        case 'up':
            element.scrollBy({ top: -heightAmount });
            break;
        case 'down':
            element.scrollBy({ top: heightAmount });
            break;
        case 'left':
            element.scrollBy({ left: -widthAmount });
            break;
        case 'right':
            element.scrollBy({ left: widthAmount });
            break;
    }
}"#;

/// Execute scroll primitive
///
/// Rejects directions the element had no room for when it was tagged, without
/// touching the page.
pub async fn execute_scroll(
    primitives: &DefaultActionPrimitives,
    table: &TaggedElements,
    annotation: i64,
    direction: ScrollDirection,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let element = target(table, annotation)?;
    if !element.can_scroll(direction) {
        return Err(ActionError::ScrollUnsupported {
            annotation,
            direction,
        });
    }

    call_function_on_node(
        primitives.cdp(),
        element.backend_node_id,
        SCROLL_SCRIPT,
        json!(direction.as_str()),
    )
    .await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(annotation, %direction, latency_ms, "Scroll completed successfully");
    Ok(ActionReport::success(ActionKind::Scroll, started_at, latency_ms).with_annotation(annotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::test_util::{element, primitives};
    use perceiver_structural::ElementKind;

    #[tokio::test]
    async fn scrolls_in_a_supported_direction() {
        let (mock, primitives) = primitives();
        mock.respond_value("DOM.resolveNode", json!({ "object": { "objectId": "pane" } }));
        let mut pane = element("DIV", 12, ElementKind::Plain);
        pane.can_scroll_down = true;
        let mut table = TaggedElements::new(0);
        table.push(pane, (0, 0));

        execute_scroll(&primitives, &table, 0, ScrollDirection::Down)
            .await
            .unwrap();

        let call = &mock.calls_to("Runtime.callFunctionOn")[0];
        assert_eq!(call["functionDeclaration"], SCROLL_SCRIPT);
        assert_eq!(call["arguments"][0]["value"], "down");
        assert_eq!(mock.calls_to("Runtime.releaseObjectGroup").len(), 1);
    }

    #[tokio::test]
    async fn unsupported_direction_sends_nothing() {
        let (mock, primitives) = primitives();
        let mut pane = element("DIV", 12, ElementKind::Plain);
        pane.can_scroll_down = true;
        let mut table = TaggedElements::new(0);
        table.push(pane, (0, 0));

        let err = execute_scroll(&primitives, &table, 0, ScrollDirection::Left)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::ScrollUnsupported {
                annotation: 0,
                direction: ScrollDirection::Left
            }
        ));
        assert!(mock.calls().is_empty());
    }
}
