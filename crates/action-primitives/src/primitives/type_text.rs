//! Focus, text entry and key press primitives

use std::time::Instant;

use chrono::Utc;
use perceiver_structural::TaggedElements;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    errors::ActionError,
    keys,
    primitives::{target, DefaultActionPrimitives},
    types::{ActionKind, ActionReport},
};

/// Execute focus primitive via `DOM.focus`
pub async fn execute_focus(
    primitives: &DefaultActionPrimitives,
    table: &TaggedElements,
    annotation: i64,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let element = target(table, annotation)?;
    primitives
        .cdp()
        .send(
            "DOM.focus",
            json!({ "backendNodeId": element.backend_node_id }),
        )
        .await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    debug!(annotation, latency_ms, "Focus completed");
    Ok(ActionReport::success(ActionKind::Focus, started_at, latency_ms).with_annotation(annotation))
}

/// Execute enter-text primitive
///
/// Focuses the element, clears it with select-all + delete editing commands, then
/// inserts `text` in one step.
pub async fn execute_enter_text(
    primitives: &DefaultActionPrimitives,
    table: &TaggedElements,
    annotation: i64,
    text: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    execute_focus(primitives, table, annotation).await?;

    let cdp = primitives.cdp();
    for event in ["keyDown", "keyUp"] {
        cdp.send(
            "Input.dispatchKeyEvent",
            json!({ "type": event, "commands": ["selectAll", "delete"] }),
        )
        .await?;
    }
    cdp.send("Input.insertText", json!({ "text": text })).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        annotation,
        chars = text.chars().count(),
        latency_ms,
        "Enter text completed successfully"
    );
    Ok(ActionReport::success(ActionKind::EnterText, started_at, latency_ms)
        .with_annotation(annotation))
}

/// Execute key press primitive for a named key
pub async fn execute_press_key(
    primitives: &DefaultActionPrimitives,
    key: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let definition = keys::lookup(key).ok_or_else(|| ActionError::UnknownKey(key.to_string()))?;
    let cdp = primitives.cdp();
    for event in ["keyDown", "keyUp"] {
        cdp.send(
            "Input.dispatchKeyEvent",
            json!({
                "type": event,
                "windowsVirtualKeyCode": definition.windows_virtual_key_code,
                "key": definition.key,
                "code": definition.code,
            }),
        )
        .await?;
    }

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    debug!(key = %definition.key, latency_ms, "Key press completed");
    Ok(ActionReport::success(ActionKind::PressKey, started_at, latency_ms))
}
