//! Select primitive - choose a `<select>` option by its visible text

use std::time::Instant;

use chrono::Utc;
use perceiver_structural::{ElementKind, TaggedElements};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    errors::ActionError,
    object_group::call_function_on_node,
    primitives::{target, DefaultActionPrimitives},
    types::{ActionKind, ActionReport},
};

pub const SELECT_SCRIPT: &str = r#"function setSelectValue(value) {
    this.value = value;
    this.dispatchEvent(new Event('change'));
}"#;

/// Execute select primitive
///
/// `option` must match one of the option texts recorded at tagging time exactly; the
/// matching option's value is assigned and a `change` event fired.
pub async fn execute_select(
    primitives: &DefaultActionPrimitives,
    table: &TaggedElements,
    annotation: i64,
    option: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let element = target(table, annotation)?;
    let ElementKind::Select {
        options,
        option_values,
        ..
    } = &element.kind
    else {
        return Err(ActionError::NotSelect(annotation));
    };

    let value = options
        .iter()
        .position(|text| text == option)
        .and_then(|idx| option_values.get(idx))
        .ok_or_else(|| ActionError::OptionNotFound {
            annotation,
            option: option.to_string(),
            available: options.clone(),
        })?;
    debug!(annotation, option, value = %value, "Selecting option");

    call_function_on_node(
        primitives.cdp(),
        element.backend_node_id,
        SELECT_SCRIPT,
        json!(value),
    )
    .await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(annotation, latency_ms, "Select completed successfully");
    Ok(ActionReport::success(ActionKind::Select, started_at, latency_ms).with_annotation(annotation))
}
