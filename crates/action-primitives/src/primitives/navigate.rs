//! Navigate primitive - best-effort, time-boxed `Page.navigate`

use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    types::{ActionKind, ActionReport},
};

/// Execute navigate primitive
///
/// Steps:
/// 1. Validate URL format
/// 2. Issue CDP navigate command, waiting at most the navigation timeout
/// 3. A timeout is not an error: the report is marked `timed_out` and the page keeps
///    loading in the background
pub async fn execute_navigate(
    primitives: &DefaultActionPrimitives,
    url: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let parsed = Url::parse(url).map_err(|err| ActionError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    debug!(url = %parsed, "Issuing CDP Page.navigate command");
    let navigation = primitives
        .cdp()
        .send("Page.navigate", json!({ "url": parsed.as_str() }));
    let timed_out = match tokio::time::timeout(primitives.navigation_timeout(), navigation).await {
        Ok(reply) => {
            let reply = reply?;
            if let Some(error_text) = reply.get("errorText").and_then(Value::as_str) {
                warn!(url = %parsed, error_text, "Navigation reported an error");
            }
            false
        }
        Err(_) => {
            debug!(url = %parsed, "Navigation still pending after timeout");
            true
        }
    };

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(url = %parsed, latency_ms, timed_out, "Navigate completed");
    Ok(ActionReport::success(ActionKind::Navigate, started_at, latency_ms).with_timed_out(timed_out))
}
