//! Page discovery: open a tab and attach a flattened session to it.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::channel::{Cdp, SessionChannel};
use crate::error::AdapterError;
use crate::transport::CdpTransport;

/// A browser tab together with the session channel bound to it.
#[derive(Clone)]
pub struct PageTarget {
    pub target_id: String,
    pub session_id: String,
    pub channel: SessionChannel,
}

/// Creates a new tab at `url` and attaches to it.
pub async fn open_page(
    transport: Arc<dyn CdpTransport>,
    url: &str,
) -> Result<PageTarget, AdapterError> {
    let browser = SessionChannel::browser(transport.clone());
    let created = browser
        .send("Target.createTarget", json!({ "url": url }))
        .await?;
    let target_id = string_field(&created, "Target.createTarget", "targetId")?;
    attach_page(transport, &target_id).await
}

/// Attaches a flattened session to an existing page target.
pub async fn attach_page(
    transport: Arc<dyn CdpTransport>,
    target_id: &str,
) -> Result<PageTarget, AdapterError> {
    let browser = SessionChannel::browser(transport.clone());
    let attached = browser
        .send(
            "Target.attachToTarget",
            json!({ "targetId": target_id, "flatten": true }),
        )
        .await?;
    let session_id = string_field(&attached, "Target.attachToTarget", "sessionId")?;
    info!(target: "cdp-adapter", %target_id, %session_id, "attached to page");

    Ok(PageTarget {
        target_id: target_id.to_string(),
        channel: SessionChannel::new(transport, session_id.clone()),
        session_id,
    })
}

fn string_field(value: &Value, method: &str, field: &str) -> Result<String, AdapterError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AdapterError::bad_reply(method, format!("missing {field}")))
}
