//! Remote-object scoping for `DOM.resolveNode` + `Runtime.callFunctionOn` round trips.

use cdp_adapter::Cdp;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::errors::ActionError;

/// A fresh DevTools object group; every handle resolved under it is released together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectGroup {
    id: String,
}

impl ObjectGroup {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Releases the group. Failures are logged; they never mask the action's own result.
    pub async fn release<C>(self, cdp: &C)
    where
        C: Cdp + ?Sized,
    {
        if let Err(err) = cdp
            .send("Runtime.releaseObjectGroup", json!({ "objectGroup": self.id }))
            .await
        {
            warn!(object_group = %self.id, %err, "failed to release object group");
        }
    }
}

impl Default for ObjectGroup {
    fn default() -> Self {
        Self::new()
    }
}

async fn resolve_and_call<C>(
    cdp: &C,
    group: &ObjectGroup,
    backend_node_id: i64,
    function_declaration: &str,
    argument: Value,
) -> Result<Value, ActionError>
where
    C: Cdp + ?Sized,
{
    let resolved = cdp
        .send(
            "DOM.resolveNode",
            json!({ "backendNodeId": backend_node_id, "objectGroup": group.id() }),
        )
        .await?;
    let object_id = resolved
        .pointer("/object/objectId")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ActionError::Internal(format!("node {backend_node_id} resolved without an objectId"))
        })?;
    let reply = cdp
        .send(
            "Runtime.callFunctionOn",
            json!({
                "functionDeclaration": function_declaration,
                "objectId": object_id,
                "arguments": [{ "value": argument }],
                "returnByValue": true,
            }),
        )
        .await?;
    match reply.get("exceptionDetails") {
        Some(details) => Err(ActionError::ScriptFailed(exception_message(details))),
        None => Ok(reply),
    }
}

fn exception_message(details: &Value) -> String {
    details
        .pointer("/exception/description")
        .or_else(|| details.get("text"))
        .and_then(Value::as_str)
        .unwrap_or("uncaught exception")
        .to_string()
}

/// Runs `function_declaration` with the node as `this`, inside a scoped object group.
pub async fn call_function_on_node<C>(
    cdp: &C,
    backend_node_id: i64,
    function_declaration: &str,
    argument: Value,
) -> Result<Value, ActionError>
where
    C: Cdp + ?Sized,
{
    let group = ObjectGroup::new();
    let result = resolve_and_call(cdp, &group, backend_node_id, function_declaration, argument).await;
    group.release(cdp).await;
    result
}
