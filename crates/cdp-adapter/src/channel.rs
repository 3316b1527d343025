//! The session-scoped `send` primitive consumed by the perception and action layers.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::AdapterError;
use crate::metrics;
use crate::transport::{CdpTransport, CommandTarget};

/// One request/response round trip on a single page connection.
///
/// Implementations own correlation and connection lifecycle. A refusal by the browser
/// is [`AdapterError::Command`], deadline expiry [`AdapterError::Timeout`].
#[async_trait]
pub trait Cdp: Send + Sync {
    async fn send(&self, method: &str, params: Value) -> Result<Value, AdapterError>;
}

#[async_trait]
impl<T: Cdp + ?Sized> Cdp for Arc<T> {
    async fn send(&self, method: &str, params: Value) -> Result<Value, AdapterError> {
        (**self).send(method, params).await
    }
}

/// A flattened page session on a shared [`CdpTransport`].
#[derive(Clone)]
pub struct SessionChannel {
    transport: Arc<dyn CdpTransport>,
    target: CommandTarget,
}

impl SessionChannel {
    pub fn new(transport: Arc<dyn CdpTransport>, session_id: impl Into<String>) -> Self {
        Self {
            transport,
            target: CommandTarget::Session(session_id.into()),
        }
    }

    /// Channel that talks to the browser endpoint itself (`Target.*`, `Browser.*`).
    pub fn browser(transport: Arc<dyn CdpTransport>) -> Self {
        Self {
            transport,
            target: CommandTarget::Browser,
        }
    }

    pub fn target(&self) -> &CommandTarget {
        &self.target
    }
}

#[async_trait]
impl Cdp for SessionChannel {
    async fn send(&self, method: &str, params: Value) -> Result<Value, AdapterError> {
        let start = Instant::now();
        let result = self
            .transport
            .send_command(self.target.clone(), method, params)
            .await;
        metrics::record(method, &result, start.elapsed());
        if let Err(err) = &result {
            debug!(target: "cdp-adapter", method, %err, "command failed");
        }
        result
    }
}
