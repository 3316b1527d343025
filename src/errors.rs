//! Error handling module
//!
//! One error type for everything a [`PageSession`](crate::PageSession) call can fail
//! with. Layer errors are wrapped unchanged so callers can still tell invalid input
//! apart from transport trouble.

use action_primitives::ActionError;
use cdp_adapter::AdapterError;
use perceiver_structural::PerceiverError;
use perceiver_visual::VisualError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Cdp(#[from] AdapterError),

    #[error(transparent)]
    Perceiver(#[from] PerceiverError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Visual(#[from] VisualError),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The browser answered, but without a field the session relies on
    #[error("unexpected reply to {method}: {detail}")]
    UnexpectedReply { method: String, detail: String },
}

impl PageError {
    pub fn timeout(operation: &'static str, timeout: std::time::Duration) -> Self {
        PageError::Timeout {
            operation,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// The caller asked for something the current page state cannot satisfy.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PageError::Action(err) if err.is_invalid_input())
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            PageError::Timeout { .. } => true,
            PageError::Cdp(err) => err.is_timeout(),
            _ => false,
        }
    }
}

pub type PageResult<T> = Result<T, PageError>;
