//! Error types for action primitives

use cdp_adapter::AdapterError;
use perceiver_structural::{PerceiverError, ScrollDirection};
use thiserror::Error;

/// Failures of a single action.
///
/// Variants up to `InvalidUrl` reject the caller's input before anything is sent to
/// the page; the rest come from the page itself.
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// No element with this number in the current table
    #[error("Annotation {0} is not in the current tag table")]
    AnnotationOutOfRange(i64),

    /// Element has no scroll room in the requested direction
    #[error("Element {annotation} cannot be scrolled {direction}")]
    ScrollUnsupported {
        annotation: i64,
        direction: ScrollDirection,
    },

    /// Select operation addressed something other than a `<select>`
    #[error("Element {0} is not a select element")]
    NotSelect(i64),

    /// Dropdown option was not found
    #[error("Option {option:?} is not valid for select element {annotation} (valid options: {available:?})")]
    OptionNotFound {
        annotation: i64,
        option: String,
        available: Vec<String>,
    },

    /// Key name missing from the virtual key table
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Navigation target does not parse as an absolute URL
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// CDP communication or protocol error
    #[error("CDP error: {0}")]
    Cdp(#[from] AdapterError),

    /// Page-side script threw instead of returning
    #[error("Script threw in the page: {0}")]
    ScriptFailed(String),

    /// Bounded wait expired
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Reply shape the primitive could not use
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Rejected caller input; the page was not touched.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ActionError::AnnotationOutOfRange(_)
                | ActionError::ScrollUnsupported { .. }
                | ActionError::NotSelect(_)
                | ActionError::OptionNotFound { .. }
                | ActionError::UnknownKey(_)
                | ActionError::InvalidUrl { .. }
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::Cdp(err) => err.is_retriable(),
            ActionError::Timeout(_) => true,
            _ => false,
        }
    }
}

impl From<PerceiverError> for ActionError {
    fn from(err: PerceiverError) -> Self {
        match err {
            PerceiverError::Cdp(err) => ActionError::Cdp(err),
            other => ActionError::Internal(other.to_string()),
        }
    }
}
