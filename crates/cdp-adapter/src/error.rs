use thiserror::Error;

/// Why a single `send` did not produce a result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The browser answered with a protocol error object.
    #[error("{method} failed: cdp error {code}: {message}")]
    Command {
        method: String,
        code: i64,
        message: String,
    },

    #[error("{method} got no reply within {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },

    /// The websocket or the page session is gone; nothing sent on it will be answered.
    #[error("session closed: {0}")]
    SessionClosed(String),

    /// A reply arrived but lacks a field the caller depends on.
    #[error("unexpected reply to {method}: {detail}")]
    BadReply { method: String, detail: String },

    #[error("cannot start browser: {0}")]
    Launch(String),
}

impl AdapterError {
    pub fn command(method: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self::Command {
            method: method.into(),
            code,
            message: message.into(),
        }
    }

    pub fn timeout(method: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            method: method.into(),
            timeout_ms,
        }
    }

    pub fn closed(reason: impl Into<String>) -> Self {
        Self::SessionClosed(reason.into())
    }

    pub fn bad_reply(method: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::BadReply {
            method: method.into(),
            detail: detail.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The browser understood the command and refused it.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command { .. })
    }

    /// Worth sending again: deadlines and server-side (code >= 500) refusals.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Command { code, .. } => *code >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_names_method_and_code() {
        let err = AdapterError::command("DOM.describeNode", -32000, "No node with given id found");
        assert_eq!(
            err.to_string(),
            "DOM.describeNode failed: cdp error -32000: No node with given id found"
        );
        assert!(err.is_command());
        assert!(!err.is_timeout());
        assert!(!err.is_retriable());
    }

    #[test]
    fn retriable_covers_deadlines_and_server_codes() {
        assert!(AdapterError::timeout("Page.navigate", 3000).is_retriable());
        assert!(AdapterError::command("Page.navigate", 503, "busy").is_retriable());
        assert!(!AdapterError::closed("websocket dropped").is_retriable());
        assert!(!AdapterError::bad_reply("Target.attachToTarget", "missing sessionId").is_retriable());
    }
}
