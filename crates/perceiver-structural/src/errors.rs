use cdp_adapter::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerceiverError {
    #[error("snapshot decode failed: {0}")]
    Decode(String),
    #[error("layout metrics missing: {0}")]
    MissingMetrics(String),
    #[error(transparent)]
    Cdp(#[from] AdapterError),
}

impl PerceiverError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn missing_metrics(msg: impl Into<String>) -> Self {
        Self::MissingMetrics(msg.into())
    }
}
