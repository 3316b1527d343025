//! Error types for screenshot and overlay operations
use std::fmt;

use cdp_adapter::AdapterError;

#[derive(Debug)]
pub enum VisualError {
    /// Screenshot capture failed at the protocol level
    Cdp(AdapterError),

    /// Capture reply did not carry usable image data
    CaptureFailed(String),

    /// Image decode or encode error
    ImageProcessing(String),
}

impl fmt::Display for VisualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cdp(err) => write!(f, "CDP adapter error: {}", err),
            Self::CaptureFailed(msg) => write!(f, "Screenshot capture failed: {}", msg),
            Self::ImageProcessing(msg) => write!(f, "Image processing error: {}", msg),
        }
    }
}

impl std::error::Error for VisualError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cdp(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AdapterError> for VisualError {
    fn from(err: AdapterError) -> Self {
        Self::Cdp(err)
    }
}

impl From<image::ImageError> for VisualError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing(err.to_string())
    }
}

impl From<base64::DecodeError> for VisualError {
    fn from(err: base64::DecodeError) -> Self {
        Self::CaptureFailed(format!("invalid base64 payload: {}", err))
    }
}
