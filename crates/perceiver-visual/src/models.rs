//! Data models for visual perception
use serde::{Deserialize, Serialize};

/// Error flag attached to a screenshot that could not be captured in time.
pub const UNAVAILABLE: &str = "unavailable";

/// PNG captured from the page viewport
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// What callers receive from a screenshot request: always an image, plus an
/// error flag when the image is a stand-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotDetails {
    pub b64_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScreenshotDetails {
    pub fn image(b64_image: String) -> Self {
        Self {
            b64_image,
            error: None,
        }
    }

    pub fn unavailable(b64_image: String) -> Self {
        Self {
            b64_image,
            error: Some(UNAVAILABLE.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}
