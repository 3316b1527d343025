//! Viewport capture through `Page.captureScreenshot`
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cdp_adapter::Cdp;
use serde_json::{json, Value};

use crate::errors::VisualError;
use crate::models::Screenshot;

/// Captures the current viewport as PNG.
pub async fn capture_png<C>(cdp: &C) -> Result<Screenshot, VisualError>
where
    C: Cdp + ?Sized,
{
    tracing::debug!("capturing viewport screenshot");
    let reply = cdp
        .send("Page.captureScreenshot", json!({ "format": "png" }))
        .await?;
    let encoded = reply
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| VisualError::CaptureFailed("reply has no data field".to_string()))?;
    let data = STANDARD.decode(encoded)?;
    let (width, height) = image_dimensions(&data)?;
    Ok(Screenshot {
        data,
        width,
        height,
    })
}

/// Get image dimensions from raw data
fn image_dimensions(data: &[u8]) -> Result<(u32, u32), VisualError> {
    use image::io::Reader as ImageReader;
    use std::io::Cursor;

    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| VisualError::ImageProcessing(format!("Format detection failed: {}", e)))?
        .into_dimensions()
        .map_err(|e| VisualError::ImageProcessing(format!("Image decode failed: {}", e)))
}
