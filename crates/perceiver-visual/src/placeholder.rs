//! Stand-in image returned when a screenshot cannot be captured in time.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{Rgba, RgbaImage};
use once_cell::sync::OnceCell;

use crate::errors::VisualError;
use crate::font::Typeset;
use crate::overlay::encode_png;

pub const PLACEHOLDER_WIDTH: u32 = 640;
pub const PLACEHOLDER_HEIGHT: u32 = 480;
const MESSAGE: &str = "NOT AVAILABLE";
const MESSAGE_PX: f32 = 48.0;

static PLACEHOLDER_B64: OnceCell<String> = OnceCell::new();

/// 640x480 white PNG with a centred black "NOT AVAILABLE".
pub fn not_available_png() -> Result<Vec<u8>, VisualError> {
    let mut image = RgbaImage::from_pixel(
        PLACEHOLDER_WIDTH,
        PLACEHOLDER_HEIGHT,
        Rgba([255, 255, 255, 255]),
    );
    let typeset = Typeset::new(MESSAGE_PX)?;
    let (width, height) = typeset.measure(MESSAGE);
    let x = (PLACEHOLDER_WIDTH as i32 - width).max(0) / 2;
    let y = (PLACEHOLDER_HEIGHT as i32 - height).max(0) / 2;
    typeset.draw(&mut image, x, y, MESSAGE, Rgba([0, 0, 0, 255]));
    encode_png(&image)
}

/// Base64 form of [`not_available_png`], rendered once per process.
pub fn not_available_base64() -> Result<String, VisualError> {
    PLACEHOLDER_B64
        .get_or_try_init(|| not_available_png().map(|png| STANDARD.encode(png)))
        .cloned()
}
