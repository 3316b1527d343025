//! Label typeface. DejaVu Sans Mono is compiled in so rendering never depends on
//! fonts installed on the host.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use once_cell::sync::OnceCell;
use rusttype::{Font, Scale};

use crate::errors::VisualError;

static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");
static LABEL_FONT: OnceCell<Font<'static>> = OnceCell::new();

pub fn label_font() -> Result<&'static Font<'static>, VisualError> {
    LABEL_FONT.get_or_try_init(|| {
        Font::try_from_bytes(FONT_BYTES)
            .ok_or_else(|| VisualError::ImageProcessing("bundled label font does not parse".into()))
    })
}

/// Text set in the bundled font at one pixel height.
#[derive(Clone, Copy)]
pub struct Typeset {
    font: &'static Font<'static>,
    scale: Scale,
}

impl Typeset {
    pub fn new(px: f32) -> Result<Self, VisualError> {
        Ok(Self {
            font: label_font()?,
            scale: Scale::uniform(px),
        })
    }

    /// Width and height of the inked area, measured from the draw origin.
    pub fn measure(&self, text: &str) -> (i32, i32) {
        text_size(self.scale, self.font, text)
    }

    /// Draws `text` with its top-left inked corner near `(x, y)`.
    pub fn draw(&self, image: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        draw_text_mut(image, color, x, y, self.scale, self.font, text);
    }
}
