//! Debug overlay: outlined boxes and annotation numbers over a screenshot.

use std::io::Cursor;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PixelRect;
use perceiver_structural::{Rect, TaggedElements};

use crate::errors::VisualError;
use crate::font::Typeset;

const OUTLINE_WIDTH: i32 = 2;
const LABEL_PADDING: i32 = 4;
/// Label glyph height in pixels
pub const LABEL_PX: f32 = 14.0;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// `(box colour, label text colour)` by lowercase element name.
pub fn palette(element_name: &str) -> (Rgba<u8>, Rgba<u8>) {
    match element_name.to_ascii_lowercase().as_str() {
        "input" => (Rgba([0x00, 0xFF, 0x00, 255]), BLACK),
        "a" => (Rgba([0xFF, 0x69, 0xB4, 255]), WHITE),
        "div" => (Rgba([0x00, 0xFF, 0xFF, 255]), BLACK),
        _ => (Rgba([0xFF, 0x00, 0x00, 255]), WHITE),
    }
}

fn pixel_rect(x: i32, y: i32, width: i32, height: i32) -> Option<PixelRect> {
    (width > 0 && height > 0).then(|| PixelRect::at(x, y).of_size(width as u32, height as u32))
}

/// Draws one box, edges inclusive, with its label in the top-right corner.
fn draw_annotation(
    image: &mut RgbaImage,
    typeset: &Typeset,
    bounds: Rect,
    label: &str,
    colors: (Rgba<u8>, Rgba<u8>),
) {
    let (box_color, text_color) = colors;
    for inset in 0..OUTLINE_WIDTH {
        if let Some(ring) = pixel_rect(
            bounds.x + inset,
            bounds.y + inset,
            bounds.width + 1 - 2 * inset,
            bounds.height + 1 - 2 * inset,
        ) {
            draw_hollow_rect_mut(image, ring, box_color);
        }
    }

    let (text_width, text_height) = typeset.measure(label);
    let text_x = bounds.right() - text_width;
    let text_y = bounds.y;
    if let Some(background) = pixel_rect(
        text_x - LABEL_PADDING,
        text_y,
        text_width + 2 * LABEL_PADDING + 1,
        text_height + LABEL_PADDING + 1,
    ) {
        draw_filled_rect_mut(image, background, box_color);
    }
    typeset.draw(image, text_x, text_y, label, text_color);
}

/// Draws every tagged element; bounds are shifted from page to viewport coordinates.
pub fn annotate(
    image: &mut RgbaImage,
    visible_rect: &Rect,
    elements: &TaggedElements,
) -> Result<(), VisualError> {
    let typeset = Typeset::new(LABEL_PX)?;
    for (annotation, element) in elements.iter() {
        let bounds = element.bounds.translate(-visible_rect.x, -visible_rect.y);
        draw_annotation(
            image,
            &typeset,
            bounds,
            &annotation.to_string(),
            palette(&element.name),
        );
    }
    Ok(())
}

/// Decodes `png`, draws the overlay and re-encodes it as PNG.
pub fn annotate_png(
    png: &[u8],
    visible_rect: &Rect,
    elements: &TaggedElements,
) -> Result<Vec<u8>, VisualError> {
    let mut image = image::load_from_memory(png)
        .map_err(|e| VisualError::ImageProcessing(format!("Failed to decode screenshot: {}", e)))?
        .to_rgba8();
    annotate(&mut image, visible_rect, elements)?;
    tracing::debug!(elements = elements.len(), "annotated screenshot");
    encode_png(&image)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, VisualError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| VisualError::ImageProcessing(format!("Failed to encode image: {}", e)))?;
    Ok(buf)
}
