//! Visual side of tagging: viewport capture, the annotated debug overlay and the
//! placeholder used when no screenshot is available.

pub mod errors;
pub mod font;
pub mod models;
pub mod overlay;
pub mod placeholder;
pub mod screenshot;

pub use errors::VisualError;
pub use models::{Screenshot, ScreenshotDetails, UNAVAILABLE};
pub use overlay::{annotate, annotate_png, palette, LABEL_PX};
pub use placeholder::{not_available_base64, not_available_png};
pub use screenshot::capture_png;
