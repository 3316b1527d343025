//! pagetag library
//!
//! A [`PageSession`] numbers the interactive elements a user can currently see on a
//! browser page and performs clicks, typing, scrolling and navigation addressed by
//! those numbers. Browser access goes through the `cdp-adapter` crate; tagging lives
//! in `perceiver-structural`, the annotated screenshot in `perceiver-visual` and the
//! input primitives in `action-primitives`.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod page;
pub mod telemetry;

pub use config::PagetagConfig;
pub use errors::{PageError, PageResult};
pub use page::PageSession;

pub use action_primitives::{ActionError, ActionReport, Pacing};
pub use perceiver_structural::{PageDetails, ScrollDirection, Tag, TagKind, TagMap};
pub use perceiver_visual::ScreenshotDetails;
