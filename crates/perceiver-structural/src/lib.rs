//! Snapshot-driven discovery of the interactive elements a user can see on a page.
//!
//! A pass captures one `DOMSnapshot`, resolves where every frame sits, extracts the
//! on-screen elements of each visible frame, keeps the interactive ones, confirms them
//! with live hit tests and turns the survivors into numbered [`Tag`]s.

pub mod classify;
pub mod decoder;
pub mod element;
pub mod errors;
pub mod extract;
pub mod frames;
pub mod metrics;
pub mod rect;
pub mod select;
pub mod snapshot;
pub mod table;
pub mod tagger;
pub mod tags;
pub mod text;
pub mod viewport;
pub mod visibility;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use element::{Element, ElementKind, ScrollDirection};
pub use errors::PerceiverError;
pub use rect::Rect;
pub use table::{TagMap, TaggedElements};
pub use tagger::{default_queried_styles, run_pass, TaggingOptions, TaggingPass};
pub use tags::{AnchorTag, BaseTag, InputTag, SelectTag, Tag, TagKind};
pub use viewport::{fetch_page_details, fetch_visible_rect, PageDetails, PageDimensions, Viewport};
