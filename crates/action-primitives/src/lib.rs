//! Action primitives for tagged pages
//!
//! This crate turns annotation numbers from a tagging pass into browser input:
//! pointer clicks and hovers, focus and text entry, named key presses, container
//! scrolling, `<select>` option picking and navigation.

pub mod errors;
pub mod keys;
pub mod object_group;
mod primitives;
pub mod types;

pub use errors::*;
pub use object_group::{call_function_on_node, ObjectGroup};
pub use primitives::*;
pub use types::*;
