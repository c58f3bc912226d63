//! Layout Module
//!
//! Vertical page layout using Taffy.
//!
//! # Architecture
//!
//! The layout module uses [Taffy](https://github.com/DioxusLabs/taffy) for
//! W3C-compliant flexbox computation. The bridge:
//!
//! 1. Converts element boxes → Taffy styles (column flow, rows on request)
//! 2. Builds the Taffy tree from the document's parent links
//! 3. Measures text leaves by line count
//! 4. Extracts document-absolute tops and heights per element
//!
//! # Liveness
//!
//! [`Document`](crate::engine::Document) caches the result and drops it on
//! any change that can move an element, so `offset_top` is always current.

mod taffy_bridge;
mod types;

pub use taffy_bridge::compute_layout;
pub use types::*;
