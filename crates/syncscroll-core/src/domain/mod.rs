//! Domain entities for SyncScroll.
//!
//! Pure values and arithmetic with no OS dependencies:
//!
//! - [`geometry`] – `Point`, `Rect`, word packing, and coordinate normalization.
//! - [`remap`] – translation of a point from the source rect into the target rect.
//! - [`window`] – window identity (`WindowRef`) and list reconciliation helpers.
//! - [`guard`] – the re-entrancy guard that suppresses real scrolls at the target.

pub mod geometry;
pub mod guard;
pub mod remap;
pub mod window;
