//! Data models for sortbox.

mod annotation;
pub mod geometry;

pub use annotation::{AnnotationSet, BoundingBox, DrawingState};
pub use geometry::{DisplayRect, DisplaySize, NormalizedRect, to_display, to_normalized};
