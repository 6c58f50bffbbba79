//! Working-folder state.

mod project;

pub use project::{ImageItem, ProjectState, is_image_file};
