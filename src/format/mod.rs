//! Sidecar annotation files.
//!
//! Every image may have a plain-text sidecar with the same basename holding
//! its boxes in YOLO TXT layout. This module parses and writes those files.

mod error;
pub mod yolo;

pub use error::FormatError;
pub use yolo::{SaveOutcome, load, parse, save, serialize, sidecar_path};
