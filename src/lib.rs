//! sortbox - image sorting and bounding-box curation
//!
//! Classifies the images of a folder into two outcome buckets, moving each
//! image together with its YOLO TXT sidecar, and lets an operator draw,
//! relabel and delete boxes on the current image. Every classification and
//! every saved edit can be undone.

pub mod annotation;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod keybindings;
pub mod label_tools;
pub mod message;
pub mod model;
pub mod mover;
pub mod render;
pub mod session;
pub mod state;
pub mod terminal;
pub mod undo;

pub use config::AppConfig;
pub use error::SessionError;
pub use message::Action;
pub use session::{Effect, Session, SessionOptions, SessionState};
