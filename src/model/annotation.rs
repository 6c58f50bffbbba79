//! Bounding box types and drag-gesture state.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_DRAG_SPAN;
use crate::model::geometry::{DisplaySize, NormalizedRect};

/// A labeled box in normalized image space.
///
/// All four geometric fields are fractions of the image size. The label is an
/// opaque string; numeric class ids are only a convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Class label, written first on a sidecar line
    pub label: String,
    /// Horizontal center, 0.0-1.0
    pub center_x: f32,
    /// Vertical center, 0.0-1.0
    pub center_y: f32,
    /// Width, 0.0-1.0
    pub width: f32,
    /// Height, 0.0-1.0
    pub height: f32,
}

/// Ordered boxes of one image. Insertion order is draw order: the last box is on top.
pub type AnnotationSet = Vec<BoundingBox>;

impl BoundingBox {
    pub fn new(label: impl Into<String>, center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            label: label.into(),
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Build a box from a label and a normalized rectangle.
    pub fn from_rect(label: impl Into<String>, rect: NormalizedRect) -> Self {
        Self::new(label, rect.center_x, rect.center_y, rect.width, rect.height)
    }

    /// Check the normalized-space invariant: positive size no larger than the
    /// image, center inside the image.
    pub fn is_valid(&self) -> bool {
        let unit = 0.0..=1.0;
        self.width > 0.0
            && self.height > 0.0
            && self.width <= 1.0
            && self.height <= 1.0
            && unit.contains(&self.center_x)
            && unit.contains(&self.center_y)
    }
}

/// State of a box being drawn with the pointer, in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawingState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Pointer pressed at `start`, currently at `current`.
    Dragging {
        start_x: f32,
        start_y: f32,
        current_x: f32,
        current_y: f32,
    },
}

impl DrawingState {
    /// Start a new drag at the given display point.
    pub fn begin(x: f32, y: f32) -> Self {
        DrawingState::Dragging {
            start_x: x,
            start_y: y,
            current_x: x,
            current_y: y,
        }
    }

    /// Check if a drag is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawingState::Dragging { .. })
    }

    /// Move the free corner of an in-progress drag. No-op when idle.
    pub fn update(&mut self, x: f32, y: f32) {
        if let DrawingState::Dragging {
            current_x,
            current_y,
            ..
        } = self
        {
            *current_x = x;
            *current_y = y;
        }
    }

    /// Corners of the drag as `(x1, y1, x2, y2)`, in the order they were drawn.
    pub fn corners(&self) -> Option<(f32, f32, f32, f32)> {
        match *self {
            DrawingState::Idle => None,
            DrawingState::Dragging {
                start_x,
                start_y,
                current_x,
                current_y,
            } => Some((start_x, start_y, current_x, current_y)),
        }
    }

    /// Check that the drag, once clamped to the display, spans at least
    /// [`MIN_DRAG_SPAN`] pixels on both axes.
    pub fn spans_minimum(&self, display: DisplaySize) -> bool {
        let Some((x1, y1, x2, y2)) = self.corners() else {
            return false;
        };
        let clamp_x = |v: f32| v.clamp(0.0, display.width);
        let clamp_y = |v: f32| v.clamp(0.0, display.height);
        let span_x = (clamp_x(x2) - clamp_x(x1)).abs();
        let span_y = (clamp_y(y2) - clamp_y(y1)).abs();
        span_x >= MIN_DRAG_SPAN && span_y >= MIN_DRAG_SPAN
    }
}
