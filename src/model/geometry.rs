//! Conversion between normalized annotation space and the display surface.
//!
//! Normalized coordinates are the only durable representation. Display
//! coordinates are recomputed on every render from the current [`DisplaySize`].

use crate::constants::MIN_DRAG_SPAN;
use crate::model::annotation::BoundingBox;

/// Size of the surface an image is drawn onto, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Fit an image into `bounds`, keeping its aspect ratio.
    ///
    /// Images that already fit are shown at their native size; larger ones are
    /// scaled down. Each side is at least one pixel.
    pub fn fit(image_width: u32, image_height: u32, bounds: DisplaySize) -> Self {
        let w = image_width.max(1) as f32;
        let h = image_height.max(1) as f32;
        let scale = (bounds.width.max(1.0) / w)
            .min(bounds.height.max(1.0) / h)
            .min(1.0);
        Self {
            width: (w * scale).round().max(1.0),
            height: (h * scale).round().max(1.0),
        }
    }

    /// Square bounds with the given edge length.
    pub fn square(edge: u32) -> Self {
        let edge = edge.max(1) as f32;
        Self::new(edge, edge)
    }
}

/// Axis-aligned rectangle in display pixels, `(x1, y1)` top-left and `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl DisplayRect {
    /// Check if a point lies inside the rectangle, edges included.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// Geometry of a box in normalized image space, without a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Project a box onto the display surface, clamping its corners to the surface.
pub fn to_display(bbox: &BoundingBox, display: DisplaySize) -> DisplayRect {
    let half_w = bbox.width / 2.0;
    let half_h = bbox.height / 2.0;
    DisplayRect {
        x1: ((bbox.center_x - half_w) * display.width).clamp(0.0, display.width),
        y1: ((bbox.center_y - half_h) * display.height).clamp(0.0, display.height),
        x2: ((bbox.center_x + half_w) * display.width).clamp(0.0, display.width),
        y2: ((bbox.center_y + half_h) * display.height).clamp(0.0, display.height),
    }
}

/// Convert two display-space corners into a normalized rectangle.
///
/// The corners may be given in any order, so a drag in any direction works.
/// Both points are clamped onto the surface, then each axis is widened to at
/// least [`MIN_DRAG_SPAN`] pixels (staying on the surface) before dividing by
/// the display size. The result therefore always has a positive area.
pub fn to_normalized(x1: f32, y1: f32, x2: f32, y2: f32, display: DisplaySize) -> NormalizedRect {
    let (left, right) = normalized_axis(x1, x2, display.width);
    let (top, bottom) = normalized_axis(y1, y2, display.height);

    NormalizedRect {
        center_x: (left + right) / 2.0 / display.width,
        center_y: (top + bottom) / 2.0 / display.height,
        width: (right - left) / display.width,
        height: (bottom - top) / display.height,
    }
}

/// Sort, clamp and widen one axis of a corner pair.
fn normalized_axis(a: f32, b: f32, extent: f32) -> (f32, f32) {
    let lo = a.min(b).clamp(0.0, extent);
    let mut hi = a.max(b).clamp(0.0, extent);
    let span = MIN_DRAG_SPAN.min(extent);

    if hi - lo >= span {
        return (lo, hi);
    }

    hi = lo + span;
    if hi > extent {
        (extent - span, extent)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_fit_only_shrinks() {
        let bounds = DisplaySize::square(1000);
        assert_eq!(DisplaySize::fit(640, 480, bounds), DisplaySize::new(640.0, 480.0));
        assert_eq!(DisplaySize::fit(2000, 1000, bounds), DisplaySize::new(1000.0, 500.0));
        assert_eq!(DisplaySize::fit(1000, 4000, bounds), DisplaySize::new(250.0, 1000.0));
        assert_eq!(
            DisplaySize::fit(800, 600, DisplaySize::new(400.0, 600.0)),
            DisplaySize::new(400.0, 300.0)
        );
    }

    #[test]
    fn test_to_display() {
        let bbox = BoundingBox::new("0", 0.5, 0.5, 0.2, 0.4);
        let rect = to_display(&bbox, DisplaySize::new(200.0, 100.0));
        assert!(approx(rect.x1, 80.0));
        assert!(approx(rect.y1, 30.0));
        assert!(approx(rect.x2, 120.0));
        assert!(approx(rect.y2, 70.0));
    }

    #[test]
    fn test_to_display_clamps_overhang() {
        let bbox = BoundingBox::new("0", 0.95, 0.05, 0.2, 0.2);
        let rect = to_display(&bbox, DisplaySize::new(100.0, 100.0));
        assert!(approx(rect.x2, 100.0));
        assert!(approx(rect.y1, 0.0));
    }

    #[test]
    fn test_to_normalized_any_drag_direction() {
        let display = DisplaySize::new(200.0, 100.0);
        let expected = to_normalized(20.0, 10.0, 60.0, 50.0, display);
        for (x1, y1, x2, y2) in [
            (60.0, 50.0, 20.0, 10.0),
            (20.0, 50.0, 60.0, 10.0),
            (60.0, 10.0, 20.0, 50.0),
        ] {
            assert_eq!(to_normalized(x1, y1, x2, y2, display), expected);
        }
        assert!(approx(expected.center_x, 0.2));
        assert!(approx(expected.center_y, 0.3));
        assert!(approx(expected.width, 0.2));
        assert!(approx(expected.height, 0.4));
    }

    #[test]
    fn test_to_normalized_clamps_to_surface() {
        let rect = to_normalized(-50.0, -10.0, 150.0, 50.0, DisplaySize::new(100.0, 100.0));
        assert!(approx(rect.center_x, 0.5));
        assert!(approx(rect.width, 1.0));
        assert!(approx(rect.center_y, 0.25));
        assert!(approx(rect.height, 0.5));
    }

    #[test]
    fn test_to_normalized_enforces_minimum_span() {
        let display = DisplaySize::new(100.0, 100.0);

        let rect = to_normalized(10.0, 10.0, 10.0, 10.0, display);
        assert!(approx(rect.width, 0.01));
        assert!(approx(rect.height, 0.01));

        // Degenerate at the far edge widens inward
        let edge = to_normalized(100.0, 100.0, 120.0, 130.0, display);
        assert!(approx(edge.width, 0.01));
        assert!(approx(edge.center_x, 0.995));
        assert!(approx(edge.center_y, 0.995));
    }

    #[test]
    fn test_round_trip_through_display() {
        let display = DisplaySize::new(640.0, 480.0);
        let bbox = BoundingBox::new("3", 0.3, 0.6, 0.25, 0.1);
        let rect = to_display(&bbox, display);
        let back = to_normalized(rect.x1, rect.y1, rect.x2, rect.y2, display);
        assert!(approx(back.center_x, 0.3));
        assert!(approx(back.center_y, 0.6));
        assert!(approx(back.width, 0.25));
        assert!(approx(back.height, 0.1));
    }
}
