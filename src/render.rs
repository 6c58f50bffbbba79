//! Box overlay rendering.
//!
//! [`render`] is a pure function from boxes, display size, selection and drag
//! state to a list of draw commands. It never touches the box store, so a
//! front-end can redraw at any time, at any size.

use std::fmt;

use crate::color_utils::label_color;
use crate::config::LabelFont;
use crate::model::{BoundingBox, DisplayRect, DisplaySize, to_display};

/// Color of the selected box outline.
const SELECTED_COLOR: [u8; 3] = [255, 255, 255];

/// Color of the box being drawn.
const PREVIEW_COLOR: [u8; 3] = [255, 220, 0];

/// Stroke widths and label font used by [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub stroke_width: f32,
    pub selected_stroke_width: f32,
    pub label_size: f32,
    pub font: LabelFont,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            selected_stroke_width: 4.0,
            label_size: 14.0,
            font: LabelFont::Builtin,
        }
    }
}

/// One primitive for the front-end to draw, in display pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Outline of a stored box
    Rect {
        rect: DisplayRect,
        color: [u8; 3],
        stroke_width: f32,
        selected: bool,
    },
    /// Label text anchored at its top-left corner
    Text {
        x: f32,
        y: f32,
        text: String,
        color: [u8; 3],
        size: f32,
        font: LabelFont,
    },
    /// Outline of the box being drawn
    Preview { rect: DisplayRect, color: [u8; 3] },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::Rect {
                rect,
                color,
                selected,
                ..
            } => write!(
                f,
                "box ({:.0},{:.0})-({:.0},{:.0}) {}{}",
                rect.x1,
                rect.y1,
                rect.x2,
                rect.y2,
                hex(*color),
                if *selected { " [selected]" } else { "" }
            ),
            DrawCommand::Text { x, y, text, .. } => {
                write!(f, "label '{}' at ({:.0},{:.0})", text, x, y)
            }
            DrawCommand::Preview { rect, .. } => write!(
                f,
                "drawing ({:.0},{:.0})-({:.0},{:.0})",
                rect.x1, rect.y1, rect.x2, rect.y2
            ),
        }
    }
}

fn hex(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Build the draw commands for one frame.
///
/// Boxes are emitted in insertion order so later boxes are drawn on top. With
/// the overlay hidden only the drag preview is drawn. `drag` holds the raw
/// drag corners; they are sorted and clamped to the surface here.
pub fn render(
    boxes: &[BoundingBox],
    display: DisplaySize,
    selected: Option<usize>,
    overlay_visible: bool,
    drag: Option<(f32, f32, f32, f32)>,
    style: &RenderStyle,
) -> Vec<DrawCommand> {
    let mut commands = Vec::new();

    if overlay_visible {
        for (index, bbox) in boxes.iter().enumerate() {
            let rect = to_display(bbox, display);
            let is_selected = selected == Some(index);
            let color = label_color(&bbox.label);

            commands.push(DrawCommand::Rect {
                rect,
                color: if is_selected { SELECTED_COLOR } else { color },
                stroke_width: if is_selected {
                    style.selected_stroke_width
                } else {
                    style.stroke_width
                },
                selected: is_selected,
            });

            // Label sits above the box, or inside it at the top edge
            let label_y = if rect.y1 >= style.label_size {
                rect.y1 - style.label_size
            } else {
                rect.y1
            };
            commands.push(DrawCommand::Text {
                x: rect.x1,
                y: label_y,
                text: bbox.label.clone(),
                color,
                size: style.label_size,
                font: style.font.clone(),
            });
        }
    }

    if let Some((x1, y1, x2, y2)) = drag {
        let clamp_x = |v: f32| v.clamp(0.0, display.width);
        let clamp_y = |v: f32| v.clamp(0.0, display.height);
        commands.push(DrawCommand::Preview {
            rect: DisplayRect {
                x1: clamp_x(x1.min(x2)),
                y1: clamp_y(y1.min(y2)),
                x2: clamp_x(x1.max(x2)),
                y2: clamp_y(y1.max(y2)),
            },
            color: PREVIEW_COLOR,
        });
    }

    commands
}
