//! Conversion of labelme JSON annotations into sidecars.

use std::path::Path;

use serde::Deserialize;

use super::{LabelToolError, files_with_extension};
use crate::constants::LABELME_EXTENSION;
use crate::format;
use crate::model::{AnnotationSet, BoundingBox};

/// One labelme shape. Only the fields a box needs are read.
#[derive(Debug, Clone, Deserialize)]
struct Shape {
    label: String,
    points: Vec<(f64, f64)>,
    #[serde(default)]
    shape_type: String,
}

/// The parts of a labelme file a conversion reads; the rest is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelmeFile {
    shapes: Vec<Shape>,
    image_width: u32,
    image_height: u32,
}

/// Counts of a labelme import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    /// JSON files that produced a sidecar
    pub files_converted: usize,
    /// Boxes written across all sidecars
    pub boxes_written: usize,
    /// Shapes with an unknown label or no area
    pub shapes_skipped: usize,
    /// JSON files with no usable shape; no sidecar is written for them
    pub files_without_boxes: usize,
    /// JSON files that could not be read or parsed
    pub files_failed: usize,
}

/// Pixel bounds of a shape as (x_min, y_min, x_max, y_max).
///
/// Circles are stored as center and one rim point; everything else is bounded
/// by its points.
fn shape_bounds(shape: &Shape) -> Option<(f64, f64, f64, f64)> {
    if shape.shape_type == "circle" {
        let &[(cx, cy), (px, py), ..] = shape.points.as_slice() else {
            return None;
        };
        let radius = ((cx - px).powi(2) + (cy - py).powi(2)).sqrt();
        return Some((cx - radius, cy - radius, cx + radius, cy + radius));
    }

    if shape.points.is_empty() {
        return None;
    }
    Some(shape.points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x_min, y_min, x_max, y_max), &(x, y)| {
            (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
        },
    ))
}

/// Convert one shape; the label becomes its index in `classes`.
fn shape_to_box(shape: &Shape, classes: &[String], width: f64, height: f64) -> Option<BoundingBox> {
    let class_index = classes.iter().position(|class| *class == shape.label)?;
    let (x_min, y_min, x_max, y_max) = shape_bounds(shape)?;

    let (x_min, x_max) = (x_min.clamp(0.0, width), x_max.clamp(0.0, width));
    let (y_min, y_max) = (y_min.clamp(0.0, height), y_max.clamp(0.0, height));
    if x_max <= x_min || y_max <= y_min {
        return None;
    }

    let bbox = BoundingBox::new(
        class_index.to_string(),
        ((x_min + x_max) / 2.0 / width) as f32,
        ((y_min + y_max) / 2.0 / height) as f32,
        ((x_max - x_min) / width) as f32,
        ((y_max - y_min) / height) as f32,
    );
    bbox.is_valid().then_some(bbox)
}

/// Boxes of a parsed file and the number of shapes that were dropped.
fn convert(file: &LabelmeFile, classes: &[String]) -> (AnnotationSet, usize) {
    if file.image_width == 0 || file.image_height == 0 {
        return (AnnotationSet::new(), file.shapes.len());
    }
    let width = f64::from(file.image_width);
    let height = f64::from(file.image_height);

    let boxes: AnnotationSet = file
        .shapes
        .iter()
        .filter_map(|shape| {
            let bbox = shape_to_box(shape, classes, width, height);
            if bbox.is_none() {
                log::trace!("Dropping shape '{}' ({})", shape.label, shape.shape_type);
            }
            bbox
        })
        .collect();
    let skipped = file.shapes.len() - boxes.len();
    (boxes, skipped)
}

/// Convert labelme JSON text into boxes labeled by class index.
///
/// Shapes whose label is not in `classes`, or that have no area inside the
/// image, are dropped.
pub fn labelme_to_boxes(json: &str, classes: &[String]) -> Result<AnnotationSet, serde_json::Error> {
    let file: LabelmeFile = serde_json::from_str(json)?;
    Ok(convert(&file, classes).0)
}

/// Convert every labelme file in `json_dir` into a sidecar in `output_dir`.
///
/// A sidecar takes the JSON file's basename and replaces any sidecar already
/// there. Files that fail to parse are counted and skipped.
pub fn import_labelme(
    json_dir: &Path,
    output_dir: &Path,
    classes: &[String],
) -> Result<ImportReport, LabelToolError> {
    if classes.is_empty() {
        return Err(LabelToolError::NoClasses);
    }
    let files = files_with_extension(json_dir, LABELME_EXTENSION)?;
    std::fs::create_dir_all(output_dir).map_err(|source| LabelToolError::Unwritable {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut report = ImportReport::default();
    for json_path in files {
        let parsed = std::fs::read_to_string(&json_path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<LabelmeFile>(&text).map_err(|e| e.to_string()));
        let file = match parsed {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", json_path, e);
                report.files_failed += 1;
                continue;
            }
        };

        let (boxes, skipped) = convert(&file, classes);
        report.shapes_skipped += skipped;
        if boxes.is_empty() {
            log::debug!("No known shapes in {:?}", json_path);
            report.files_without_boxes += 1;
            continue;
        }

        let Some(name) = json_path.file_name() else {
            continue;
        };
        let sidecar = format::sidecar_path(&output_dir.join(name));
        format::save(&sidecar, &boxes)?;
        log::debug!("Wrote {} boxes to {:?}", boxes.len(), sidecar);
        report.files_converted += 1;
        report.boxes_written += boxes.len();
    }

    log::info!(
        "Imported {} labelme files ({} boxes, {} failed)",
        report.files_converted,
        report.boxes_written,
        report.files_failed
    );
    Ok(report)
}
