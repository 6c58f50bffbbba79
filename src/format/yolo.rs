//! YOLO TXT sidecar codec.
//!
//! One box per line: `<label> <x_center> <y_center> <width> <height>`, with
//! the four geometric fields normalized to [0, 1]. A missing sidecar means
//! zero boxes, and an empty box set is persisted by removing the sidecar.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{COORD_PRECISION, SIDECAR_EXTENSION};
use crate::format::error::FormatError;
use crate::model::{AnnotationSet, BoundingBox};

/// What a [`save`] call did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The sidecar was (re)written with at least one box.
    Written,
    /// The set was empty and an existing sidecar was deleted.
    Removed,
    /// The set was empty and there was no sidecar to delete.
    Absent,
}

/// Path of the sidecar belonging to an image: same basename, `.txt` extension.
pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension(SIDECAR_EXTENSION)
}

/// Parse sidecar text into boxes, skipping any malformed line.
pub fn parse(text: &str) -> AnnotationSet {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                log::trace!("Skipping malformed annotation line {}: {:?}", idx + 1, line);
            }
            parsed
        })
        .collect()
}

/// Parse a single annotation line.
///
/// Requires exactly five fields, finite numbers and a geometry that passes
/// [`BoundingBox::is_valid`].
pub fn parse_line(line: &str) -> Option<BoundingBox> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return None;
    }

    let center_x: f32 = parts[1].parse().ok()?;
    let center_y: f32 = parts[2].parse().ok()?;
    let width: f32 = parts[3].parse().ok()?;
    let height: f32 = parts[4].parse().ok()?;

    let bbox = BoundingBox::new(parts[0], center_x, center_y, width, height);
    bbox.is_valid().then_some(bbox)
}

/// Serialize boxes, one newline-terminated line each.
pub fn serialize(boxes: &[BoundingBox]) -> String {
    let mut out = String::new();
    for bbox in boxes {
        out.push_str(&format_line(bbox));
        out.push('\n');
    }
    out
}

/// Format one box with fixed precision on the geometric fields.
pub fn format_line(bbox: &BoundingBox) -> String {
    format!(
        "{} {:.prec$} {:.prec$} {:.prec$} {:.prec$}",
        bbox.label,
        bbox.center_x,
        bbox.center_y,
        bbox.width,
        bbox.height,
        prec = COORD_PRECISION
    )
}

/// Load a sidecar. Missing, unreadable or non-UTF-8 files yield an empty set.
pub fn load(path: &Path) -> AnnotationSet {
    match std::fs::read_to_string(path) {
        Ok(text) => parse(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AnnotationSet::new(),
        Err(e) => {
            log::warn!("Could not read sidecar {:?}: {}", path, e);
            AnnotationSet::new()
        }
    }
}

/// Persist boxes to a sidecar.
///
/// Non-empty sets are written to a temporary file in the same directory and
/// then renamed over the target, so a crash never leaves a half-written file.
/// Empty sets remove the sidecar instead.
pub fn save(path: &Path, boxes: &[BoundingBox]) -> Result<SaveOutcome, FormatError> {
    if boxes.is_empty() {
        return match std::fs::remove_file(path) {
            Ok(()) => {
                log::info!("Removed empty sidecar {:?}", path);
                Ok(SaveOutcome::Removed)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SaveOutcome::Absent),
            Err(e) => Err(e.into()),
        };
    }

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => return Err(FormatError::invalid_path(path)),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".sortbox-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(serialize(boxes).as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| FormatError::Io(e.error))?;

    log::info!("Saved {} boxes to {:?}", boxes.len(), path);
    Ok(SaveOutcome::Written)
}
