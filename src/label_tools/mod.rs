//! Bulk maintenance over a directory of sidecar files.
//!
//! These work on sidecars directly (non-recursive, `classes.txt` excluded)
//! and read them with the regular codec, so malformed lines are skipped here
//! exactly as they are in the editor. [`labelme`] feeds sidecars in from
//! labelme JSON, and [`split`] lists a sorted bucket for training.

mod labelme;
mod split;

pub use labelme::{ImportReport, import_labelme, labelme_to_boxes};
pub use split::{DatasetSplit, split_images, write_split};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::{CLASSES_FILENAME, SIDECAR_EXTENSION};
use crate::format::{self, FormatError};

/// Errors from the label tools.
#[derive(Error, Debug)]
pub enum LabelToolError {
    /// The directory could not be listed
    #[error("Cannot read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An output file or directory could not be written
    #[error("Cannot write {path:?}: {source}")]
    Unwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A label that cannot be written as one sidecar field
    #[error("Invalid label '{0}'")]
    InvalidLabel(String),

    /// An import needs at least one class name
    #[error("No class names given")]
    NoClasses,

    /// A split ratio outside 0.0-1.0
    #[error("Train ratio {0} is not between 0 and 1")]
    InvalidRatio(f32),

    /// Rewriting a sidecar failed
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Counts of a bulk relabel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelabelReport {
    pub files_changed: usize,
    pub boxes_changed: usize,
}

/// Files directly inside `dir` with extension `ext`, sorted by path.
fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, LabelToolError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LabelToolError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    files.sort();
    Ok(files)
}

/// Sidecar files directly inside `dir`, sorted by path.
pub fn sidecar_files(dir: &Path) -> Result<Vec<PathBuf>, LabelToolError> {
    let mut files = files_with_extension(dir, SIDECAR_EXTENSION)?;
    files.retain(|path| path.file_name().and_then(|n| n.to_str()) != Some(CLASSES_FILENAME));
    Ok(files)
}

/// Number of boxes per label across every sidecar in `dir`.
pub fn label_distribution(dir: &Path) -> Result<BTreeMap<String, usize>, LabelToolError> {
    let mut counts = BTreeMap::new();
    for file in sidecar_files(dir)? {
        for bbox in format::load(&file) {
            *counts.entry(bbox.label).or_insert(0) += 1;
        }
    }
    log::debug!("Label distribution of {:?}: {:?}", dir, counts);
    Ok(counts)
}

/// Least frequent label. Ties go to the label that sorts first.
pub fn minority_label(distribution: &BTreeMap<String, usize>) -> Option<&str> {
    let mut minority: Option<(&str, usize)> = None;
    for (label, &count) in distribution {
        if minority.is_none_or(|(_, best)| count < best) {
            minority = Some((label.as_str(), count));
        }
    }
    minority.map(|(label, _)| label)
}

/// Sidecars in `dir` holding at least one box with `label`, sorted.
pub fn files_with_label(dir: &Path, label: &str) -> Result<Vec<PathBuf>, LabelToolError> {
    Ok(sidecar_files(dir)?
        .into_iter()
        .filter(|file| format::load(file).iter().any(|bbox| bbox.label == label))
        .collect())
}

/// Replace label `from` with `to` in every sidecar of `dir`.
///
/// Only files that contain `from` are rewritten. Malformed lines in those
/// files are dropped by the rewrite.
pub fn relabel_all(dir: &Path, from: &str, to: &str) -> Result<RelabelReport, LabelToolError> {
    if to.is_empty() || to.chars().any(char::is_whitespace) {
        return Err(LabelToolError::InvalidLabel(to.to_string()));
    }

    let mut report = RelabelReport::default();
    for file in sidecar_files(dir)? {
        let mut boxes = format::load(&file);
        let mut changed = 0;
        for bbox in boxes.iter_mut().filter(|bbox| bbox.label == from) {
            bbox.label = to.to_string();
            changed += 1;
        }
        if changed == 0 {
            continue;
        }

        format::save(&file, &boxes)?;
        log::info!("Relabeled {} boxes in {:?}", changed, file);
        report.files_changed += 1;
        report.boxes_changed += changed;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_distribution_skips_classes_and_junk() {
        let dir = setup(&[
            ("a.txt", "0 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.1 0.1\n"),
            ("b.txt", "0 0.5 0.5 0.1 0.1\nnot a box\n"),
            ("classes.txt", "0\n1\n"),
            ("c.jpg", "img"),
        ]);
        let dist = label_distribution(dir.path()).unwrap();
        assert_eq!(dist.get("0"), Some(&2));
        assert_eq!(dist.get("1"), Some(&1));
        assert_eq!(dist.len(), 2);
    }

    #[test]
    fn test_minority_label() {
        let mut dist = BTreeMap::new();
        assert_eq!(minority_label(&dist), None);
        dist.insert("b".to_string(), 1);
        dist.insert("a".to_string(), 1);
        dist.insert("c".to_string(), 5);
        assert_eq!(minority_label(&dist), Some("a"));
    }

    #[test]
    fn test_relabel_all() {
        let dir = setup(&[
            ("a.txt", "0 0.5 0.5 0.1 0.1\n0 0.2 0.2 0.1 0.1\n"),
            ("b.txt", "1 0.5 0.5 0.1 0.1\n"),
        ]);
        let before_b = std::fs::read_to_string(dir.path().join("b.txt")).unwrap();

        let report = relabel_all(dir.path(), "0", "3").unwrap();
        assert_eq!(
            report,
            RelabelReport {
                files_changed: 1,
                boxes_changed: 2
            }
        );
        assert_eq!(files_with_label(dir.path(), "3").unwrap(), vec![dir.path().join("a.txt")]);
        assert_eq!(std::fs::read_to_string(dir.path().join("b.txt")).unwrap(), before_b);
    }

    #[test]
    fn test_relabel_rejects_bad_label() {
        let dir = setup(&[]);
        assert!(matches!(
            relabel_all(dir.path(), "0", "a b"),
            Err(LabelToolError::InvalidLabel(_))
        ));
    }
}
