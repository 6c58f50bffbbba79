//! Undo history for classification moves and annotation commits.
//!
//! Entries are kept in chronological order and undone strictly from the top,
//! one per call. There is no redo: an undone entry is gone.

use std::path::PathBuf;

use crate::annotation::BoxStore;
use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::error::SessionError;
use crate::format;
use crate::model::AnnotationSet;
use crate::mover::{PairMove, restore_pair};
use crate::state::{ImageItem, ProjectState};

// ============================================================================
// Entry Types
// ============================================================================

/// A reversible operation.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// An image (and maybe its sidecar) was moved into a bucket
    ClassifyMove {
        /// Paths before and after, sidecar only if it actually moved
        moved: PairMove,
        /// Cursor position of the image before it was classified
        previous_cursor_index: usize,
    },
    /// An edited box set was saved for an image
    AnnotationCommit {
        /// Image whose sidecar was written
        image_path: PathBuf,
        /// Boxes as they were when the editor opened
        prior_annotations: AnnotationSet,
    },
}

impl HistoryEntry {
    /// Get a human-readable description of this entry
    pub fn description(&self) -> String {
        match self {
            HistoryEntry::ClassifyMove { moved, .. } => {
                let name = moved
                    .original_image
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("image");
                let bucket = moved
                    .moved_image
                    .parent()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .unwrap_or("bucket");
                format!("Classify '{}' as {}", name, bucket)
            }
            HistoryEntry::AnnotationCommit { image_path, .. } => {
                let name = image_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("image");
                format!("Save annotations of '{}'", name)
            }
        }
    }
}

// ============================================================================
// History Stack
// ============================================================================

/// Configuration for the history stack
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of entries to keep; the oldest are dropped first
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Chronological stack of reversible operations (most recent at the end).
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    config: HistoryConfig,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a completed operation.
    pub fn push(&mut self, entry: HistoryEntry) {
        log::debug!("📝 History: pushed '{}'", entry.description());
        self.entries.push(entry);

        while self.entries.len() > self.config.max_history.max(1) {
            self.entries.remove(0);
        }
    }

    /// Take the most recent entry off the stack.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Get the description of the entry that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.entries.last().map(HistoryEntry::description)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        log::debug!("🗑️ History cleared");
    }
}

// ============================================================================
// Undo Execution
// ============================================================================

/// What a successful undo reversed.
#[derive(Debug)]
pub struct Undone {
    /// The entry that was reversed
    pub entry: HistoryEntry,
    /// Non-fatal problem met while reversing (a sidecar left in its bucket)
    pub warning: Option<SessionError>,
}

/// Reverse the most recent entry.
///
/// Returns `Ok(None)` when the history is empty. If the reversal fails nothing
/// changes in memory and the entry goes back on the stack, unless it is a
/// classification whose moved image no longer exists: that entry can never be
/// undone and is dropped, so older entries stay reachable.
pub fn undo_last(
    stack: &mut HistoryStack,
    project: &mut ProjectState,
    store: &mut BoxStore,
) -> Result<Option<Undone>, SessionError> {
    let Some(entry) = stack.pop() else {
        return Ok(None);
    };

    match apply_undo(&entry, project, store) {
        Ok(warning) => {
            log::debug!("⏪ Undid '{}'", entry.description());
            Ok(Some(Undone { entry, warning }))
        }
        Err(e) => {
            log::warn!("Undo of '{}' failed: {}", entry.description(), e);
            if is_unrecoverable(&entry) {
                log::warn!("Dropped '{}' from history", entry.description());
            } else {
                stack.entries.push(entry);
            }
            Err(e)
        }
    }
}

/// Check if an entry refers to a file that has disappeared from its bucket.
fn is_unrecoverable(entry: &HistoryEntry) -> bool {
    match entry {
        HistoryEntry::ClassifyMove { moved, .. } => !moved.moved_image.exists(),
        HistoryEntry::AnnotationCommit { .. } => false,
    }
}

/// Apply the undo operation for an entry
fn apply_undo(
    entry: &HistoryEntry,
    project: &mut ProjectState,
    store: &mut BoxStore,
) -> Result<Option<SessionError>, SessionError> {
    match entry {
        HistoryEntry::ClassifyMove {
            moved,
            previous_cursor_index,
        } => {
            let warning = restore_pair(moved)?;
            let index = project.restore(
                *previous_cursor_index,
                ImageItem::new(moved.original_image.clone()),
            );
            if index != *previous_cursor_index {
                log::debug!(
                    "Re-inserted at {} instead of {} (sequence shrank)",
                    index,
                    previous_cursor_index
                );
            }
            *store = BoxStore::from_set(format::load(&format::sidecar_path(&moved.original_image)));
            Ok(warning)
        }
        HistoryEntry::AnnotationCommit {
            image_path,
            prior_annotations,
        } => {
            format::save(&format::sidecar_path(image_path), prior_annotations)?;
            if project.focus(image_path) {
                *store = BoxStore::from_set(prior_annotations.clone());
            }
            Ok(None)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn commit(name: &str) -> HistoryEntry {
        HistoryEntry::AnnotationCommit {
            image_path: PathBuf::from(name),
            prior_annotations: Vec::new(),
        }
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = HistoryStack::new();
        assert!(!stack.can_undo());
        stack.push(commit("a.jpg"));
        stack.push(commit("b.jpg"));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(commit("b.jpg")));
        assert_eq!(stack.pop(), Some(commit("a.jpg")));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_max_history() {
        let mut stack = HistoryStack::with_config(HistoryConfig { max_history: 3 });
        for i in 0..5 {
            stack.push(commit(&format!("{i}.jpg")));
        }
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.entries()[0], commit("2.jpg"));
    }

    #[test]
    fn test_descriptions() {
        let entry = HistoryEntry::ClassifyMove {
            moved: PairMove {
                original_image: PathBuf::from("/w/a.jpg"),
                moved_image: PathBuf::from("/w/NG/a.jpg"),
                original_sidecar: None,
                moved_sidecar: None,
            },
            previous_cursor_index: 0,
        };
        assert_eq!(entry.description(), "Classify 'a.jpg' as NG");
        assert_eq!(commit("/w/b.png").description(), "Save annotations of 'b.png'");
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut stack = HistoryStack::new();
        let mut project = ProjectState::from_images(PathBuf::from("/w"), Vec::new());
        let mut store = BoxStore::new();
        assert!(undo_last(&mut stack, &mut project, &mut store).unwrap().is_none());
    }

    #[test]
    fn test_undo_commit_restores_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        std::fs::write(&image, "img").unwrap();
        std::fs::write(dir.path().join("a.txt"), "1 0.1 0.1 0.1 0.1\n").unwrap();

        let prior = vec![BoundingBox::new("0", 0.5, 0.5, 0.2, 0.2)];
        let mut stack = HistoryStack::new();
        stack.push(HistoryEntry::AnnotationCommit {
            image_path: image.clone(),
            prior_annotations: prior.clone(),
        });
        let mut project = ProjectState::from_images(dir.path().to_path_buf(), vec![image]);
        let mut store = BoxStore::new();

        let undone = undo_last(&mut stack, &mut project, &mut store).unwrap().unwrap();
        assert!(undone.warning.is_none());
        assert_eq!(store.all(), prior);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "0 0.500000 0.500000 0.200000 0.200000\n"
        );
        assert!(stack.is_empty());
    }

    fn classify(dir: &std::path::Path, name: &str) -> HistoryEntry {
        HistoryEntry::ClassifyMove {
            moved: PairMove {
                original_image: dir.join(name),
                moved_image: dir.join("OK").join(name),
                original_sidecar: None,
                moved_sidecar: None,
            },
            previous_cursor_index: 0,
        }
    }

    #[test]
    fn test_failed_undo_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("OK")).unwrap();
        std::fs::write(dir.path().join("OK/a.jpg"), "moved").unwrap();
        // The original location was taken in the meantime
        std::fs::write(dir.path().join("a.jpg"), "newer").unwrap();

        let mut stack = HistoryStack::new();
        stack.push(classify(dir.path(), "a.jpg"));
        let mut project = ProjectState::from_images(dir.path().to_path_buf(), Vec::new());
        let mut store = BoxStore::new();

        let err = undo_last(&mut stack, &mut project, &mut store).unwrap_err();
        assert!(matches!(err, SessionError::ImageMoveFailed { .. }));
        assert_eq!(stack.len(), 1);
        assert!(project.is_empty());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.jpg")).unwrap(), "newer");
    }

    #[test]
    fn test_missing_moved_image_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("OK")).unwrap();
        std::fs::write(dir.path().join("OK/a.jpg"), "img").unwrap();

        let mut stack = HistoryStack::new();
        stack.push(classify(dir.path(), "a.jpg"));
        stack.push(classify(dir.path(), "b.jpg"));
        let mut project = ProjectState::from_images(dir.path().to_path_buf(), Vec::new());
        let mut store = BoxStore::new();

        // b.jpg was deleted from its bucket outside the tool
        let err = undo_last(&mut stack, &mut project, &mut store).unwrap_err();
        assert!(matches!(err, SessionError::ImageMoveFailed { .. }));
        assert_eq!(stack.len(), 1);

        undo_last(&mut stack, &mut project, &mut store).unwrap().unwrap();
        assert!(stack.is_empty());
        assert!(dir.path().join("a.jpg").is_file());
        assert_eq!(project.current().unwrap().file_name(), "a.jpg");
    }
}
