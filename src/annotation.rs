//! In-memory box store for the image currently open in the editor.
//!
//! The store is the single source of truth for what the editor draws and what
//! gets persisted on save. Boxes keep insertion order: the last box is drawn on
//! top and wins hit tests.

use crate::model::{AnnotationSet, BoundingBox, DisplaySize, to_display};

/// Ordered boxes of one image plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct BoxStore {
    /// Boxes in insertion order.
    boxes: Vec<BoundingBox>,
    /// Index of the selected box.
    selected: Option<usize>,
    /// Set when boxes change; cleared by [`BoxStore::clear_dirty`].
    dirty: bool,
}

impl BoxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a loaded annotation set, nothing selected.
    pub fn from_set(set: AnnotationSet) -> Self {
        Self {
            boxes: set,
            selected: None,
            dirty: false,
        }
    }

    /// Replace every box, dropping the selection.
    pub fn replace(&mut self, set: AnnotationSet) {
        self.boxes = set;
        self.selected = None;
        self.dirty = true;
    }

    /// Check if the boxes changed since the last `clear_dirty()`.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Append a box and select it. Returns its index.
    ///
    /// Overlapping boxes are kept as they are; nothing is merged.
    pub fn add(&mut self, bbox: BoundingBox) -> usize {
        debug_assert!(bbox.is_valid(), "box outside normalized space: {bbox:?}");
        self.boxes.push(bbox);
        let index = self.boxes.len() - 1;
        self.selected = Some(index);
        self.dirty = true;
        log::debug!("Added box {} (label '{}')", index, self.boxes[index].label);
        index
    }

    /// Select the topmost box under a display-space point.
    ///
    /// Boxes are tested from last inserted to first. A miss clears the selection.
    pub fn select_at(&mut self, x: f32, y: f32, display: DisplaySize) -> Option<usize> {
        self.selected = self.hit_test(x, y, display);
        self.selected
    }

    /// Find the topmost box under a display-space point without changing the selection.
    pub fn hit_test(&self, x: f32, y: f32, display: DisplaySize) -> Option<usize> {
        self.boxes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, bbox)| to_display(bbox, display).contains(x, y))
            .map(|(index, _)| index)
    }

    /// Select a box by index. Out-of-range indices clear the selection.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.boxes.len());
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_box(&self) -> Option<&BoundingBox> {
        self.selected.and_then(|i| self.boxes.get(i))
    }

    /// Change the label of a box. Returns false if the index is out of range.
    pub fn update_label(&mut self, index: usize, label: impl Into<String>) -> bool {
        let Some(bbox) = self.boxes.get_mut(index) else {
            return false;
        };
        bbox.label = label.into();
        self.dirty = true;
        log::debug!("Relabeled box {} to '{}'", index, bbox.label);
        true
    }

    /// Remove a box. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<BoundingBox> {
        if index >= self.boxes.len() {
            return None;
        }
        let removed = self.boxes.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.dirty = true;
        log::debug!("Removed box {} (label '{}')", index, removed.label);
        Some(removed)
    }

    /// Remove the selected box. No-op when nothing is selected.
    pub fn remove_selected(&mut self) -> Option<BoundingBox> {
        let index = self.selected?;
        self.remove(index)
    }

    /// Snapshot of all boxes for persistence.
    pub fn all(&self) -> AnnotationSet {
        self.boxes.clone()
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
