//! Pending image sequence and cursor for an opened working folder.

use std::path::{Path, PathBuf};

use crate::constants::IMAGE_EXTENSIONS;
use crate::format::sidecar_path;

/// Check if a path has a supported image extension (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// One image of the working set, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    path: PathBuf,
}

impl ImageItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename of the image, or an empty string for odd paths.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_default()
    }

    /// Where this image's sidecar lives (whether or not it exists).
    pub fn sidecar_path(&self) -> PathBuf {
        sidecar_path(&self.path)
    }

    /// Check for a sidecar on disk. Derived on every call, never cached.
    pub fn has_sidecar(&self) -> bool {
        self.sidecar_path().is_file()
    }
}

/// Ordered pending images of a folder and the cursor into them.
///
/// Classified and skipped images are removed from the sequence, so the cursor
/// only leaves the front when an undo puts an image back behind others.
#[derive(Clone, Debug)]
pub struct ProjectState {
    /// Folder the images were enumerated from
    pub folder: PathBuf,
    /// Pending images, sorted by path when enumerated
    images: Vec<ImageItem>,
    /// Current image index; equal to `images.len()` once exhausted
    current_index: usize,
}

impl ProjectState {
    /// Enumerate image files directly inside a folder (non-recursive), sorted by path.
    pub fn from_folder(folder: impl Into<PathBuf>) -> std::io::Result<Self> {
        let folder = folder.into();
        let mut images: Vec<PathBuf> = std::fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();

        images.sort();

        log::info!("Scanned folder {:?}: found {} images", folder, images.len());

        Ok(Self::from_images(folder, images))
    }

    /// Build a project from an explicit, already ordered list of images.
    pub fn from_images(folder: PathBuf, images: Vec<PathBuf>) -> Self {
        Self {
            folder,
            images: images.into_iter().map(ImageItem::new).collect(),
            current_index: 0,
        }
    }

    /// Get the current image.
    pub fn current(&self) -> Option<&ImageItem> {
        self.images.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn images(&self) -> &[ImageItem] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Check if the cursor has run past the last image.
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.images.len()
    }

    /// Take the current image out of the sequence. The cursor then points at
    /// the image that followed it.
    pub fn remove_current(&mut self) -> Option<ImageItem> {
        if self.is_exhausted() {
            return None;
        }
        Some(self.images.remove(self.current_index))
    }

    /// Put an image back at `index` (clamped to the sequence length) and move
    /// the cursor onto it. Returns the index actually used.
    pub fn restore(&mut self, index: usize, item: ImageItem) -> usize {
        let index = index.min(self.images.len());
        self.images.insert(index, item);
        self.current_index = index;
        index
    }

    /// Move the cursor onto the image at `path`, if it is pending.
    pub fn focus(&mut self, path: &Path) -> bool {
        match self.images.iter().position(|item| item.path() == path) {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }

    /// Current image name for display, relative to the project folder.
    pub fn current_name(&self) -> String {
        let Some(item) = self.current() else {
            return "-".to_string();
        };

        item.path()
            .strip_prefix(&self.folder)
            .ok()
            .and_then(|relative| relative.to_str())
            .map(String::from)
            .unwrap_or_else(|| item.file_name())
    }

    /// Get progress string like "3 / 15".
    pub fn progress(&self) -> String {
        format!(
            "{} / {}",
            (self.current_index + 1).min(self.images.len()),
            self.images.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(names: &[&str]) -> ProjectState {
        ProjectState::from_images(
            PathBuf::from("/w"),
            names.iter().map(|n| PathBuf::from("/w").join(n)).collect(),
        )
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.JPG")));
        assert!(is_image_file(Path::new("dir/b.jpeg")));
        assert!(is_image_file(Path::new("c.gif")));
        assert!(!is_image_file(Path::new("c.txt")));
        assert!(!is_image_file(Path::new("c.tiff")));
        assert!(!is_image_file(Path::new("noext")));
    }

    #[test]
    fn test_from_folder_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.png", "a.jpg", "b.BMP", "a.txt", "notes.md"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let state = ProjectState::from_folder(dir.path()).unwrap();
        let names: Vec<String> = state.images().iter().map(ImageItem::file_name).collect();
        assert_eq!(names, vec!["a.jpg", "b.BMP", "c.png"]);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_remove_and_restore() {
        let mut state = project(&["a.jpg", "b.jpg", "c.jpg"]);
        assert!(state.focus(Path::new("/w/b.jpg")));
        let removed = state.remove_current().unwrap();
        assert_eq!(removed.file_name(), "b.jpg");
        assert_eq!(state.current().unwrap().file_name(), "c.jpg");

        assert_eq!(state.restore(1, removed), 1);
        assert_eq!(state.len(), 3);
        assert_eq!(state.current().unwrap().file_name(), "b.jpg");
    }

    #[test]
    fn test_restore_clamps_past_end() {
        let mut state = project(&["a.jpg"]);
        assert_eq!(state.restore(5, ImageItem::new("/w/z.jpg")), 1);
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.current().unwrap().file_name(), "z.jpg");
    }

    #[test]
    fn test_exhaustion_and_progress() {
        let mut state = project(&["a.jpg", "b.jpg"]);
        assert_eq!(state.progress(), "1 / 2");
        assert_eq!(state.remove_current().unwrap().file_name(), "a.jpg");
        assert_eq!(state.progress(), "1 / 1");
        state.remove_current();
        assert!(state.is_exhausted());
        assert!(state.current().is_none());
        assert!(state.remove_current().is_none());
        assert_eq!(state.progress(), "0 / 0");
        assert_eq!(state.current_name(), "-");
    }

    #[test]
    fn test_item_sidecar_is_derived() {
        let dir = tempfile::tempdir().unwrap();
        let item = ImageItem::new(dir.path().join("a.jpg"));
        assert!(!item.has_sidecar());
        std::fs::write(dir.path().join("a.txt"), "0 0.5 0.5 0.1 0.1\n").unwrap();
        assert!(item.has_sidecar());
    }
}
