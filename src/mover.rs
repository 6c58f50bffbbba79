//! Moves an image and its sidecar together between the working folder and a bucket.
//!
//! The image move is authoritative: if it fails nothing happens. A sidecar
//! that fails to follow is reported but does not undo the image move, and the
//! returned [`PairMove`] only records what actually moved.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::SessionError;
use crate::format::sidecar_path;
use crate::state::ImageItem;

/// Where an image (and possibly its sidecar) went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMove {
    pub original_image: PathBuf,
    pub moved_image: PathBuf,
    /// Set only when the sidecar was actually moved
    pub original_sidecar: Option<PathBuf>,
    /// Set only when the sidecar was actually moved
    pub moved_sidecar: Option<PathBuf>,
}

impl PairMove {
    /// Check if the sidecar travelled with the image.
    pub fn sidecar_moved(&self) -> bool {
        self.moved_sidecar.is_some()
    }
}

/// Result of a successful image move.
#[derive(Debug)]
pub struct MoveResult {
    /// What moved
    pub moved: PairMove,
    /// Set when a sidecar existed but could not be moved
    pub sidecar_error: Option<SessionError>,
}

/// Directory of a bucket inside the working folder.
pub fn bucket_dir(folder: &Path, bucket: &str) -> PathBuf {
    folder.join(bucket)
}

/// Create every bucket directory under the working folder.
pub fn ensure_buckets<'a>(folder: &Path, buckets: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
    for bucket in buckets {
        std::fs::create_dir_all(bucket_dir(folder, bucket))?;
    }
    Ok(())
}

/// Move an image and, if present, its sidecar into `<folder>/<bucket>/`.
pub fn move_pair(item: &ImageItem, folder: &Path, bucket: &str) -> Result<MoveResult, SessionError> {
    let target_dir = bucket_dir(folder, bucket);
    let original_image = item.path().to_path_buf();
    let moved_image = match original_image.file_name() {
        Some(name) => target_dir.join(name),
        None => {
            return Err(SessionError::ImageMoveFailed {
                from: original_image.clone(),
                to: target_dir,
                source: io::Error::new(io::ErrorKind::InvalidInput, "image path has no file name"),
            });
        }
    };

    move_file(&original_image, &moved_image).map_err(|source| SessionError::ImageMoveFailed {
        from: original_image.clone(),
        to: moved_image.clone(),
        source,
    })?;
    log::info!("Moved {:?} -> {:?}", original_image, moved_image);

    let mut moved = PairMove {
        original_image,
        moved_image,
        original_sidecar: None,
        moved_sidecar: None,
    };

    let source_sidecar = item.sidecar_path();
    let mut sidecar_error = None;
    if source_sidecar.is_file() {
        let target_sidecar = sidecar_path(&moved.moved_image);
        match move_file(&source_sidecar, &target_sidecar) {
            Ok(()) => {
                log::info!("Moved sidecar {:?} -> {:?}", source_sidecar, target_sidecar);
                moved.original_sidecar = Some(source_sidecar);
                moved.moved_sidecar = Some(target_sidecar);
            }
            Err(source) => {
                log::warn!("Sidecar {:?} stayed behind: {}", source_sidecar, source);
                sidecar_error = Some(SessionError::SidecarMoveFailed {
                    from: source_sidecar,
                    to: target_sidecar,
                    source,
                });
            }
        }
    }

    Ok(MoveResult {
        moved,
        sidecar_error,
    })
}

/// Reverse a [`PairMove`]: the image must come back, the sidecar is best effort.
///
/// Returns the sidecar failure, if any, as a non-fatal warning.
pub fn restore_pair(moved: &PairMove) -> Result<Option<SessionError>, SessionError> {
    move_file(&moved.moved_image, &moved.original_image).map_err(|source| {
        SessionError::ImageMoveFailed {
            from: moved.moved_image.clone(),
            to: moved.original_image.clone(),
            source,
        }
    })?;
    log::info!("Restored {:?} -> {:?}", moved.moved_image, moved.original_image);

    let (Some(from), Some(to)) = (&moved.moved_sidecar, &moved.original_sidecar) else {
        return Ok(None);
    };

    match move_file(from, to) {
        Ok(()) => {
            log::info!("Restored sidecar {:?} -> {:?}", from, to);
            Ok(None)
        }
        Err(source) => {
            log::warn!("Sidecar {:?} could not be restored: {}", from, source);
            Ok(Some(SessionError::SidecarMoveFailed {
                from: from.clone(),
                to: to.clone(),
                source,
            }))
        }
    }
}

/// Move one file without overwriting an existing destination.
///
/// Falls back to copy-and-delete when a rename crosses filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination {} already exists", to.display()),
        ));
    }

    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            std::fs::copy(from, to)?;
            if let Err(e) = std::fs::remove_file(from) {
                // Keep a single authoritative copy
                let _ = std::fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        ensure_buckets(dir.path(), ["OK", "NG"]).unwrap();
        dir
    }

    #[test]
    fn test_move_image_without_sidecar() {
        let dir = setup(&[("a.jpg", "img")]);
        let item = ImageItem::new(dir.path().join("a.jpg"));

        let result = move_pair(&item, dir.path(), "OK").unwrap();
        assert!(result.sidecar_error.is_none());
        assert!(!result.moved.sidecar_moved());
        assert!(dir.path().join("OK/a.jpg").is_file());
        assert!(!dir.path().join("a.jpg").exists());
    }

    #[test]
    fn test_move_pair_with_sidecar_and_restore() {
        let dir = setup(&[("a.jpg", "img"), ("a.txt", "0 0.5 0.5 0.2 0.2\n")]);
        let item = ImageItem::new(dir.path().join("a.jpg"));

        let result = move_pair(&item, dir.path(), "NG").unwrap();
        assert!(result.moved.sidecar_moved());
        assert!(dir.path().join("NG/a.jpg").is_file());
        assert!(dir.path().join("NG/a.txt").is_file());

        let warning = restore_pair(&result.moved).unwrap();
        assert!(warning.is_none());
        assert_eq!(std::fs::read_to_string(dir.path().join("a.jpg")).unwrap(), "img");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "0 0.5 0.5 0.2 0.2\n"
        );
        assert!(!dir.path().join("NG/a.txt").exists());
    }

    #[test]
    fn test_image_move_failure_changes_nothing() {
        let dir = setup(&[("a.jpg", "new"), ("a.txt", "0 0.5 0.5 0.2 0.2\n")]);
        std::fs::write(dir.path().join("OK/a.jpg"), "old").unwrap();
        let item = ImageItem::new(dir.path().join("a.jpg"));

        let err = move_pair(&item, dir.path(), "OK").unwrap_err();
        assert!(matches!(err, SessionError::ImageMoveFailed { .. }));
        assert!(dir.path().join("a.jpg").is_file());
        assert!(dir.path().join("a.txt").is_file());
        assert_eq!(std::fs::read_to_string(dir.path().join("OK/a.jpg")).unwrap(), "old");
    }

    #[test]
    fn test_missing_bucket_fails_image_move() {
        let dir = setup(&[("a.jpg", "img")]);
        let item = ImageItem::new(dir.path().join("a.jpg"));
        let err = move_pair(&item, dir.path(), "MISSING").unwrap_err();
        assert!(matches!(err, SessionError::ImageMoveFailed { .. }));
        assert!(dir.path().join("a.jpg").is_file());
    }

    #[test]
    fn test_sidecar_failure_is_recorded_asymmetrically() {
        let dir = setup(&[("a.jpg", "img"), ("a.txt", "0 0.5 0.5 0.2 0.2\n")]);
        // Occupied destination blocks only the sidecar
        std::fs::write(dir.path().join("OK/a.txt"), "other").unwrap();
        let item = ImageItem::new(dir.path().join("a.jpg"));

        let result = move_pair(&item, dir.path(), "OK").unwrap();
        assert!(matches!(
            result.sidecar_error,
            Some(SessionError::SidecarMoveFailed { .. })
        ));
        assert!(!result.moved.sidecar_moved());
        assert!(dir.path().join("OK/a.jpg").is_file());
        assert!(dir.path().join("a.txt").is_file());

        // Undo only reverses the image
        restore_pair(&result.moved).unwrap();
        assert!(dir.path().join("a.jpg").is_file());
        assert_eq!(std::fs::read_to_string(dir.path().join("OK/a.txt")).unwrap(), "other");
    }

    #[test]
    fn test_restore_missing_image_fails() {
        let dir = setup(&[("a.jpg", "img")]);
        let item = ImageItem::new(dir.path().join("a.jpg"));
        let result = move_pair(&item, dir.path(), "OK").unwrap();
        std::fs::remove_file(dir.path().join("OK/a.jpg")).unwrap();

        let err = restore_pair(&result.moved).unwrap_err();
        assert!(matches!(err, SessionError::ImageMoveFailed { .. }));
    }
}
