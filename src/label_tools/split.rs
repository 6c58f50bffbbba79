//! Train/validation image lists for a sorted bucket.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::LabelToolError;
use crate::constants::{TRAIN_LIST_FILENAME, VALID_LIST_FILENAME};
use crate::state::is_image_file;

/// Images of a folder divided into a training and a validation list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetSplit {
    pub train: Vec<PathBuf>,
    pub valid: Vec<PathBuf>,
}

/// Shuffle the images directly inside `dir` with `seed` and put the first
/// `train_ratio` of them (rounded down) into the training list.
///
/// Paths are absolute. AppleDouble files (`._name`) are not images and are
/// left out.
pub fn split_images(dir: &Path, train_ratio: f32, seed: u64) -> Result<DatasetSplit, LabelToolError> {
    if !(0.0..=1.0).contains(&train_ratio) {
        return Err(LabelToolError::InvalidRatio(train_ratio));
    }

    let unreadable = |source| LabelToolError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };
    let dir = dir.canonicalize().map_err(unreadable)?;
    let mut images: Vec<PathBuf> = std::fs::read_dir(&dir)
        .map_err(unreadable)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && is_image_file(path)
                && !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("._"))
        })
        .collect();

    // Sorting first makes the shuffle depend on the seed only
    images.sort();
    let mut rng = StdRng::seed_from_u64(seed);
    images.shuffle(&mut rng);

    let train_len = (images.len() as f32 * train_ratio).floor() as usize;
    let valid = images.split_off(train_len.min(images.len()));
    log::info!(
        "Split {:?}: {} train, {} valid",
        dir,
        images.len(),
        valid.len()
    );
    Ok(DatasetSplit {
        train: images,
        valid,
    })
}

fn write_list(path: &Path, images: &[PathBuf]) -> Result<(), LabelToolError> {
    let text: String = images
        .iter()
        .map(|image| format!("{}\n", image.display()))
        .collect();
    std::fs::write(path, text).map_err(|source| LabelToolError::Unwritable {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `Train.txt` and `Valid.txt` into `out_dir`, one image path per line.
///
/// Returns the two list paths.
pub fn write_split(split: &DatasetSplit, out_dir: &Path) -> Result<(PathBuf, PathBuf), LabelToolError> {
    std::fs::create_dir_all(out_dir).map_err(|source| LabelToolError::Unwritable {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let train_path = out_dir.join(TRAIN_LIST_FILENAME);
    let valid_path = out_dir.join(VALID_LIST_FILENAME);
    write_list(&train_path, &split.train)?;
    write_list(&valid_path, &split.valid)?;
    log::debug!("Wrote {:?} and {:?}", train_path, valid_path);
    Ok((train_path, valid_path))
}
