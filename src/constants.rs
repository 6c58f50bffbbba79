//! Global constants for sortbox

/// Image extensions accepted when a working folder is opened (lowercase, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Extension used for sidecar annotation files.
pub const SIDECAR_EXTENSION: &str = "txt";

/// Class-name listing that lives next to sidecars and is never a sidecar itself.
pub const CLASSES_FILENAME: &str = "classes.txt";

/// Default outcome bucket names. The first one is the initially selected outcome.
pub const DEFAULT_BUCKETS: [&str; 2] = ["OK", "NG"];

/// Fractional digits written for every geometric field of a sidecar line.
pub const COORD_PRECISION: usize = 6;

/// Minimum span, in display pixels, of a drawn box on either axis.
pub const MIN_DRAG_SPAN: f32 = 1.0;

/// Default longest edge of the display surface an image is fitted into.
pub const DEFAULT_MAX_DISPLAY_SIZE: u32 = 1000;

/// Default number of history entries kept before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Extension of labelme annotation files.
pub const LABELME_EXTENSION: &str = "json";

/// Image list of the training split.
pub const TRAIN_LIST_FILENAME: &str = "Train.txt";

/// Image list of the validation split.
pub const VALID_LIST_FILENAME: &str = "Valid.txt";

/// Share of images that go into the training split.
pub const DEFAULT_TRAIN_RATIO: f32 = 0.8;

/// Shuffle seed used for splits unless one is given.
pub const DEFAULT_SPLIT_SEED: u64 = 42;
