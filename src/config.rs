//! Configuration file support for sortbox.
//!
//! Settings live in one JSON file that is read once at startup. A missing or
//! broken file falls back to defaults; a file written by a newer version is
//! rejected rather than half-understood.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUCKETS, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_DISPLAY_SIZE};
use crate::keybindings::KeyBindings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Outcome bucket names; the first one is selected when a folder opens
    #[serde(default = "default_buckets")]
    pub buckets: Vec<String>,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_app_name() -> String {
    "sortbox".to_string()
}

fn default_buckets() -> Vec<String> {
    DEFAULT_BUCKETS.iter().map(|b| b.to_string()).collect()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Longest edge of the surface images are fitted into, in pixels
    #[serde(default = "default_max_display_size")]
    pub max_display_size: u32,

    /// Number of undo entries kept
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Draw boxes over the image outside the editor
    #[serde(default = "default_show_overlay")]
    pub show_overlay: bool,

    /// Font file for box labels; the built-in font is used when unset
    #[serde(default)]
    pub label_font: Option<PathBuf>,
}

fn default_max_display_size() -> u32 {
    DEFAULT_MAX_DISPLAY_SIZE
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_show_overlay() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            max_display_size: default_max_display_size(),
            history_limit: default_history_limit(),
            show_overlay: default_show_overlay(),
            label_font: None,
        }
    }
}

/// Font used to draw box labels, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelFont {
    /// The renderer's own font
    #[default]
    Builtin,
    /// A font file on disk
    File(PathBuf),
}

impl LabelFont {
    /// Resolve a configured font path. A path that does not point at a file
    /// falls back to the built-in font with a warning.
    pub fn resolve(configured: Option<&Path>) -> Self {
        match configured {
            None => LabelFont::Builtin,
            Some(path) if path.is_file() => {
                log::debug!("Using label font {:?}", path);
                LabelFont::File(path.to_path_buf())
            }
            Some(path) => {
                log::warn!("Label font {:?} not found, using the built-in font", path);
                LabelFont::Builtin
            }
        }
    }

    /// Get the display name for this font.
    pub fn name(&self) -> String {
        match self {
            LabelFont::Builtin => "built-in".to_string(),
            LabelFont::File(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("font file")
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            buckets: default_buckets(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the bucket names and keybindings.
    ///
    /// Bucket names become folder names, so they must be plain, distinct
    /// path components.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buckets.len() != 2 {
            return Err(ConfigError::Invalid(format!(
                "expected exactly 2 buckets, found {}",
                self.buckets.len()
            )));
        }
        for bucket in &self.buckets {
            let plain = !bucket.trim().is_empty()
                && bucket != "."
                && bucket != ".."
                && !bucket.contains(['/', '\\']);
            if !plain {
                return Err(ConfigError::Invalid(format!("bad bucket name '{bucket}'")));
            }
        }
        if self.buckets[0] == self.buckets[1] {
            return Err(ConfigError::Invalid(format!(
                "bucket names must differ ('{}')",
                self.buckets[0]
            )));
        }
        if let Some((key, first, second)) = self.keybindings.conflicts().into_iter().next() {
            return Err(ConfigError::Invalid(format!(
                "key '{}' is bound to both '{}' and '{}'",
                key,
                first.name(),
                second.name()
            )));
        }
        Ok(())
    }

    /// The two bucket names, in order.
    pub fn bucket_pair(&self) -> [String; 2] {
        match self.buckets.as_slice() {
            [first, second] => [first.clone(), second.clone()],
            _ => [DEFAULT_BUCKETS[0].to_string(), DEFAULT_BUCKETS[1].to_string()],
        }
    }

    /// Resolve the configured label font.
    pub fn label_font(&self) -> LabelFont {
        LabelFont::resolve(self.preferences.label_font.as_deref())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "sortbox-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("sortbox").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("sortbox")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from `path` if the file exists.
    ///
    /// Runs before the logger is set up, so callers report the outcome.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    /// Log level to start with: `--verbose` forces debug, otherwise the
    /// configured level.
    pub fn startup_level(&self, verbose: bool) -> log::LevelFilter {
        if verbose {
            log::LevelFilter::Debug
        } else {
            self.preferences.log_level.to_level_filter()
        }
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::Key;

    #[test]
    fn test_default_round_trip() {
        let config = AppConfig::default();
        let json = config.to_json().unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.bucket_pair(), ["OK".to_string(), "NG".to_string()]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let parsed = AppConfig::from_json(r#"{"version":1}"#).unwrap();
        assert_eq!(parsed.preferences.max_display_size, DEFAULT_MAX_DISPLAY_SIZE);
        assert_eq!(parsed.preferences.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(parsed.preferences.show_overlay);
        assert_eq!(parsed.keybindings.accept, Key::Space);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{"version":{}}}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            AppConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_bucket_validation() {
        for buckets in [
            r#"["OK"]"#,
            r#"["OK","OK"]"#,
            r#"["OK","a/b"]"#,
            r#"["OK",".."]"#,
            r#"["OK"," "]"#,
        ] {
            let json = format!(r#"{{"version":1,"buckets":{buckets}}}"#);
            assert!(
                matches!(AppConfig::from_json(&json), Err(ConfigError::Invalid(_))),
                "{buckets}"
            );
        }
        let json = r#"{"version":1,"buckets":["good","bad"]}"#;
        assert_eq!(AppConfig::from_json(json).unwrap().buckets, vec!["good", "bad"]);
    }

    #[test]
    fn test_conflicting_keys_rejected() {
        let json = r#"{"version":1,"keybindings":{"skip":"space"}}"#;
        assert!(matches!(AppConfig::from_json(json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_if_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(AppConfig::load_if_present(&path).unwrap(), None);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppConfig::load_if_present(&path),
            Err(ConfigError::ParseError(_))
        ));

        let mut config = AppConfig::default();
        config.preferences.max_display_size = 640;
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_if_present(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_startup_level() {
        let mut config = AppConfig::default();
        config.preferences.log_level = LogLevel::Warn;
        assert_eq!(config.startup_level(false), log::LevelFilter::Warn);
        assert_eq!(config.startup_level(true), log::LevelFilter::Debug);
    }

    #[test]
    fn test_label_font_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("label.ttf");
        assert_eq!(LabelFont::resolve(None), LabelFont::Builtin);
        assert_eq!(LabelFont::resolve(Some(&font)), LabelFont::Builtin);
        std::fs::write(&font, b"font").unwrap();
        assert_eq!(LabelFont::resolve(Some(&font)), LabelFont::File(font.clone()));
        assert_eq!(LabelFont::File(font).name(), "label.ttf");
    }
}
