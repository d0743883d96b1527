//! TOML-based configuration persistence.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\SyncScroll\config.toml`
//! - Linux:    `~/.config/syncscroll/config.toml`
//! - macOS:    `~/Library/Application Support/SyncScroll/config.toml`
//!
//! # What is TOML? (for beginners)
//!
//! TOML is a small configuration format that reads like an INI file with
//! real types.  A complete SyncScroll config looks like this:
//!
//! ```toml
//! [general]
//! strict_process_check = true
//! legacy_delivery = false
//! input_delay_ms = 0
//! preserve_selection_on_refresh = true
//! auto_stop_on_lost_window = true
//! log_level = "info"
//!
//! [timing]
//! rect_refresh_interval_ms = 500
//! suppression_window_ms = 200
//! ```
//!
//! Every field has a serde default, so a missing file, an empty file, or a
//! file written by an older version all load cleanly.  Values are checked by
//! [`AppConfig::validate`]; an invalid config stops the program at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::session::SyncOptions;

/// Largest accepted `input_delay_ms`.
pub const MAX_INPUT_DELAY_MS: u64 = 500;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its accepted range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Behaviour switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Only forward when the window actually visible at the source and target
    /// points belongs to the selected process.
    #[serde(default = "default_true")]
    pub strict_process_check: bool,
    /// Post wheel messages to the target's child windows instead of moving
    /// the cursor with `SendInput`.
    #[serde(default)]
    pub legacy_delivery: bool,
    /// Delay before each emission, `0..=500` ms.
    #[serde(default)]
    pub input_delay_ms: u64,
    /// Keep the selection across window-list refreshes when its handle is
    /// still present.
    #[serde(default = "default_true")]
    pub preserve_selection_on_refresh: bool,
    /// Stop syncing and refresh the window list when a selected window can no
    /// longer be queried.
    #[serde(default = "default_true")]
    pub auto_stop_on_lost_window: bool,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Timer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// How often the source/target rects are re-read.
    #[serde(default = "default_rect_refresh_interval_ms")]
    pub rect_refresh_interval_ms: u64,
    /// How long real input at the target is swallowed after each emission.
    #[serde(default = "default_suppression_window_ms")]
    pub suppression_window_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_rect_refresh_interval_ms() -> u64 {
    500
}
fn default_suppression_window_ms() -> u64 {
    200
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            strict_process_check: default_true(),
            legacy_delivery: false,
            input_delay_ms: 0,
            preserve_selection_on_refresh: default_true(),
            auto_stop_on_lost_window: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            rect_refresh_interval_ms: default_rect_refresh_interval_ms(),
            suppression_window_ms: default_suppression_window_ms(),
        }
    }
}

impl AppConfig {
    /// Checks every value against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.input_delay_ms > MAX_INPUT_DELAY_MS {
            return Err(ConfigError::Invalid {
                field: "general.input_delay_ms",
                reason: format!(
                    "{} is outside 0..={MAX_INPUT_DELAY_MS}",
                    self.general.input_delay_ms
                ),
            });
        }
        if self.timing.rect_refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.rect_refresh_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.timing.suppression_window_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.suppression_window_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl From<&AppConfig> for SyncOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            strict_process_check: config.general.strict_process_check,
            legacy_delivery: config.general.legacy_delivery,
            input_delay: Duration::from_millis(config.general.input_delay_ms),
            preserve_selection_on_refresh: config.general.preserve_selection_on_refresh,
            auto_stop_on_lost_window: config.general.auto_stop_on_lost_window,
            rect_refresh_interval: Duration::from_millis(config.timing.rect_refresh_interval_ms),
            suppression_window: Duration::from_millis(config.timing.suppression_window_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads and validates the config from the platform location.
///
/// A missing file yields [`AppConfig::default()`], which is also written back
/// so the user has a file to edit.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system errors, [`ConfigError::Parse`] for
/// malformed TOML, [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;
    let (config, existed) = load_config_from(&path)?;
    if !existed {
        if let Err(e) = save_config_to(&path, &config) {
            tracing::warn!("could not write default config: {e}");
        }
    }
    Ok(config)
}

/// Loads and validates the config at `path`.
///
/// Returns the config and whether the file existed.
pub fn load_config_from(path: &Path) -> Result<(AppConfig, bool), ConfigError> {
    let (config, existed) = match std::fs::read_to_string(path) {
        Ok(content) => (toml::from_str::<AppConfig>(&content)?, true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (AppConfig::default(), false),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    config.validate()?;
    Ok((config, existed))
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `SyncScroll`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SyncScroll"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("syncscroll"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SyncScroll")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn temp_config_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("syncscroll_test_{tag}_{}", std::process::id()))
            .join("config.toml")
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.general.strict_process_check);
        assert!(!cfg.general.legacy_delivery);
        assert_eq!(cfg.general.input_delay_ms, 0);
        assert!(cfg.general.preserve_selection_on_refresh);
        assert!(cfg.general.auto_stop_on_lost_window);
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.timing.rect_refresh_interval_ms, 500);
        assert_eq!(cfg.timing.suppression_window_ms, 200);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_ok!(AppConfig::default().validate());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_general_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[general]
legacy_delivery = true
input_delay_ms = 40
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert!(cfg.general.legacy_delivery);
        assert_eq!(cfg.general.input_delay_ms, 40);
        // Unspecified fields keep their defaults
        assert!(cfg.general.strict_process_check);
        assert_eq!(cfg.timing.rect_refresh_interval_ms, 500);
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_input_delay_at_upper_bound() {
        let mut cfg = AppConfig::default();
        cfg.general.input_delay_ms = 500;
        assert_ok!(cfg.validate());
    }

    #[test]
    fn test_validate_rejects_input_delay_above_bound() {
        let mut cfg = AppConfig::default();
        cfg.general.input_delay_ms = 501;

        let err = assert_err!(cfg.validate());

        assert!(matches!(
            err,
            ConfigError::Invalid { field: "general.input_delay_ms", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_zero_refresh_interval() {
        let mut cfg = AppConfig::default();
        cfg.timing.rect_refresh_interval_ms = 0;

        let err = assert_err!(cfg.validate());

        assert!(err.to_string().contains("rect_refresh_interval_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_suppression_window() {
        let mut cfg = AppConfig::default();
        cfg.timing.suppression_window_ms = 0;
        assert_err!(cfg.validate());
    }

    // ── SyncOptions conversion ────────────────────────────────────────────────

    #[test]
    fn test_sync_options_from_config_converts_durations() {
        let mut cfg = AppConfig::default();
        cfg.general.input_delay_ms = 25;
        cfg.timing.suppression_window_ms = 300;

        let options = SyncOptions::from(&cfg);

        assert_eq!(options.input_delay, Duration::from_millis(25));
        assert_eq!(options.suppression_window, Duration::from_millis(300));
        assert_eq!(options.rect_refresh_interval, Duration::from_millis(500));
        assert!(options.strict_process_check);
    }

    // ── File round trip ───────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let (cfg, existed) = load_config_from(&path).expect("missing file is not an error");

        assert!(!existed);
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_config_round_trip() {
        // Arrange
        let path = temp_config_path("roundtrip");
        let mut cfg = AppConfig::default();
        cfg.general.log_level = "debug".to_string();
        cfg.timing.rect_refresh_interval_ms = 250;

        // Act
        save_config_to(&path, &cfg).expect("save");
        let (loaded, existed) = load_config_from(&path).expect("load");

        // Assert
        assert!(existed);
        assert_eq!(loaded, cfg);

        // Cleanup
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_load_config_from_invalid_values_fails() {
        let path = temp_config_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[general]\ninput_delay_ms = 9000\n").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_config_from_malformed_toml_fails() {
        let path = temp_config_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}
