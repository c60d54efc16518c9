//! Board Configuration - detection timings, device and output selection
//!
//! Every section implements `Default` with the values the detector was tuned
//! with, so an absent or empty file behaves exactly like the built-in setup.
//! The file is only ever read; settings are never written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "BOARD_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "board_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with [`BoardConfig::load`], which searches:
/// 1. an explicit path (`--config`)
/// 2. `$BOARD_CONFIG`
/// 3. `./board_config.toml`
/// 4. built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Posture detector timings and thresholds
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Joystick device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Synthetic input backend
    #[serde(default)]
    pub output: OutputConfig,
}

impl BoardConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path that cannot be loaded is an error; the implicit
    /// locations fall back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded board config");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded board config from {}", CONFIG_ENV_VAR);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded board config from ./{}", LOCAL_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject impossible values; log suspicious ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Detection
// ============================================================================

/// Timings (seconds) and the near-minimum threshold used by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Walking persists without a new alternation for this long
    pub walking_hold_time: f64,
    /// One-foot stance must be held this long to confirm Flamingo
    pub flamingo_hold_time: f64,
    /// Jump is reported for this long, then the previous posture returns
    pub jump_display_time: f64,
    /// A near-minimum episode this long means nobody is on the board
    pub user_absent_time: f64,
    /// Fraction of the sensor window that counts as "near minimum"
    pub jump_absence_threshold_percent: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            walking_hold_time: defaults::WALKING_HOLD_SECS,
            flamingo_hold_time: defaults::FLAMINGO_HOLD_SECS,
            jump_display_time: defaults::JUMP_DISPLAY_SECS,
            user_absent_time: defaults::USER_ABSENT_SECS,
            jump_absence_threshold_percent: defaults::JUMP_ABSENCE_THRESHOLD_PERCENT,
        }
    }
}

// ============================================================================
// Device
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Joystick node; discovered under /dev/input when unset
    pub path: Option<PathBuf>,
    /// Must match the board (4)
    pub axis_count: usize,
    /// Sleep between polls when no event is pending
    pub poll_interval_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: None,
            axis_count: defaults::AXIS_COUNT,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Which synthetic input device drives the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Synthetic key presses (W forward, jump key)
    #[default]
    #[value(name = "keyboard")]
    Keyboard,
    /// Virtual gamepad (left stick forward, jump button)
    #[value(name = "virtual_joystick")]
    VirtualJoystick,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Keyboard => write!(f, "keyboard"),
            OutputKind::VirtualJoystick => write!(f, "virtual_joystick"),
        }
    }
}

/// Face button bound to Jump.
///
/// | Binding | Keyboard key | Gamepad button |
/// |---------|--------------|----------------|
/// | A       | space        | A              |
/// | B       | b            | B              |
/// | X       | x            | X              |
/// | Y       | y            | Y              |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum JumpButton {
    #[default]
    A,
    B,
    X,
    Y,
}

impl std::fmt::Display for JumpButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JumpButton::A => write!(f, "A"),
            JumpButton::B => write!(f, "B"),
            JumpButton::X => write!(f, "X"),
            JumpButton::Y => write!(f, "Y"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub kind: OutputKind,
    pub jump_button: JumpButton,
    /// Gamepad jump press duration
    pub jump_hold_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            kind: OutputKind::Keyboard,
            jump_button: JumpButton::A,
            jump_hold_ms: defaults::JUMP_HOLD_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config = BoardConfig::from_toml_str("").expect("empty TOML should parse");
        assert_eq!(config.detection.walking_hold_time, 0.5);
        assert_eq!(config.detection.flamingo_hold_time, 0.5);
        assert_eq!(config.detection.jump_display_time, 1.0);
        assert_eq!(config.detection.user_absent_time, 1.0);
        assert_eq!(config.detection.jump_absence_threshold_percent, 0.05);
        assert_eq!(config.device.axis_count, 4);
        assert_eq!(config.output.kind, OutputKind::Keyboard);
        assert_eq!(config.output.jump_button, JumpButton::A);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[detection]
walking_hold_time = 0.8

[output]
kind = "virtual_joystick"
jump_button = "Y"
"#;
        let config = BoardConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.detection.walking_hold_time, 0.8);
        assert_eq!(config.detection.flamingo_hold_time, 0.5);
        assert_eq!(config.output.kind, OutputKind::VirtualJoystick);
        assert_eq!(config.output.jump_button, JumpButton::Y);
        assert_eq!(config.output.jump_hold_ms, 100);
    }

    #[test]
    fn test_validation_rejects_zero_duration() {
        let result = BoardConfig::from_toml_str("[detection]\nflamingo_hold_time = 0.0\n");
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("flamingo_hold_time")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[detection\nwalking_hold_time = ").unwrap();
        let err = BoardConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref p, _) if p == &path));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = BoardConfig::load(Some(Path::new("/nonexistent/board_config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
