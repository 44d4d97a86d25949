//! Client configuration
//!
//! Loaded from `config.toml` in the platform config directory, or from an
//! explicit path. Every field has a default, so partial files are fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::canvas::{
    Brush, BrushCurve, Dimensions, Rgba, MAX_SIZE, MAX_STABILIZATION, MIN_SIZE,
};
use crate::errors::{PinselError, Result};
use crate::net::{RetryPolicy, MAX_CANVAS_AREA, MAX_COMMAND_LEN};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas width used when the server does not answer the size query
    pub default_width: u32,

    /// Canvas height used when the server does not answer the size query
    pub default_height: u32,

    /// Output buffer size in bytes
    pub buffer_capacity: usize,

    /// Idle frames between keep-alive newlines
    pub keepalive_idle_frames: u32,

    /// Frame duration of the UI loop
    pub tick_rate_ms: u64,

    /// Retries on a full socket before a write reports no progress
    pub would_block_retries: u32,

    /// Pause between those retries
    pub would_block_backoff_us: u64,

    /// How long to wait for the `SIZE` answer
    pub size_query_timeout_ms: u64,

    /// Ask the server for its size at startup
    pub query_size: bool,

    /// Soft edge of every brush
    pub brush_curve: BrushCurve,

    /// Brush presets, cycled with Tab; the first one is active at startup
    pub brushes: Vec<Brush>,
}

impl Default for Config {
    fn default() -> Self {
        Self::sensible_defaults()
    }
}

impl Config {
    /// Config with the values the client was tuned with
    pub fn sensible_defaults() -> Self {
        Self {
            default_width: 1280,
            default_height: 720,
            buffer_capacity: 1024,
            keepalive_idle_frames: 60,
            tick_rate_ms: 16,
            would_block_retries: 64,
            would_block_backoff_us: 50,
            size_query_timeout_ms: 2000,
            query_size: true,
            brush_curve: BrushCurve::default(),
            brushes: vec![
                Brush::default(),
                Brush::new("marker", Rgba::from_hex(0xff_c8_00).with_alpha(96), 16, 8),
            ],
        }
    }

    /// Configuration directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "pinselflut", "pinselflut")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Data directory (log file)
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "pinselflut", "pinselflut")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Path of the default config file
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn fallback_dimensions(&self) -> Dimensions {
        Dimensions::new(self.default_width, self.default_height)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            would_block_retries: self.would_block_retries,
            backoff: Duration::from_micros(self.would_block_backoff_us),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn size_query_timeout(&self) -> Duration {
        Duration::from_millis(self.size_query_timeout_ms)
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.default_width == 0 || self.default_height == 0 {
            return Err(PinselError::Config(
                "default canvas dimensions must be positive".to_string(),
            ));
        }
        if u64::from(self.default_width) * u64::from(self.default_height) > MAX_CANVAS_AREA {
            return Err(PinselError::Config(format!(
                "default canvas is larger than {MAX_CANVAS_AREA} pixels"
            )));
        }
        if self.buffer_capacity < MAX_COMMAND_LEN {
            return Err(PinselError::Config(format!(
                "buffer_capacity must be at least {MAX_COMMAND_LEN} bytes"
            )));
        }
        if self.brushes.is_empty() {
            return Err(PinselError::Config("at least one brush is required".to_string()));
        }
        for brush in &self.brushes {
            if !(MIN_SIZE..=MAX_SIZE).contains(&brush.size) {
                return Err(PinselError::Config(format!(
                    "brush '{}' size must be within {MIN_SIZE}..={MAX_SIZE}",
                    brush.name
                )));
            }
            if !(1..=MAX_STABILIZATION).contains(&brush.stabilization) {
                return Err(PinselError::Config(format!(
                    "brush '{}' stabilization must be within 1..={MAX_STABILIZATION}",
                    brush.name
                )));
            }
        }
        if self.size_query_timeout_ms == 0 {
            return Err(PinselError::Config(
                "size_query_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from `path`, or from the default location
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match Config::config_path() {
            Some(p) => p,
            None => return Ok(Config::sensible_defaults()),
        },
    };

    if !path.exists() {
        return Ok(Config::sensible_defaults());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| PinselError::Config(format!("Failed to read {}: {e}", path.display())))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| PinselError::Config(format!("Invalid TOML in {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Write configuration to `path`, creating parent directories
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| PinselError::Config(format!("Failed to create config dir: {e}")))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| PinselError::Config(format!("Failed to serialize config: {e}")))?;
    fs::write(path, content)
        .map_err(|e| PinselError::Config(format!("Failed to write config: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sensible_defaults() {
        let config = Config::sensible_defaults();
        assert_eq!(config.fallback_dimensions(), Dimensions::new(1280, 720));
        assert_eq!(config.buffer_capacity, 1024);
        assert_eq!(config.keepalive_idle_frames, 60);
        assert_eq!(config.brush_curve, BrushCurve::default());
        assert_eq!(config.brushes[0], Brush::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::sensible_defaults());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "default_width = 640\nkeepalive_idle_frames = 5\n\n[brush_curve]\nsteepness = 3.0\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.default_width, 640);
        assert_eq!(config.default_height, 720);
        assert_eq!(config.keepalive_idle_frames, 5);
        assert!((config.brush_curve.steepness - 3.0).abs() < f32::EPSILON);
        assert!((config.brush_curve.min_visible - 0.03).abs() < f32::EPSILON);
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::sensible_defaults();
        config.brushes.push(Brush::new("ink", Rgba::BLUE, 3, 1));
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_invalid_files_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        for content in [
            "default_width = \"wide\"",
            "buffer_capacity = 8",
            "default_height = 0",
            "default_width = 100000\ndefault_height = 100000",
            "brushes = []",
            "[[brushes]]\nname = \"huge\"\ncolor = { r = 255, g = 255, b = 255, a = 255 }\nsize = 4294967295\nstabilization = 4",
            "[[brushes]]\nname = \"sluggish\"\ncolor = { r = 255, g = 255, b = 255, a = 255 }\nsize = 8\nstabilization = 100000",
            "[[brushes]]\nname = \"zero\"\ncolor = { r = 255, g = 255, b = 255, a = 255 }\nsize = 0\nstabilization = 4",
        ] {
            fs::write(&path, content).unwrap();
            let err = load_config(Some(&path)).unwrap_err();
            assert!(matches!(err, PinselError::Config(_)), "{content}: {err}");
            assert_eq!(err.exit_code(), 7);
        }
    }
}
