//! Configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LESSON_PLAYER_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/lesson-player/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: a warning is logged and compiled
//! defaults are used. A file that exists but fails to parse is an error.

use crate::{Error, FadeCurve, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LESSON_PLAYER_CONFIG";

/// Directory name under the platform config dir
const APP_DIR_NAME: &str = "lesson-player";

/// Root of the TOML config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub player: PlayerSettings,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[api]` section: remote collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the course backend (signed URLs, module progress)
    pub base_url: Option<String>,
    /// Per-request timeout
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_ms: 15_000,
        }
    }
}

/// `[player]` section: playback overlay and telemetry tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Delay before visible controls auto-hide
    pub controls_hide_delay_ms: u64,
    /// Duration of the controls fade in/out
    pub controls_fade_ms: u64,
    /// Easing curve for the controls fade
    pub controls_fade_curve: FadeCurve,
    /// Minimum spacing between position callbacks
    pub time_update_interval_ms: u64,
    /// Width of the scrubber thumb in layout units
    pub thumb_width: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            controls_hide_delay_ms: 2_500,
            controls_fade_ms: 300,
            controls_fade_curve: FadeCurve::SCurve,
            time_update_interval_ms: 1_000,
            thumb_width: 16.0,
        }
    }
}

impl TomlConfig {
    /// Parse a config file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML text and clamp values into usable ranges
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config.normalized())
    }

    /// Reject values that cannot be clamped into something sensible
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "api.base_url must be an http(s) URL, got {:?}",
                    url
                )));
            }
        }
        Ok(())
    }

    /// Clamp timing values so every interval is at least one millisecond
    pub fn normalized(mut self) -> Self {
        let player = &mut self.player;
        player.controls_hide_delay_ms = player.controls_hide_delay_ms.max(1);
        player.time_update_interval_ms = player.time_update_interval_ms.max(1);
        if !player.thumb_width.is_finite() || player.thumb_width < 0.0 {
            player.thumb_width = PlayerSettings::default().thumb_width;
        }
        self.api.request_timeout_ms = self.api.request_timeout_ms.max(1);
        self
    }
}

/// Resolve which config file to read, if any
///
/// Returns `None` when no candidate exists; callers fall back to defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join("config.toml"))
        .filter(|p| p.exists())
}

/// Load configuration, degrading to compiled defaults when no file exists
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} does not exist, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    info!("Loading config from {}", path.display());
    TomlConfig::from_file(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.player.controls_hide_delay_ms, 2_500);
        assert_eq!(config.player.time_update_interval_ms, 1_000);
        assert_eq!(config.player.controls_fade_curve, FadeCurve::SCurve);
        assert_eq!(config.logging.level, "info");
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [player]
            controls_hide_delay_ms = 4000
            controls_fade_curve = "linear"
            "#,
        )
        .unwrap();

        assert_eq!(config.player.controls_hide_delay_ms, 4000);
        assert_eq!(config.player.controls_fade_curve, FadeCurve::Linear);
        assert_eq!(config.player.controls_fade_ms, 300);
        assert_eq!(config.api.request_timeout_ms, 15_000);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let config = TomlConfig::from_toml_str(
            r#"
            [player]
            controls_hide_delay_ms = 0
            time_update_interval_ms = 0
            thumb_width = -4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.player.controls_hide_delay_ms, 1);
        assert_eq!(config.player.time_update_interval_ms, 1);
        assert_eq!(config.player.thumb_width, 16.0);
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let result = TomlConfig::from_toml_str(
            r#"
            [api]
            base_url = "ftp://courses.example"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = TomlConfig::from_toml_str("[player\ncontrols_fade_ms = ");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }
}
