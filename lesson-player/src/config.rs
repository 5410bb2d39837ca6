//! lesson-player specific configuration

use lesson_common::config::TomlConfig;
use lesson_common::time::millis_to_duration;
use lesson_common::FadeCurve;
use std::time::Duration;

/// Player session configuration
///
/// Built from the shared TOML config; `Default` matches the compiled
/// defaults (2.5 s auto-hide, 1 s position callbacks).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Visible controls hide after this much inactivity
    pub controls_hide_delay: Duration,
    /// Controls fade in/out duration
    pub controls_fade: Duration,
    pub controls_fade_curve: FadeCurve,
    /// Minimum spacing between `on_time_update` callbacks
    pub time_update_interval: Duration,
    /// Scrubber thumb width in layout units
    pub thumb_width: f32,
    /// Course backend base URL; `None` when running offline
    pub api_base_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for PlayerConfig {
    fn from(config: &TomlConfig) -> Self {
        let player = &config.player;
        Self {
            controls_hide_delay: millis_to_duration(player.controls_hide_delay_ms),
            controls_fade: millis_to_duration(player.controls_fade_ms),
            controls_fade_curve: player.controls_fade_curve,
            time_update_interval: millis_to_duration(player.time_update_interval_ms),
            thumb_width: player.thumb_width,
            api_base_url: config.api.base_url.clone(),
            request_timeout: millis_to_duration(config.api.request_timeout_ms),
        }
    }
}
