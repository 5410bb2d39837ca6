//! Parent callbacks
//!
//! The screen hosting the player reacts to playback through these hooks:
//! progress display, next-module gating, play/pause mirrors. Every hook has
//! a no-op default so embedders implement only what they use.
//!
//! Callbacks run on the session task. Implementations must not block.

/// Hooks invoked by a player session
pub trait PlayerCallbacks: Send + Sync {
    /// Throttled position (at most once per telemetry interval)
    fn on_time_update(&self, _position_ms: u64) {}

    /// Duration, once per distinct value
    fn on_duration_update(&self, _duration_ms: u64) {}

    /// Host-reported `is_playing` changed
    fn on_play_pause_change(&self, _playing: bool) {}

    /// Completion unlocked; fired at most once per mount, always with `true`
    fn on_completion_changed(&self, _completed: bool) {}
}

/// Callbacks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl PlayerCallbacks for NoopCallbacks {}
