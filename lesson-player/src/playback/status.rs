//! Host playback status records

use serde::{Deserialize, Serialize};

/// One status report from the host media primitive
///
/// Reports arrive at arbitrary frequency and are coalesced: only the latest
/// value matters, earlier ones are never replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    #[serde(rename = "positionMillis")]
    pub position_ms: u64,
    #[serde(rename = "durationMillis")]
    pub duration_ms: Option<u64>,
    /// True on the report that crosses end of media
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// Loaded and parked at `position_ms`
    pub fn paused(position_ms: u64, duration_ms: u64) -> Self {
        Self {
            is_loaded: true,
            is_playing: false,
            position_ms,
            duration_ms: Some(duration_ms),
            did_just_finish: false,
        }
    }

    /// Loaded and advancing at `position_ms`
    pub fn playing(position_ms: u64, duration_ms: u64) -> Self {
        Self {
            is_playing: true,
            ..Self::paused(position_ms, duration_ms)
        }
    }

    /// End-of-media report
    pub fn finished(duration_ms: u64) -> Self {
        Self {
            did_just_finish: true,
            ..Self::paused(duration_ms, duration_ms)
        }
    }
}
