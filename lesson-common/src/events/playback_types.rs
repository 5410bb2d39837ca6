//! Playback-related type definitions
//!
//! Supporting types for playback state and failure classification.

use serde::{Deserialize, Serialize};

/// Playback state enumeration
///
/// `Loading -> Ready -> {Playing <-> Paused} -> Ended`, with `Seeking` while a
/// committed seek is in flight and `Errored` after a resolution or host failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Source resolving or host loading
    Loading,
    /// Loaded, not yet started
    Ready,
    Playing,
    Paused,
    /// Seek issued, waiting for the host to report the new position
    Seeking,
    /// Reached end of media
    Ended,
    /// Resolution or playback failure; waiting for explicit retry
    Errored,
}

impl PlaybackState {
    /// Whether a user play command is meaningful in this state
    pub fn accepts_play(&self) -> bool {
        matches!(
            self,
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Seeking
        )
    }

    /// Whether the host has media loaded in this state
    pub fn is_loaded(&self) -> bool {
        !matches!(self, PlaybackState::Loading | PlaybackState::Errored)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Ready => write!(f, "ready"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Seeking => write!(f, "seeking"),
            PlaybackState::Ended => write!(f, "ended"),
            PlaybackState::Errored => write!(f, "errored"),
        }
    }
}

/// Which stage failed when playback errors out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Source lookup failed (network, auth, not found)
    Resolution,
    /// Host media primitive failed to load or decode
    Playback,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Resolution => write!(f, "resolution"),
            FailureKind::Playback => write!(f, "playback"),
        }
    }
}
