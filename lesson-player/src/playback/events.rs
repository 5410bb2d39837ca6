//! Internal playback events (host -> session)
//!
//! These never leave the crate; the session converts them into
//! `lesson_common::events::LessonEvent`s and parent callbacks.

use super::status::PlaybackStatus;

/// Something the host media primitive reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Latest coalesced status
    Status(PlaybackStatus),

    /// Load or decode failure
    Failed(String),
}

/// Command issued to the host primitive (also used by test doubles to record
/// what the driver asked for)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Load(String),
    Play,
    Pause,
    SeekTo(u64),
    Unload,
}
