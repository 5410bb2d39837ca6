//! Event types for the lesson player event system
//!
//! Provides shared event definitions and the `EventBus` used by player
//! sessions to publish lifecycle changes to renderers, loggers and hosts.

mod playback_types;

pub use playback_types::{FailureKind, PlaybackState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Lesson player event types
///
/// Every event carries the `mount_id` of the player session that produced it,
/// so several sessions can share one bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LessonEvent {
    /// Playback state machine transitioned
    ///
    /// Triggers:
    /// - UI: update play/pause control and error/ended overlays
    PlaybackStateChanged {
        mount_id: Uuid,
        /// State before change
        old_state: PlaybackState,
        /// State after change
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// Throttled position update (at most once per telemetry interval)
    PlaybackProgress {
        mount_id: Uuid,
        /// Host-reported position (milliseconds)
        position_ms: u64,
        /// Known duration (milliseconds), if the host reported one
        duration_ms: Option<u64>,
        timestamp: DateTime<Utc>,
    },

    /// Media duration became known or changed (asset swap)
    DurationChanged {
        mount_id: Uuid,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A media reference resolved to a playable URI
    SourceResolved {
        mount_id: Uuid,
        uri: String,
        timestamp: DateTime<Utc>,
    },

    /// Resolution or playback failed; the session waits for a retry
    PlaybackFailed {
        mount_id: Uuid,
        kind: FailureKind,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Module completed locally (optimistic, fired once per mount)
    ///
    /// Triggers:
    /// - Navigation: unlock the next module
    ModuleCompleted {
        mount_id: Uuid,
        course_id: String,
        module_number: u32,
        timestamp: DateTime<Utc>,
    },

    /// Remote store acknowledged the completion upsert
    ProgressPersisted {
        mount_id: Uuid,
        course_id: String,
        module_number: u32,
        timestamp: DateTime<Utc>,
    },

    /// Remote completion upsert failed (logged only, never rolled back)
    ProgressPersistFailed {
        mount_id: Uuid,
        course_id: String,
        module_number: u32,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Fullscreen toggled
    FullscreenChanged {
        mount_id: Uuid,
        fullscreen: bool,
        timestamp: DateTime<Utc>,
    },
}

impl LessonEvent {
    /// Session that produced this event
    pub fn mount_id(&self) -> Uuid {
        match self {
            LessonEvent::PlaybackStateChanged { mount_id, .. }
            | LessonEvent::PlaybackProgress { mount_id, .. }
            | LessonEvent::DurationChanged { mount_id, .. }
            | LessonEvent::SourceResolved { mount_id, .. }
            | LessonEvent::PlaybackFailed { mount_id, .. }
            | LessonEvent::ModuleCompleted { mount_id, .. }
            | LessonEvent::ProgressPersisted { mount_id, .. }
            | LessonEvent::ProgressPersistFailed { mount_id, .. }
            | LessonEvent::FullscreenChanged { mount_id, .. } => *mount_id,
        }
    }

    /// Short event name for log lines
    pub fn event_type(&self) -> &'static str {
        match self {
            LessonEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            LessonEvent::PlaybackProgress { .. } => "PlaybackProgress",
            LessonEvent::DurationChanged { .. } => "DurationChanged",
            LessonEvent::SourceResolved { .. } => "SourceResolved",
            LessonEvent::PlaybackFailed { .. } => "PlaybackFailed",
            LessonEvent::ModuleCompleted { .. } => "ModuleCompleted",
            LessonEvent::ProgressPersisted { .. } => "ProgressPersisted",
            LessonEvent::ProgressPersistFailed { .. } => "ProgressPersistFailed",
            LessonEvent::FullscreenChanged { .. } => "FullscreenChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the session loop)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use lesson_common::events::{EventBus, LessonEvent};
/// use uuid::Uuid;
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(LessonEvent::DurationChanged {
///     mount_id: Uuid::new_v4(),
///     duration_ms: 90_000,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(LessonEvent::DurationChanged { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LessonEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<LessonEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: LessonEvent,
    ) -> Result<usize, broadcast::error::SendError<LessonEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: LessonEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
