//! Completion and progress reporting
//!
//! The first end-of-media of a mount flips a write-once record. In that same
//! step the reporter starts the remote "mark module complete" upsert (not
//! awaited) and invokes the parent completion callback. Later ends, from
//! replays or duplicate host reports, do nothing.
//!
//! Persistence failures are logged and published on the event bus. They are
//! never retried and never roll the local completion back.

use crate::callbacks::PlayerCallbacks;
use crate::remote::{LessonContext, ProgressStore};
use lesson_common::events::{EventBus, LessonEvent};
use lesson_common::time;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Mount-scoped write-once flag
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRecord {
    fired: bool,
}

impl CompletionRecord {
    /// Check-and-set; `true` only for the first call
    pub fn try_fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    pub fn fired(&self) -> bool {
        self.fired
    }
}

pub struct CompletionReporter {
    record: CompletionRecord,
    store: Arc<dyn ProgressStore>,
    lesson: LessonContext,
    mount_id: Uuid,
    events: EventBus,
}

impl CompletionReporter {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        lesson: LessonContext,
        mount_id: Uuid,
        events: EventBus,
    ) -> Self {
        Self {
            record: CompletionRecord::default(),
            store,
            lesson,
            mount_id,
            events,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.record.fired()
    }

    /// Handle an end-of-media
    ///
    /// Returns the persistence task on the first call so callers may await
    /// it; dropping the handle leaves the upsert running.
    pub fn report_ended(&mut self, callbacks: &dyn PlayerCallbacks) -> Option<JoinHandle<()>> {
        if !self.record.try_fire() {
            return None;
        }

        info!(
            course_id = %self.lesson.course_id,
            module_number = self.lesson.module_number,
            "Module completed"
        );

        let persist = self.spawn_persist();
        callbacks.on_completion_changed(true);
        self.events.emit_lossy(LessonEvent::ModuleCompleted {
            mount_id: self.mount_id,
            course_id: self.lesson.course_id.clone(),
            module_number: self.lesson.module_number,
            timestamp: time::now(),
        });
        Some(persist)
    }

    fn spawn_persist(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let key = self.lesson.progress_key();
        let events = self.events.clone();
        let mount_id = self.mount_id;

        tokio::spawn(async move {
            match store.mark_video_completed(&key).await {
                Ok(()) => {
                    info!(
                        course_id = %key.course_id,
                        module_number = key.module_number,
                        "Progress persisted"
                    );
                    events.emit_lossy(LessonEvent::ProgressPersisted {
                        mount_id,
                        course_id: key.course_id,
                        module_number: key.module_number,
                        timestamp: time::now(),
                    });
                }
                Err(e) => {
                    warn!(
                        course_id = %key.course_id,
                        module_number = key.module_number,
                        "Failed to persist module completion: {}",
                        e
                    );
                    events.emit_lossy(LessonEvent::ProgressPersistFailed {
                        mount_id,
                        course_id: key.course_id,
                        module_number: key.module_number,
                        reason: e.to_string(),
                        timestamp: time::now(),
                    });
                }
            }
        })
    }
}
