//! Player session task
//!
//! One task per mounted player. It owns the driver, both resolvers and the
//! state machine, and is the only place any of them is mutated. The loop
//! waits on four sources:
//!
//! - intents from the `PlayerHandle`
//! - settled signed-URL lookups
//! - host events from the driver (statuses coalesced to the latest)
//! - the controls auto-hide deadline
//!
//! After every step the session publishes a fresh `PlayerView`. On unmount it
//! orphans pending lookups, unloads the host, clears timers and releases the
//! orientation lock.

use super::completion::CompletionReporter;
use super::driver::{MediaHost, PlaybackDriver};
use super::events::HostEvent;
use super::handle::{Collaborators, Intent, MountRequest, PlayerView};
use super::machine::{Failure, MachineEffect, PlayerMachine};
use super::status::PlaybackStatus;
use super::telemetry::TelemetryThrottle;
use crate::callbacks::PlayerCallbacks;
use crate::config::PlayerConfig;
use crate::media::{
    MediaReference, Resolution, ResolveOutcome, ResolveTarget, ResolvedSource, SourceResolver,
};
use crate::orientation::FullscreenSubscription;
use lesson_common::events::{EventBus, LessonEvent, PlaybackState};
use lesson_common::time;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub(crate) struct PlayerSession {
    mount_id: Uuid,
    media: MediaReference,
    thumbnail: Option<MediaReference>,
    machine: PlayerMachine,
    driver: PlaybackDriver,
    media_resolver: SourceResolver,
    poster_resolver: SourceResolver,
    poster: Option<ResolvedSource>,
    telemetry: TelemetryThrottle,
    completion: CompletionReporter,
    fullscreen: FullscreenSubscription,
    callbacks: Arc<dyn PlayerCallbacks>,
    events: EventBus,
    results_tx: mpsc::UnboundedSender<Resolution>,
    view_tx: watch::Sender<PlayerView>,
}

impl PlayerSession {
    pub(crate) fn new(
        mount_id: Uuid,
        request: MountRequest,
        host: Box<dyn MediaHost>,
        collaborators: Collaborators,
        config: PlayerConfig,
    ) -> (
        Self,
        mpsc::UnboundedReceiver<Resolution>,
        watch::Receiver<PlayerView>,
    ) {
        let MountRequest {
            lesson,
            media,
            thumbnail,
        } = request;
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let machine = PlayerMachine::new(&config, Instant::now());
        let (view_tx, view_rx) = watch::channel(view_of(mount_id, &machine, None, false));

        let session = Self {
            mount_id,
            media,
            thumbnail,
            machine,
            driver: PlaybackDriver::new(host),
            media_resolver: SourceResolver::new(
                ResolveTarget::Media,
                Arc::clone(&collaborators.urls),
                lesson.clone(),
            ),
            poster_resolver: SourceResolver::new(
                ResolveTarget::Poster,
                Arc::clone(&collaborators.urls),
                lesson.clone(),
            ),
            poster: None,
            telemetry: TelemetryThrottle::new(config.time_update_interval),
            completion: CompletionReporter::new(
                collaborators.progress,
                lesson,
                mount_id,
                collaborators.events.clone(),
            ),
            fullscreen: FullscreenSubscription::new(collaborators.orientation),
            callbacks: collaborators.callbacks,
            events: collaborators.events,
            results_tx,
            view_tx,
        };
        (session, results_rx, view_rx)
    }

    pub(crate) async fn run(
        mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        mut results: mpsc::UnboundedReceiver<Resolution>,
    ) {
        info!(mount_id = %self.mount_id, media = %self.media.describe(), "Player session started");
        self.start();
        self.publish();

        loop {
            let hide_at = self.machine.controls().deadline();

            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(Intent::Unmount) | None => break,
                    Some(intent) => self.handle_intent(intent),
                },
                Some(resolution) = results.recv() => self.handle_resolution(resolution),
                Some(event) = self.driver.next_event() => self.handle_host_event(event),
                _ = sleep_until(hide_at.unwrap_or_else(Instant::now)), if hide_at.is_some() => {
                    if self.machine.expire_controls(Instant::now()) {
                        debug!("Controls auto-hidden");
                    }
                }
            }

            self.publish();
        }

        self.teardown();
    }

    fn start(&mut self) {
        self.machine.show_controls(Instant::now());

        if let Some(thumbnail) = self.thumbnail.clone() {
            if let ResolveOutcome::Resolved(source) =
                self.poster_resolver.resolve(&thumbnail, &self.results_tx)
            {
                self.poster = Some(source);
            }
        }

        self.begin_load();
    }

    /// Resolve the current reference from scratch and load it
    fn begin_load(&mut self) {
        self.driver.unload();
        self.telemetry.reload();
        let effects = self.machine.begin_loading(Instant::now());
        self.apply_effects(effects);

        match self.media_resolver.resolve(&self.media, &self.results_tx) {
            ResolveOutcome::Resolved(source) => self.load_source(source),
            ResolveOutcome::Pending { generation } => {
                debug!(generation, "Waiting for signed URL");
            }
        }
    }

    fn load_source(&mut self, source: ResolvedSource) {
        self.events.emit_lossy(LessonEvent::SourceResolved {
            mount_id: self.mount_id,
            uri: source.uri.clone(),
            timestamp: time::now(),
        });

        if let Err(e) = self.driver.load(&source) {
            error!("Host rejected media load: {}", e);
            self.fail(Failure::Playback(e.to_string()));
        }
    }

    fn fail(&mut self, failure: Failure) {
        self.driver.unload();
        self.media_resolver.invalidate();

        self.events.emit_lossy(LessonEvent::PlaybackFailed {
            mount_id: self.mount_id,
            kind: failure.kind(),
            reason: failure.to_string(),
            timestamp: time::now(),
        });
        let effects = self.machine.fail(failure);
        self.apply_effects(effects);
    }

    fn handle_resolution(&mut self, resolution: Resolution) {
        match resolution.target {
            ResolveTarget::Media => match self.media_resolver.accept(resolution) {
                Some(Ok(source)) => self.load_source(source),
                Some(Err(e)) => {
                    error!("Media resolution failed: {}", e);
                    self.fail(Failure::Resolution(e));
                }
                None => {}
            },
            ResolveTarget::Poster => match self.poster_resolver.accept(resolution) {
                Some(Ok(source)) => self.poster = Some(source),
                Some(Err(e)) => warn!("Thumbnail resolution failed: {}", e),
                None => {}
            },
        }
    }

    fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Failed(reason) => {
                error!("Host playback failed: {}", reason);
                self.fail(Failure::Playback(reason));
            }
            HostEvent::Status(status) => self.handle_status(status),
        }
    }

    fn handle_status(&mut self, status: PlaybackStatus) {
        if let Err(e) = self.driver.observe(&status) {
            warn!("Auto-play failed: {}", e);
        }

        let effects = self.machine.apply_status(&status);
        self.apply_effects(effects);

        if !status.is_loaded || self.machine.state() == PlaybackState::Errored {
            return;
        }

        if let Some(duration_ms) = status.duration_ms.and_then(|d| self.telemetry.duration(d)) {
            self.callbacks.on_duration_update(duration_ms);
            self.events.emit_lossy(LessonEvent::DurationChanged {
                mount_id: self.mount_id,
                duration_ms,
                timestamp: time::now(),
            });
        }

        if let Some(position_ms) = self.telemetry.position(status.position_ms, Instant::now()) {
            self.callbacks.on_time_update(position_ms);
            self.events.emit_lossy(LessonEvent::PlaybackProgress {
                mount_id: self.mount_id,
                position_ms,
                duration_ms: self.machine.duration(),
                timestamp: time::now(),
            });
        }
    }

    fn apply_effects(&mut self, effects: Vec<MachineEffect>) {
        for effect in effects {
            match effect {
                MachineEffect::StateChanged { old, new } => {
                    info!(%old, %new, "Playback state changed");
                    self.events.emit_lossy(LessonEvent::PlaybackStateChanged {
                        mount_id: self.mount_id,
                        old_state: old,
                        new_state: new,
                        timestamp: time::now(),
                    });
                }
                MachineEffect::PlayingChanged(playing) => {
                    self.callbacks.on_play_pause_change(playing);
                }
                MachineEffect::Finished => {
                    // Persistence runs detached; the handle is not needed
                    let _ = self.completion.report_ended(self.callbacks.as_ref());
                }
            }
        }
    }

    fn handle_intent(&mut self, intent: Intent) {
        let now = Instant::now();
        debug!(?intent, "Intent");

        match intent {
            Intent::Tap => {
                self.machine.tap(now);
            }
            Intent::Play => {
                self.machine.touch_controls(now);
                self.play();
            }
            Intent::Pause => {
                self.machine.touch_controls(now);
                self.pause();
            }
            Intent::TogglePlayPause => {
                self.machine.touch_controls(now);
                if self.machine.accepts_pause() {
                    self.pause();
                } else {
                    self.play();
                }
            }
            Intent::BeginDrag => {
                if !self.machine.begin_drag(now) {
                    debug!("Drag ignored, media not loaded");
                }
            }
            Intent::DragTo(position_ms) => {
                self.machine.drag_to(position_ms);
            }
            Intent::ReleaseDrag => {
                if let Some(target) = self.machine.release_drag(now) {
                    self.seek(target);
                }
            }
            Intent::TrackMeasured(width) => self.machine.set_track_width(width),
            Intent::ToggleFullscreen => {
                self.machine.touch_controls(now);
                let fullscreen = self.machine.toggle_fullscreen();
                if self.fullscreen.observe(fullscreen) {
                    self.events.emit_lossy(LessonEvent::FullscreenChanged {
                        mount_id: self.mount_id,
                        fullscreen,
                        timestamp: time::now(),
                    });
                }
            }
            Intent::Skip(delta_ms) => {
                self.machine.touch_controls(now);
                if self.machine.state().is_loaded() && !self.machine.scrubber().is_sliding() {
                    let target = skip_target(
                        self.machine.displayed_position(),
                        delta_ms,
                        self.machine.duration(),
                    );
                    self.seek(target);
                }
            }
            Intent::Retry => {
                if self.machine.state() == PlaybackState::Errored {
                    info!("Retrying media resolution");
                    self.begin_load();
                } else {
                    debug!(state = %self.machine.state(), "Retry ignored, not errored");
                }
            }
            Intent::ChangeReference(reference) => {
                if reference == self.media {
                    debug!("Reference unchanged");
                } else {
                    info!(media = %reference.describe(), "Media reference changed");
                    self.media = reference;
                    self.begin_load();
                }
            }
            // Handled by the run loop
            Intent::Unmount => {}
        }
    }

    fn play(&mut self) {
        if !self.machine.state().accepts_play() {
            debug!(state = %self.machine.state(), "Play ignored");
            return;
        }
        match self.driver.play() {
            Ok(()) => {
                let effects = self.machine.confirm_play();
                self.apply_effects(effects);
            }
            Err(e) => warn!("Play failed: {}", e),
        }
    }

    fn pause(&mut self) {
        if !self.machine.accepts_pause() {
            debug!(state = %self.machine.state(), "Pause ignored");
            return;
        }
        match self.driver.pause() {
            Ok(()) => {
                let effects = self.machine.confirm_pause();
                self.apply_effects(effects);
            }
            Err(e) => warn!("Pause failed: {}", e),
        }
    }

    fn seek(&mut self, target_ms: u64) {
        match self.driver.seek_to(target_ms) {
            Ok(()) => {
                let effects = self.machine.begin_seek();
                self.apply_effects(effects);
            }
            Err(e) => warn!(target_ms, "Seek failed: {}", e),
        }
    }

    fn snapshot(&self) -> PlayerView {
        view_of(
            self.mount_id,
            &self.machine,
            self.poster.as_ref(),
            self.completion.has_fired(),
        )
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.snapshot());
    }

    fn teardown(&mut self) {
        self.media_resolver.invalidate();
        self.poster_resolver.invalidate();
        self.driver.unload();
        self.machine.cancel_timers();
        self.fullscreen.release();
        self.publish();
        info!(mount_id = %self.mount_id, "Player session unmounted");
    }
}

fn view_of(
    mount_id: Uuid,
    machine: &PlayerMachine,
    poster: Option<&ResolvedSource>,
    completed: bool,
) -> PlayerView {
    let state = machine.state();
    let controls = machine.controls();
    PlayerView {
        mount_id,
        state,
        sliding: machine.scrubber().is_sliding(),
        position_ms: machine.displayed_position(),
        duration_ms: machine.duration(),
        thumb_offset: machine.thumb_offset(),
        controls_visible: controls.is_visible(),
        controls_fade: *controls.fade(),
        fullscreen: machine.is_fullscreen(),
        // Poster covers the surface until the first frame is loaded
        poster_uri: if state.is_loaded() {
            None
        } else {
            poster.map(|p| p.uri.clone())
        },
        error: machine.failure().cloned(),
        completed,
    }
}

/// Seek target for a relative skip, clamped to the media
fn skip_target(position_ms: u64, delta_ms: i64, duration_ms: Option<u64>) -> u64 {
    let target = if delta_ms >= 0 {
        position_ms.saturating_add(delta_ms.unsigned_abs())
    } else {
        position_ms.saturating_sub(delta_ms.unsigned_abs())
    };
    match duration_ms {
        Some(duration) => target.min(duration),
        None => target,
    }
}
