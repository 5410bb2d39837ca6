//! Playback state machine core
//!
//! Single owner of the session's playback state:
//! `Loading -> Ready -> {Playing <-> Paused} -> Ended`, with `Seeking` while
//! a committed seek is in flight and `Errored` after a failure. The drag flag
//! (scrubber) and the controls timer are orthogonal to the playback state and
//! live here too so one step updates all of them together.
//!
//! The machine is synchronous and never talks to the host. It returns
//! `MachineEffect`s which the session turns into callbacks and events.

use super::controls::ControlsVisibility;
use super::scrubber::Scrubber;
use super::status::PlaybackStatus;
use crate::config::PlayerConfig;
use crate::error::ResolutionError;
use lesson_common::events::{FailureKind, PlaybackState};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Why the session is in `Errored`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("{0}")]
    Resolution(ResolutionError),

    #[error("Playback failed: {0}")]
    Playback(String),
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Resolution(_) => FailureKind::Resolution,
            Failure::Playback(_) => FailureKind::Playback,
        }
    }
}

/// Observable consequence of a machine step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineEffect {
    StateChanged {
        old: PlaybackState,
        new: PlaybackState,
    },
    /// Host-reported `is_playing` flipped
    PlayingChanged(bool),
    /// Host reported end of media
    Finished,
}

pub struct PlayerMachine {
    state: PlaybackState,
    /// Last host-reported position
    position_ms: u64,
    duration_ms: Option<u64>,
    is_playing: bool,
    fullscreen: bool,
    failure: Option<Failure>,
    scrubber: Scrubber,
    controls: ControlsVisibility,
}

impl PlayerMachine {
    pub fn new(config: &PlayerConfig, now: Instant) -> Self {
        Self {
            state: PlaybackState::Loading,
            position_ms: 0,
            duration_ms: None,
            is_playing: false,
            fullscreen: false,
            failure: None,
            scrubber: Scrubber::new(config.thumb_width),
            controls: ControlsVisibility::new(
                config.controls_hide_delay,
                config.controls_fade,
                config.controls_fade_curve,
                now,
            ),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    pub fn controls(&self) -> &ControlsVisibility {
        &self.controls
    }

    pub fn displayed_position(&self) -> u64 {
        self.scrubber.displayed_position(self.position_ms)
    }

    pub fn thumb_offset(&self) -> f32 {
        self.scrubber
            .thumb_offset(self.displayed_position(), self.duration_ms)
    }

    fn transition(&mut self, new: PlaybackState, effects: &mut Vec<MachineEffect>) {
        if self.state != new {
            let old = self.state;
            self.state = new;
            debug!(%old, %new, "Playback state transition");
            effects.push(MachineEffect::StateChanged { old, new });
        }
    }

    fn set_playing(&mut self, playing: bool, effects: &mut Vec<MachineEffect>) {
        if self.is_playing != playing {
            self.is_playing = playing;
            effects.push(MachineEffect::PlayingChanged(playing));
        }
    }

    /// Reset for a fresh load (mount, reference change, retry)
    ///
    /// An interrupted drag is dropped and the controls countdown resumes.
    pub fn begin_loading(&mut self, now: Instant) -> Vec<MachineEffect> {
        let mut effects = Vec::new();
        self.set_playing(false, &mut effects);
        self.position_ms = 0;
        self.duration_ms = None;
        self.failure = None;
        self.scrubber.cancel();
        self.controls.release(now);
        self.transition(PlaybackState::Loading, &mut effects);
        effects
    }

    /// Fold in one (coalesced) host status
    pub fn apply_status(&mut self, status: &PlaybackStatus) -> Vec<MachineEffect> {
        let mut effects = Vec::new();
        // Errored waits for retry; unloaded reports carry no position
        if self.state == PlaybackState::Errored || !status.is_loaded {
            return effects;
        }

        self.position_ms = status.position_ms;
        if status.duration_ms.is_some() {
            self.duration_ms = status.duration_ms;
        }

        if self.state == PlaybackState::Loading {
            self.transition(PlaybackState::Ready, &mut effects);
        }
        self.set_playing(status.is_playing, &mut effects);

        if status.did_just_finish {
            self.transition(PlaybackState::Ended, &mut effects);
            effects.push(MachineEffect::Finished);
            return effects;
        }

        match (self.state, status.is_playing) {
            (
                PlaybackState::Ready
                | PlaybackState::Paused
                | PlaybackState::Seeking
                | PlaybackState::Ended,
                true,
            ) => self.transition(PlaybackState::Playing, &mut effects),
            (PlaybackState::Playing | PlaybackState::Seeking, false) => {
                self.transition(PlaybackState::Paused, &mut effects)
            }
            _ => {}
        }
        effects
    }

    /// `play()` was accepted by the host
    pub fn confirm_play(&mut self) -> Vec<MachineEffect> {
        let mut effects = Vec::new();
        if self.state.accepts_play() {
            self.transition(PlaybackState::Playing, &mut effects);
        }
        effects
    }

    /// Whether a user pause should reach the host
    ///
    /// A seek issued during playback leaves the host playing, so `Seeking`
    /// counts when the last report said so.
    pub fn accepts_pause(&self) -> bool {
        match self.state {
            PlaybackState::Playing => true,
            PlaybackState::Seeking => self.is_playing,
            _ => false,
        }
    }

    /// `pause()` was accepted by the host
    pub fn confirm_pause(&mut self) -> Vec<MachineEffect> {
        let mut effects = Vec::new();
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Seeking) {
            self.transition(PlaybackState::Paused, &mut effects);
        }
        effects
    }

    /// A seek was issued; `Seeking` lasts until the next host status
    pub fn begin_seek(&mut self) -> Vec<MachineEffect> {
        let mut effects = Vec::new();
        if self.state.is_loaded() {
            self.transition(PlaybackState::Seeking, &mut effects);
        }
        effects
    }

    /// Enter `Errored`, abandoning any drag
    pub fn fail(&mut self, failure: Failure) -> Vec<MachineEffect> {
        let mut effects = Vec::new();
        self.scrubber.cancel();
        self.controls.release(Instant::now());
        self.set_playing(false, &mut effects);
        self.failure = Some(failure);
        self.transition(PlaybackState::Errored, &mut effects);
        effects
    }

    /// Start a drag; ignored until media is loaded
    pub fn begin_drag(&mut self, now: Instant) -> bool {
        if !self.state.is_loaded() {
            return false;
        }
        self.scrubber.begin(self.position_ms);
        self.controls.hold(now);
        true
    }

    pub fn drag_to(&mut self, position_ms: u64) -> bool {
        let position_ms = match self.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
        self.scrubber.drag_to(position_ms)
    }

    /// End a drag, yielding the single seek target
    pub fn release_drag(&mut self, now: Instant) -> Option<u64> {
        self.controls.release(now);
        self.scrubber.release()
    }

    pub fn set_track_width(&mut self, width: f32) {
        self.scrubber.set_track_width(width);
    }

    /// Flip fullscreen; returns the new value
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn show_controls(&mut self, now: Instant) {
        self.controls.show(now);
    }

    /// Returns whether the controls are visible after the tap
    pub fn tap(&mut self, now: Instant) -> bool {
        self.controls.tap(now)
    }

    pub fn touch_controls(&mut self, now: Instant) {
        self.controls.touch(now);
    }

    pub fn expire_controls(&mut self, now: Instant) -> bool {
        self.controls.expire(now)
    }

    /// Drop pending timers and any drag (unmount)
    pub fn cancel_timers(&mut self) {
        self.controls.cancel();
        self.scrubber.cancel();
    }
}
