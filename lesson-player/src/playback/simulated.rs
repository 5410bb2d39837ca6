//! Simulated host media primitive
//!
//! Deterministic stand-in for a platform video element: after a load delay
//! it reports `is_loaded`, then advances position on a fixed tick while
//! playing and reports `did_just_finish` at the end. Runs on the tokio clock,
//! so tests can drive it with a paused runtime.

use super::driver::{HostSink, MediaHost};
use super::events::HostCommand;
use super::status::PlaybackStatus;
use crate::error::{Error, Result};
use lesson_common::time::duration_to_millis;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::debug;

/// Properties of the simulated asset
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    pub duration_ms: u64,
    /// Time between `load` and the first `is_loaded` report
    pub load_delay: Duration,
    /// Status report cadence while playing
    pub tick: Duration,
    /// Loads of URIs containing this marker fail with a decode error
    pub fail_marker: Option<String>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            load_delay: Duration::from_millis(200),
            tick: Duration::from_millis(100),
            fail_marker: None,
        }
    }
}

/// Host primitive backed by a tokio task
pub struct SimulatedHost {
    media: SimulatedMedia,
    commands: Option<mpsc::UnboundedSender<HostCommand>>,
    task: Option<JoinHandle<()>>,
}

impl SimulatedHost {
    pub fn new(media: SimulatedMedia) -> Self {
        Self {
            media,
            commands: None,
            task: None,
        }
    }

    fn send(&self, command: HostCommand) -> Result<()> {
        let commands = self
            .commands
            .as_ref()
            .ok_or_else(|| Error::Playback("simulated host has no media loaded".to_string()))?;
        commands
            .send(command)
            .map_err(|_| Error::Playback("simulated host stopped".to_string()))
    }
}

impl MediaHost for SimulatedHost {
    fn load(&mut self, uri: &str, sink: HostSink) -> Result<()> {
        self.unload();

        let (tx, rx) = mpsc::unbounded_channel();
        let media = self.media.clone();
        let fails = media
            .fail_marker
            .as_deref()
            .is_some_and(|marker| uri.contains(marker));

        debug!(uri, fails, "Simulated host loading");
        self.task = Some(tokio::spawn(async move {
            sleep(media.load_delay).await;
            if fails {
                sink.fail("simulated decode error");
                return;
            }
            run_playback(media, sink, rx).await;
        }));
        self.commands = Some(tx);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.send(HostCommand::Play)
    }

    fn pause(&mut self) -> Result<()> {
        self.send(HostCommand::Pause)
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.send(HostCommand::SeekTo(position_ms))
    }

    fn unload(&mut self) {
        self.commands = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SimulatedHost {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Playback loop for one load
async fn run_playback(
    media: SimulatedMedia,
    sink: HostSink,
    mut commands: mpsc::UnboundedReceiver<HostCommand>,
) {
    let duration = media.duration_ms;
    let step = duration_to_millis(media.tick).max(1);
    let mut position = 0u64;
    let mut playing = false;

    sink.report(PlaybackStatus::paused(position, duration));

    let mut ticker = interval_at(Instant::now() + media.tick, media.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                None | Some(HostCommand::Unload) => break,
                Some(HostCommand::Play) => {
                    if position < duration {
                        playing = true;
                        ticker.reset();
                    }
                    sink.report(status(playing, position, duration));
                }
                Some(HostCommand::Pause) => {
                    playing = false;
                    sink.report(status(playing, position, duration));
                }
                Some(HostCommand::SeekTo(target)) => {
                    position = target.min(duration);
                    sink.report(status(playing, position, duration));
                }
                Some(HostCommand::Load(_)) => {}
            },
            _ = ticker.tick(), if playing => {
                position = (position + step).min(duration);
                if position >= duration {
                    playing = false;
                    sink.report(PlaybackStatus::finished(duration));
                } else {
                    sink.report(PlaybackStatus::playing(position, duration));
                }
            }
        }
    }
}

fn status(playing: bool, position_ms: u64, duration_ms: u64) -> PlaybackStatus {
    if playing {
        PlaybackStatus::playing(position_ms, duration_ms)
    } else {
        PlaybackStatus::paused(position_ms, duration_ms)
    }
}
