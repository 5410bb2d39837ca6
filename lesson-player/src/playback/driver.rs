//! Playback driver adapter
//!
//! Owns the single host media primitive. Nothing else in the crate calls into
//! the host; the session issues `play`/`pause`/`seek_to` through the driver.
//!
//! Host callbacks are delivered through a `HostSink` handed to the host at
//! load time. Statuses land in a `watch` slot (last write wins), so a burst of
//! reports is coalesced into the latest one. End-of-media is latched
//! separately so coalescing can never swallow a `did_just_finish` report.
//!
//! The driver starts every load paused and auto-plays exactly once, on the
//! rising edge of `is_loaded`.

use super::events::HostEvent;
use super::status::PlaybackStatus;
use crate::error::{Error, Result};
use crate::media::ResolvedSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Host media primitive (platform video element, decoder, or a simulation)
///
/// Commands are fire-and-forget; outcomes arrive through the `HostSink`.
pub trait MediaHost: Send {
    /// Start loading `uri` without playing; report through `sink`
    fn load(&mut self, uri: &str, sink: HostSink) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek_to(&mut self, position_ms: u64) -> Result<()>;
    /// Release the loaded media; later reports through old sinks are ignored
    fn unload(&mut self);
}

/// Callback endpoint handed to the host for one load
#[derive(Clone)]
pub struct HostSink {
    status: Arc<watch::Sender<PlaybackStatus>>,
    finished: Arc<AtomicBool>,
    errors: mpsc::UnboundedSender<String>,
}

impl HostSink {
    /// Report a status; overwrites any report not yet processed
    pub fn report(&self, status: PlaybackStatus) {
        if status.did_just_finish {
            self.finished.store(true, Ordering::Release);
        }
        self.status.send_replace(status);
    }

    /// Report a load/decode failure
    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.errors.send(reason.into());
    }

    /// Whether the session still listens to this load
    pub fn is_attached(&self) -> bool {
        !self.errors.is_closed()
    }
}

/// Receiving half of one load's callbacks
struct HostLink {
    status: watch::Receiver<PlaybackStatus>,
    finished: Arc<AtomicBool>,
    errors: mpsc::UnboundedReceiver<String>,
}

fn host_link() -> (HostSink, HostLink) {
    let (status_tx, status_rx) = watch::channel(PlaybackStatus::default());
    let (errors_tx, errors_rx) = mpsc::unbounded_channel();
    let finished = Arc::new(AtomicBool::new(false));
    (
        HostSink {
            status: Arc::new(status_tx),
            finished: Arc::clone(&finished),
            errors: errors_tx,
        },
        HostLink {
            status: status_rx,
            finished,
            errors: errors_rx,
        },
    )
}

/// Adapter around the host primitive
pub struct PlaybackDriver {
    host: Box<dyn MediaHost>,
    link: Option<HostLink>,
    loaded_uri: Option<String>,
    /// Level of `is_loaded` at the last observed status
    was_loaded: bool,
    /// Cleared once auto-play has fired for the current load
    autoplay_armed: bool,
}

impl PlaybackDriver {
    pub fn new(host: Box<dyn MediaHost>) -> Self {
        Self {
            host,
            link: None,
            loaded_uri: None,
            was_loaded: false,
            autoplay_armed: false,
        }
    }

    /// Load a resolved source, replacing whatever was loaded before
    pub fn load(&mut self, source: &ResolvedSource) -> Result<()> {
        self.unload();

        let (sink, link) = host_link();
        info!(uri = %source.uri, "Loading media");
        self.host.load(&source.uri, sink)?;

        self.link = Some(link);
        self.loaded_uri = Some(source.uri.clone());
        self.was_loaded = false;
        self.autoplay_armed = true;
        Ok(())
    }

    /// Release the current load; stale host reports go nowhere afterwards
    pub fn unload(&mut self) {
        if self.link.take().is_some() {
            debug!(uri = ?self.loaded_uri, "Unloading media");
            self.host.unload();
        }
        self.loaded_uri = None;
        self.was_loaded = false;
        self.autoplay_armed = false;
    }

    pub fn is_attached(&self) -> bool {
        self.link.is_some()
    }

    pub fn loaded_uri(&self) -> Option<&str> {
        self.loaded_uri.as_deref()
    }

    /// Track `is_loaded` and auto-play on its rising edge
    ///
    /// Returns `true` when this status triggered the auto-play.
    pub fn observe(&mut self, status: &PlaybackStatus) -> Result<bool> {
        let rising_edge = status.is_loaded && !self.was_loaded;
        self.was_loaded = status.is_loaded;

        if rising_edge && self.autoplay_armed {
            self.autoplay_armed = false;
            info!("Media loaded, starting playback");
            self.host.play()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn play(&mut self) -> Result<()> {
        self.require_attached("play")?;
        self.host.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.require_attached("pause")?;
        self.host.pause()
    }

    pub fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.require_attached("seek")?;
        debug!(position_ms, "Seeking");
        self.host.seek_to(position_ms)
    }

    fn require_attached(&self, command: &str) -> Result<()> {
        if self.link.is_some() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!("{} with no media loaded", command)))
        }
    }

    /// Wait for the next host event of the current load
    ///
    /// Returns `None` immediately when nothing is loaded or the host dropped
    /// its sink. Failures take priority over pending statuses.
    pub async fn next_event(&mut self) -> Option<HostEvent> {
        let link = self.link.as_mut()?;

        tokio::select! {
            biased;
            Some(reason) = link.errors.recv() => Some(HostEvent::Failed(reason)),
            Ok(()) = link.status.changed() => {
                let mut status = *link.status.borrow_and_update();
                if link.finished.swap(false, Ordering::AcqRel) {
                    status.did_just_finish = true;
                }
                Some(HostEvent::Status(status))
            }
            else => None,
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.unload();
    }
}
