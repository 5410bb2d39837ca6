//! Player handle: mounting a session and talking to it
//!
//! `PlayerHandle::mount` spawns the session task and returns the handle the
//! screen keeps for the lifetime of the player. User gestures become
//! `Intent`s on an unbounded channel; renderers read `PlayerView` snapshots
//! from a `watch` channel. Dropping the handle unmounts the session.

use super::controls::OpacityFade;
use super::driver::MediaHost;
use super::machine::Failure;
use super::session::PlayerSession;
use crate::callbacks::{NoopCallbacks, PlayerCallbacks};
use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::media::MediaReference;
use crate::orientation::{NoopOrientationLock, OrientationLock};
use crate::remote::{LessonContext, ProgressStore, SignedUrlProvider};
use lesson_common::events::{EventBus, PlaybackState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// User gesture or lifecycle request delivered to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Tap on the video surface (toggles controls)
    Tap,
    Play,
    Pause,
    TogglePlayPause,
    BeginDrag,
    DragTo(u64),
    ReleaseDrag,
    /// Progress track laid out with this width
    TrackMeasured(f32),
    ToggleFullscreen,
    /// Relative seek in milliseconds (negative skips back)
    Skip(i64),
    /// Restart resolution after a failure
    Retry,
    ChangeReference(MediaReference),
    Unmount,
}

/// What to play
#[derive(Debug, Clone)]
pub struct MountRequest {
    pub lesson: LessonContext,
    pub media: MediaReference,
    pub thumbnail: Option<MediaReference>,
}

impl MountRequest {
    pub fn new(lesson: LessonContext, media: MediaReference) -> Self {
        Self {
            lesson,
            media,
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: MediaReference) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }
}

/// External services a session depends on
#[derive(Clone)]
pub struct Collaborators {
    pub urls: Arc<dyn SignedUrlProvider>,
    pub progress: Arc<dyn ProgressStore>,
    pub callbacks: Arc<dyn PlayerCallbacks>,
    pub orientation: Arc<dyn OrientationLock>,
    pub events: EventBus,
}

impl Collaborators {
    pub fn new(urls: Arc<dyn SignedUrlProvider>, progress: Arc<dyn ProgressStore>) -> Self {
        Self {
            urls,
            progress,
            callbacks: Arc::new(NoopCallbacks),
            orientation: Arc::new(NoopOrientationLock),
            events: EventBus::default(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn PlayerCallbacks>) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_orientation(mut self, orientation: Arc<dyn OrientationLock>) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }
}

/// Render snapshot published after every session step
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub mount_id: Uuid,
    pub state: PlaybackState,
    pub sliding: bool,
    /// Displayed position: the drag position while sliding, else the host's
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub thumb_offset: f32,
    pub controls_visible: bool,
    pub controls_fade: OpacityFade,
    pub fullscreen: bool,
    /// Poster to show until the first frame is loaded
    pub poster_uri: Option<String>,
    pub error: Option<Failure>,
    pub completed: bool,
}

impl PlayerView {
    pub fn controls_opacity(&self, now: Instant) -> f32 {
        self.controls_fade.opacity_at(now)
    }
}

/// Owner-side handle to a mounted player session
pub struct PlayerHandle {
    mount_id: Uuid,
    intents: mpsc::UnboundedSender<Intent>,
    view: watch::Receiver<PlayerView>,
    task: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    /// Mount a player session on the current tokio runtime
    pub fn mount(
        request: MountRequest,
        host: Box<dyn MediaHost>,
        collaborators: Collaborators,
        config: PlayerConfig,
    ) -> Self {
        let mount_id = Uuid::new_v4();
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        let (session, results_rx, view) =
            PlayerSession::new(mount_id, request, host, collaborators, config);

        debug!(%mount_id, "Mounting player session");
        let task = tokio::spawn(session.run(intents_rx, results_rx));

        Self {
            mount_id,
            intents: intents_tx,
            view,
            task: Some(task),
        }
    }

    pub fn mount_id(&self) -> Uuid {
        self.mount_id
    }

    /// Deliver an intent; fails once the session has stopped
    pub fn send(&self, intent: Intent) -> Result<()> {
        self.intents.send(intent).map_err(|_| Error::SessionClosed)
    }

    pub fn tap(&self) -> Result<()> {
        self.send(Intent::Tap)
    }

    pub fn play(&self) -> Result<()> {
        self.send(Intent::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Intent::Pause)
    }

    pub fn toggle_play_pause(&self) -> Result<()> {
        self.send(Intent::TogglePlayPause)
    }

    pub fn begin_drag(&self) -> Result<()> {
        self.send(Intent::BeginDrag)
    }

    pub fn drag_to(&self, position_ms: u64) -> Result<()> {
        self.send(Intent::DragTo(position_ms))
    }

    pub fn release_drag(&self) -> Result<()> {
        self.send(Intent::ReleaseDrag)
    }

    pub fn track_measured(&self, width: f32) -> Result<()> {
        self.send(Intent::TrackMeasured(width))
    }

    pub fn toggle_fullscreen(&self) -> Result<()> {
        self.send(Intent::ToggleFullscreen)
    }

    pub fn skip_forward(&self, millis: u64) -> Result<()> {
        self.send(Intent::Skip(i64::try_from(millis).unwrap_or(i64::MAX)))
    }

    pub fn skip_back(&self, millis: u64) -> Result<()> {
        self.send(Intent::Skip(-i64::try_from(millis).unwrap_or(i64::MAX)))
    }

    pub fn retry(&self) -> Result<()> {
        self.send(Intent::Retry)
    }

    pub fn change_reference(&self, reference: MediaReference) -> Result<()> {
        self.send(Intent::ChangeReference(reference))
    }

    /// Latest published snapshot
    pub fn view(&self) -> PlayerView {
        self.view.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot
    pub fn watch_view(&self) -> watch::Receiver<PlayerView> {
        self.view.clone()
    }

    /// Stop the session and wait for its teardown to finish
    pub async fn unmount(mut self) -> Result<()> {
        let _ = self.intents.send(Intent::Unmount);
        match self.task.take() {
            Some(task) => task.await.map_err(Error::from),
            None => Ok(()),
        }
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.intents.send(Intent::Unmount);
        }
    }
}
