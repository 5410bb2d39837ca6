//! Test helpers for lesson-player integration tests
//!
//! Provides scriptable stand-ins for every collaborator of a session:
//! - ScriptedHost: records driver commands, lets the test push host reports
//! - FakeSigner: signs storage paths after a per-path delay, can fail on demand
//! - CountingStore, RecordingCallbacks, RecordingLock: call recorders

#![allow(dead_code)]

use async_trait::async_trait;
use lesson_player::error::{Error, Result};
use lesson_player::media::MediaReference;
use lesson_player::playback::{HostCommand, HostSink, MediaHost, PlayerView};
use lesson_player::remote::{ProgressKey, ProgressStore, SignedUrlProvider, SignedUrlRequest};
use lesson_player::{
    Collaborators, LessonContext, MountRequest, OrientationLock, PlayerCallbacks, PlayerConfig,
    PlayerHandle, ResolutionError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SIGNED_BASE: &str = "https://signed.example/";

/// Let the session task drain its queues (one paused-clock millisecond)
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn storage(path: &str) -> MediaReference {
    MediaReference::StorageRelativePath {
        path: path.to_string(),
        variant_index: 0,
    }
}

pub fn remote(uri: &str) -> MediaReference {
    MediaReference::RemoteAbsoluteUri {
        uri: uri.to_string(),
    }
}

pub fn signed(path: &str) -> String {
    format!("{}{}", SIGNED_BASE, path)
}

pub fn lesson() -> LessonContext {
    LessonContext::new("course-42", "Physics", 3)
}

// ========================================
// Host
// ========================================

/// Shared view into what a `ScriptedHost` was asked to do
#[derive(Clone, Default)]
pub struct HostProbe {
    commands: Arc<Mutex<Vec<HostCommand>>>,
    sink: Arc<Mutex<Option<HostSink>>>,
}

impl HostProbe {
    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, command: &HostCommand) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::SeekTo(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::Load(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    /// Sink of the most recent load
    pub fn sink(&self) -> HostSink {
        self.sink.lock().unwrap().clone().expect("host has not been loaded")
    }
}

/// Host primitive that only records commands
pub struct ScriptedHost {
    probe: HostProbe,
}

impl ScriptedHost {
    pub fn new() -> (Self, HostProbe) {
        let probe = HostProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }

    fn record(&self, command: HostCommand) {
        self.probe.commands.lock().unwrap().push(command);
    }
}

impl MediaHost for ScriptedHost {
    fn load(&mut self, uri: &str, sink: HostSink) -> Result<()> {
        self.record(HostCommand::Load(uri.to_string()));
        *self.probe.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.record(HostCommand::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(HostCommand::Pause);
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.record(HostCommand::SeekTo(position_ms));
        Ok(())
    }

    fn unload(&mut self) {
        self.record(HostCommand::Unload);
    }
}

// ========================================
// Remote collaborators
// ========================================

/// Signs `path` as `https://signed.example/{path}`
///
/// Paths starting with `slow/` take 500 ms, everything else 10 ms.
#[derive(Default)]
pub struct FakeSigner {
    pub calls: AtomicUsize,
    /// Number of upcoming lookups that fail with a network error
    pub failures_pending: AtomicUsize,
}

impl FakeSigner {
    pub fn failing(times: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures_pending: AtomicUsize::new(times),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignedUrlProvider for FakeSigner {
    async fn signed_url(
        &self,
        request: &SignedUrlRequest,
    ) -> std::result::Result<String, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = if request.path.starts_with("slow/") { 500 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let should_fail = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ResolutionError::NetworkFailure("connection reset".to_string()));
        }
        Ok(signed(&request.path))
    }
}

#[derive(Default)]
pub struct CountingStore {
    pub keys: Mutex<Vec<ProgressKey>>,
    pub fail: bool,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.keys.lock().unwrap().len()
    }
}

#[async_trait]
impl ProgressStore for CountingStore {
    async fn mark_video_completed(&self, key: &ProgressKey) -> Result<()> {
        self.keys.lock().unwrap().push(key.clone());
        if self.fail {
            return Err(Error::ProgressPersistence("HTTP 500".to_string()));
        }
        Ok(())
    }
}

// ========================================
// Parent callbacks and orientation
// ========================================

#[derive(Default)]
pub struct RecordingCallbacks {
    pub time_updates: Mutex<Vec<u64>>,
    pub durations: Mutex<Vec<u64>>,
    pub play_pause: Mutex<Vec<bool>>,
    pub completions: Mutex<Vec<bool>>,
}

impl RecordingCallbacks {
    pub fn time_updates(&self) -> Vec<u64> {
        self.time_updates.lock().unwrap().clone()
    }

    pub fn durations(&self) -> Vec<u64> {
        self.durations.lock().unwrap().clone()
    }

    pub fn play_pause(&self) -> Vec<bool> {
        self.play_pause.lock().unwrap().clone()
    }

    pub fn completions(&self) -> Vec<bool> {
        self.completions.lock().unwrap().clone()
    }
}

impl PlayerCallbacks for RecordingCallbacks {
    fn on_time_update(&self, position_ms: u64) {
        self.time_updates.lock().unwrap().push(position_ms);
    }

    fn on_duration_update(&self, duration_ms: u64) {
        self.durations.lock().unwrap().push(duration_ms);
    }

    fn on_play_pause_change(&self, playing: bool) {
        self.play_pause.lock().unwrap().push(playing);
    }

    fn on_completion_changed(&self, completed: bool) {
        self.completions.lock().unwrap().push(completed);
    }
}

#[derive(Default)]
pub struct RecordingLock {
    pub calls: Mutex<Vec<&'static str>>,
}

impl RecordingLock {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl OrientationLock for RecordingLock {
    fn lock_landscape(&self) -> Result<()> {
        self.calls.lock().unwrap().push("lock_landscape");
        Ok(())
    }

    fn unlock(&self) -> Result<()> {
        self.calls.lock().unwrap().push("unlock");
        Ok(())
    }
}

// ========================================
// Session fixture
// ========================================

/// A mounted session plus handles on all its collaborators
pub struct Fixture {
    pub player: PlayerHandle,
    pub host: HostProbe,
    pub signer: Arc<FakeSigner>,
    pub store: Arc<CountingStore>,
    pub callbacks: Arc<RecordingCallbacks>,
    pub lock: Arc<RecordingLock>,
}

impl Fixture {
    pub fn mount(media: MediaReference) -> Self {
        Self::mount_with(MountRequest::new(lesson(), media), FakeSigner::default())
    }

    pub fn mount_with(request: MountRequest, signer: FakeSigner) -> Self {
        let (host, probe) = ScriptedHost::new();
        Self::mount_host(request, Box::new(host), probe, signer)
    }

    pub fn mount_host(
        request: MountRequest,
        host: Box<dyn MediaHost>,
        probe: HostProbe,
        signer: FakeSigner,
    ) -> Self {
        let signer = Arc::new(signer);
        let store = Arc::new(CountingStore::default());
        let callbacks = Arc::new(RecordingCallbacks::default());
        let lock = Arc::new(RecordingLock::default());

        let collaborators = Collaborators::new(signer.clone(), store.clone())
            .with_callbacks(callbacks.clone())
            .with_orientation(lock.clone());
        let player = PlayerHandle::mount(request, host, collaborators, PlayerConfig::default());

        Self {
            player,
            host: probe,
            signer,
            store,
            callbacks,
            lock,
        }
    }

    pub fn view(&self) -> PlayerView {
        self.player.view()
    }
}
