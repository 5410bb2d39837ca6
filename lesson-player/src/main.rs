//! Lesson Player (lesson-player) - Main entry point
//!
//! Mounts one player session against the simulated host and plays the given
//! media reference to the end, logging every event. Without an API base URL
//! storage paths are signed locally and progress is only logged.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use lesson_common::config::load_config;
use lesson_common::events::{EventBus, LessonEvent, PlaybackState};
use lesson_player::media::MediaReference;
use lesson_player::playback::{SimulatedHost, SimulatedMedia};
use lesson_player::remote::{
    ProgressClient, ProgressKey, ProgressStore, SignedUrlClient, SignedUrlProvider,
    SignedUrlRequest,
};
use lesson_player::{
    Collaborators, LessonContext, MountRequest, PlayerCallbacks, PlayerConfig, PlayerHandle,
    ResolutionError,
};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for lesson-player
#[derive(Parser, Debug)]
#[command(name = "lesson-player")]
#[command(about = "Lesson media player with progress sync")]
#[command(version)]
struct Args {
    /// Media reference: absolute URI, file path or storage-relative path
    #[arg(default_value = "videos/m1.mp4")]
    media: String,

    /// Optional thumbnail reference shown until the first frame
    #[arg(long)]
    thumbnail: Option<String>,

    /// Config file (overrides LESSON_PLAYER_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "demo-course")]
    course: String,

    #[arg(long, default_value = "General")]
    subject: String,

    #[arg(long, default_value = "1")]
    module: u32,

    /// Media variant for signed-URL lookups
    #[arg(long, default_value = "0")]
    variant: u32,

    /// Length of the simulated media
    #[arg(long, default_value = "10000")]
    duration_ms: u64,

    /// Course backend base URL (overrides the config file)
    #[arg(long, env = "LESSON_PLAYER_API_BASE")]
    api_base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = load_config(args.config.as_deref()).context("Failed to load config")?;

    // Initialize tracing
    let default_filter = format!(
        "lesson_player={level},lesson_common={level}",
        level = toml_config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = PlayerConfig::from(&toml_config);
    if args.api_base.is_some() {
        config.api_base_url = args.api_base.clone();
    }

    let lesson = LessonContext::new(args.course.clone(), args.subject.clone(), args.module);
    let media =
        MediaReference::parse(&args.media, args.variant).context("Invalid media reference")?;
    let mut request = MountRequest::new(lesson, media);
    if let Some(thumbnail) = &args.thumbnail {
        request = request.with_thumbnail(
            MediaReference::parse(thumbnail, args.variant).context("Invalid thumbnail reference")?,
        );
    }

    info!("Starting lesson player for {}", args.media);

    let events = EventBus::default();
    let collaborators = build_collaborators(&config)?
        .with_callbacks(Arc::new(LoggingCallbacks))
        .with_events(events.clone());

    let mut log_rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = log_rx.recv().await {
            debug!(event_type = event.event_type(), "{:?}", event);
        }
    });
    let mut persist_rx = events.subscribe();

    let host = SimulatedHost::new(SimulatedMedia {
        duration_ms: args.duration_ms,
        ..SimulatedMedia::default()
    });
    let request_timeout = config.request_timeout;
    let player = PlayerHandle::mount(request, Box::new(host), collaborators, config);
    player.track_measured(320.0)?;

    let mut view = player.watch_view();
    let finished = async {
        loop {
            let (state, completed) = {
                let current = view.borrow_and_update();
                (current.state, current.completed)
            };
            match state {
                PlaybackState::Ended if completed => return true,
                PlaybackState::Errored => return false,
                _ => {}
            }
            if view.changed().await.is_err() {
                return false;
            }
        }
    };

    let completed = tokio::select! {
        completed = finished => completed,
        _ = shutdown_signal() => false,
    };

    if completed {
        // Give the detached completion upsert a chance to land
        let persisted = tokio::time::timeout(request_timeout, async {
            while let Ok(event) = persist_rx.recv().await {
                if matches!(
                    event,
                    LessonEvent::ProgressPersisted { .. }
                        | LessonEvent::ProgressPersistFailed { .. }
                ) {
                    break;
                }
            }
        })
        .await;
        if persisted.is_err() {
            warn!("Progress upsert still pending at shutdown");
        }
    } else if let Some(error) = player.view().error {
        warn!("Playback stopped: {}", error);
    }

    player.unmount().await.context("Player session failed")?;
    info!("Lesson player shutdown complete");
    Ok(())
}

fn build_collaborators(config: &PlayerConfig) -> Result<Collaborators> {
    match &config.api_base_url {
        Some(base) => {
            info!("Using course backend at {}", base);
            let urls = SignedUrlClient::new(base, config.request_timeout)
                .context("Failed to create signed URL client")?;
            let progress = ProgressClient::new(base, config.request_timeout)
                .context("Failed to create progress client")?;
            Ok(Collaborators::new(Arc::new(urls), Arc::new(progress)))
        }
        None => {
            info!("No API base URL configured, running offline");
            Ok(Collaborators::new(
                Arc::new(OfflineSigner),
                Arc::new(LoggingProgressStore),
            ))
        }
    }
}

/// Signs storage paths without a backend
struct OfflineSigner;

#[async_trait]
impl SignedUrlProvider for OfflineSigner {
    async fn signed_url(
        &self,
        request: &SignedUrlRequest,
    ) -> std::result::Result<String, ResolutionError> {
        Ok(format!(
            "https://media.invalid/{}/{}/{}?variant={}",
            request.course_id, request.module_number, request.path, request.variant_index
        ))
    }
}

/// Progress store that only logs
struct LoggingProgressStore;

#[async_trait]
impl ProgressStore for LoggingProgressStore {
    async fn mark_video_completed(&self, key: &ProgressKey) -> lesson_player::Result<()> {
        info!(
            "Would mark course {} module {} as videoCompleted",
            key.course_id, key.module_number
        );
        Ok(())
    }
}

struct LoggingCallbacks;

impl PlayerCallbacks for LoggingCallbacks {
    fn on_time_update(&self, position_ms: u64) {
        info!("Position {} ms", position_ms);
    }

    fn on_duration_update(&self, duration_ms: u64) {
        info!("Duration {} ms", duration_ms);
    }

    fn on_play_pause_change(&self, playing: bool) {
        info!("{}", if playing { "Playing" } else { "Paused" });
    }

    fn on_completion_changed(&self, completed: bool) {
        info!("Completion changed: {}", completed);
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
