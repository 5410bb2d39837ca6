//! # Lesson Player Library (lesson-player)
//!
//! Adaptive media playback and progress sync for the lesson screen.
//!
//! **Purpose:** Resolve a lesson's media reference to a playable URI, drive
//! the host media primitive, keep the scrubber and overlay controls in step
//! with playback, and report module completion exactly once per mount.
//!
//! **Architecture:** One tokio task per mounted player owns all state;
//! gestures, host callbacks and resolver results arrive as messages.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod media;
pub mod orientation;
pub mod playback;
pub mod remote;

pub use callbacks::{NoopCallbacks, PlayerCallbacks};
pub use config::PlayerConfig;
pub use error::{Error, ResolutionError, Result};
pub use media::{MediaReference, ResolvedSource};
pub use orientation::{NoopOrientationLock, OrientationLock};
pub use playback::{Collaborators, Intent, MountRequest, PlayerHandle, PlayerView};
pub use remote::{LessonContext, ProgressStore, SignedUrlProvider};
