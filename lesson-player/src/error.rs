//! Error types for lesson-player
//!
//! Resolution failures are kept as their own enum because they are surfaced
//! to the view (error state + retry) rather than propagated with `?`.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a media reference could not be turned into a playable URI
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Backend has no object for this reference
    #[error("Media not found: {0}")]
    NotFound(String),

    /// Transport failure, timeout or unexpected server response
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Credentials missing, expired or insufficient
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl ResolutionError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, context: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ResolutionError::Unauthorized(format!("{} ({})", context, status))
            }
            StatusCode::NOT_FOUND => ResolutionError::NotFound(context.to_string()),
            _ => ResolutionError::NetworkFailure(format!("{} ({})", context, status)),
        }
    }
}

/// Main error type for lesson-player
#[derive(Error, Debug)]
pub enum Error {
    /// Source lookup failed
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Host media primitive rejected a command or failed to load
    #[error("Playback error: {0}")]
    Playback(String),

    /// Remote "mark module complete" call failed
    #[error("Progress persistence error: {0}")]
    ProgressPersistence(String),

    /// HTTP client construction or transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed media reference
    #[error("Invalid media reference: {0}")]
    InvalidReference(String),

    /// Command not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Player session already unmounted
    #[error("Player session closed")]
    SessionClosed,

    /// Session task panicked or was cancelled
    #[error("Session task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type using lesson-player Error
pub type Result<T> = std::result::Result<T, Error>;
