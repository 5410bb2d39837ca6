//! Logical media references
//!
//! A `MediaReference` describes *what* to play before it is turned into a
//! concrete URI. References are immutable values; resolution is keyed by
//! equality, so swapping in an equal reference is a no-op for callers that
//! compare before re-resolving.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What to play, prior to resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaReference {
    /// `file://` URI or absolute filesystem path; plays as-is
    LocalAbsoluteUri { uri: String },

    /// `http(s)://` URI; plays as-is
    RemoteAbsoluteUri { uri: String },

    /// Object path in course storage; needs a signed URL before playback
    StorageRelativePath {
        path: String,
        /// Which encoded variant of the module video to request
        variant_index: u32,
    },
}

impl MediaReference {
    /// Classify a raw reference string
    ///
    /// - `http://` / `https://` -> remote URI
    /// - `file://` or a leading `/` -> local URI
    /// - anything else -> storage-relative path
    pub fn parse(raw: &str, variant_index: u32) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidReference("empty media reference".to_string()));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(MediaReference::RemoteAbsoluteUri {
                uri: raw.to_string(),
            })
        } else if lower.starts_with("file://") {
            Ok(MediaReference::LocalAbsoluteUri {
                uri: raw.to_string(),
            })
        } else if raw.starts_with('/') {
            Ok(MediaReference::LocalAbsoluteUri {
                uri: format!("file://{}", raw),
            })
        } else if raw.contains("://") {
            Err(Error::InvalidReference(format!(
                "unsupported scheme in {:?}",
                raw
            )))
        } else {
            Ok(MediaReference::StorageRelativePath {
                path: raw.to_string(),
                variant_index,
            })
        }
    }

    /// Human-readable form for logs
    pub fn describe(&self) -> &str {
        match self {
            MediaReference::LocalAbsoluteUri { uri }
            | MediaReference::RemoteAbsoluteUri { uri } => uri,
            MediaReference::StorageRelativePath { path, .. } => path,
        }
    }
}

/// A reference resolved to a playable URI
///
/// Signed URLs are time-limited; a `ResolvedSource` lives only as long as the
/// session that resolved it and is dropped on failure, retry or unmount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub reference: MediaReference,
    pub uri: String,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedSource {
    pub fn new(reference: MediaReference, uri: impl Into<String>) -> Self {
        Self {
            reference,
            uri: uri.into(),
            resolved_at: lesson_common::time::now(),
        }
    }
}
