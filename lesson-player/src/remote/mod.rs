//! Remote collaborators: signed-URL lookup and module progress persistence
//!
//! Both collaborators are traits so embedders (and tests) can substitute
//! their own transport. The HTTP implementations talk to the course backend.

pub mod progress_client;
pub mod signed_url_client;

pub use progress_client::ProgressClient;
pub use signed_url_client::SignedUrlClient;

use crate::error::{ResolutionError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which lesson module a player session is showing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonContext {
    pub course_id: String,
    pub subject_name: String,
    pub module_number: u32,
}

impl LessonContext {
    pub fn new(
        course_id: impl Into<String>,
        subject_name: impl Into<String>,
        module_number: u32,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            subject_name: subject_name.into(),
            module_number,
        }
    }

    /// Key for the completion upsert
    pub fn progress_key(&self) -> ProgressKey {
        ProgressKey {
            course_id: self.course_id.clone(),
            module_number: self.module_number,
        }
    }

    /// Signed-URL request for a storage object of this module
    pub fn signed_url_request(&self, path: &str, variant_index: u32) -> SignedUrlRequest {
        SignedUrlRequest {
            course_id: self.course_id.clone(),
            subject_name: self.subject_name.clone(),
            module_number: self.module_number,
            variant_index,
            path: path.to_string(),
        }
    }
}

/// Signed-URL lookup key: `(course, subject, module, variant)` plus object path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedUrlRequest {
    pub course_id: String,
    pub subject_name: String,
    pub module_number: u32,
    pub variant_index: u32,
    pub path: String,
}

/// Completion upsert key: `(course, module)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub course_id: String,
    pub module_number: u32,
}

/// Turns a storage-relative object into a time-limited signed URL
///
/// The returned URL is opaque; callers never cache it beyond the session.
#[async_trait]
pub trait SignedUrlProvider: Send + Sync {
    async fn signed_url(
        &self,
        request: &SignedUrlRequest,
    ) -> std::result::Result<String, ResolutionError>;
}

/// Persists module progress
///
/// `mark_video_completed` must be an idempotent upsert: aggregate percentages
/// are derived by the backend, never by the player.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn mark_video_completed(&self, key: &ProgressKey) -> Result<()>;
}
