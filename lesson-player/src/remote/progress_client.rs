//! Module progress client
//!
//! Upserts `{videoCompleted: true}` for a `(course, module)` pair. The call is
//! idempotent on the backend, so repeating it is harmless; the player still
//! sends it at most once per mount.
//!
//! # API
//! - Endpoint: `PUT {base}/courses/{course}/modules/{module}/progress`
//! - Body: `{"videoCompleted": true}`

use super::{ProgressKey, ProgressStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressUpdate {
    video_completed: bool,
}

/// HTTP progress store
pub struct ProgressClient {
    http_client: Client,
    base_url: Url,
}

impl ProgressClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid api base url {:?}: {}", base_url, e)))?;
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, key: &ProgressKey) -> Result<Url> {
        let mut url = self.base_url.clone();
        let module = key.module_number.to_string();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend([
                "courses",
                key.course_id.as_str(),
                "modules",
                module.as_str(),
                "progress",
            ]);
        Ok(url)
    }
}

#[async_trait]
impl ProgressStore for ProgressClient {
    async fn mark_video_completed(&self, key: &ProgressKey) -> Result<()> {
        let url = self.endpoint(key)?;
        debug!(
            course_id = %key.course_id,
            module = key.module_number,
            "Persisting video completion"
        );

        let response = self
            .http_client
            .put(url)
            .json(&ProgressUpdate {
                video_completed: true,
            })
            .send()
            .await
            .map_err(|e| Error::ProgressPersistence(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::ProgressPersistence(format!(
                "backend rejected completion for {}/{}: {}",
                key.course_id, key.module_number, status
            )))
        }
    }
}
