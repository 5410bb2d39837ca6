//! Signed URL client
//!
//! Asks the course backend for a time-limited URL for a storage-relative
//! media object.
//!
//! # API
//! - Endpoint: `GET {base}/courses/{course}/subjects/{subject}/modules/{module}/videos/{variant}/signed-url?path={path}`
//! - Response: `{"url": "https://...", "expiresAt": "..."}`
//! - 401/403 -> `Unauthorized`, 404 -> `NotFound`, anything else -> `NetworkFailure`

use super::{SignedUrlProvider, SignedUrlRequest};
use crate::error::{Error, ResolutionError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedUrlResponse {
    #[serde(alias = "signedUrl")]
    url: String,
    #[serde(default)]
    expires_at: Option<String>,
}

/// HTTP signed-URL provider
pub struct SignedUrlClient {
    http_client: Client,
    base_url: Url,
}

impl SignedUrlClient {
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

    fn endpoint(&self, request: &SignedUrlRequest) -> std::result::Result<Url, ResolutionError> {
        let mut url = self.base_url.clone();
        let module = request.module_number.to_string();
        let variant = request.variant_index.to_string();
        url.path_segments_mut()
            .map_err(|_| {
                ResolutionError::NetworkFailure(format!(
                    "base url {} cannot hold a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "courses",
                request.course_id.as_str(),
                "subjects",
                request.subject_name.as_str(),
                "modules",
                module.as_str(),
                "videos",
                variant.as_str(),
                "signed-url",
            ]);
        url.query_pairs_mut().append_pair("path", &request.path);
        Ok(url)
    }
}

#[async_trait]
impl SignedUrlProvider for SignedUrlClient {
    async fn signed_url(
        &self,
        request: &SignedUrlRequest,
    ) -> std::result::Result<String, ResolutionError> {
        let url = self.endpoint(request)?;
        debug!(path = %request.path, variant = request.variant_index, "Requesting signed URL");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolutionError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::from_status(status, &request.path));
        }

        let body: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| {
                ResolutionError::NetworkFailure(format!("malformed signed-url response: {}", e))
            })?;

        if body.url.is_empty() {
            return Err(ResolutionError::NotFound(request.path.clone()));
        }

        debug!(expires_at = ?body.expires_at, "Signed URL issued");
        Ok(body.url)
    }
}
