//! Source resolver
//!
//! Turns a `MediaReference` into a `ResolvedSource`. Absolute URIs resolve
//! synchronously as identity; storage-relative paths spawn one signed-URL
//! lookup whose result is posted back to the session loop as a `Resolution`.
//!
//! Cancellation is by generation: every `resolve` and `invalidate` bumps the
//! counter, and `accept` drops any result tagged with an older generation.
//! The underlying network request is never aborted; a superseded result is
//! simply discarded without touching state.

use super::reference::{MediaReference, ResolvedSource};
use crate::error::ResolutionError;
use crate::remote::{LessonContext, SignedUrlProvider};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Which slot a resolution belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTarget {
    /// The lesson video itself
    Media,
    /// Poster/thumbnail shown until the first frame loads
    Poster,
}

/// A settled lookup, tagged with the generation that started it
#[derive(Debug)]
pub struct Resolution {
    pub target: ResolveTarget,
    pub generation: u64,
    pub outcome: Result<ResolvedSource, ResolutionError>,
}

/// Result of starting a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Identity resolution, available immediately
    Resolved(ResolvedSource),
    /// Lookup in flight; a `Resolution` with this generation will follow
    Pending { generation: u64 },
}

/// Per-session resolver for one target slot
pub struct SourceResolver {
    target: ResolveTarget,
    provider: Arc<dyn SignedUrlProvider>,
    lesson: LessonContext,
    generation: u64,
}

impl SourceResolver {
    pub fn new(
        target: ResolveTarget,
        provider: Arc<dyn SignedUrlProvider>,
        lesson: LessonContext,
    ) -> Self {
        Self {
            target,
            provider,
            lesson,
            generation: 0,
        }
    }

    /// Start resolving `reference`, superseding any lookup in flight
    ///
    /// Must be called from within a tokio runtime when the reference needs
    /// signing.
    pub fn resolve(
        &mut self,
        reference: &MediaReference,
        results: &mpsc::UnboundedSender<Resolution>,
    ) -> ResolveOutcome {
        self.generation += 1;
        let generation = self.generation;

        match reference {
            MediaReference::LocalAbsoluteUri { uri }
            | MediaReference::RemoteAbsoluteUri { uri } => {
                let source = ResolvedSource::new(reference.clone(), uri.clone());
                debug!(target_slot = ?self.target, generation, uri = %uri, "Resolved by identity");
                ResolveOutcome::Resolved(source)
            }
            MediaReference::StorageRelativePath {
                path,
                variant_index,
            } => {
                let request = self.lesson.signed_url_request(path, *variant_index);
                let provider = Arc::clone(&self.provider);
                let results = results.clone();
                let reference = reference.clone();
                let target = self.target;

                debug!(target_slot = ?target, generation, path = %path, "Requesting signed URL");
                tokio::spawn(async move {
                    let outcome = provider
                        .signed_url(&request)
                        .await
                        .map(|uri| ResolvedSource::new(reference, uri));
                    // Session may already be gone; nothing to do then
                    let _ = results.send(Resolution {
                        target,
                        generation,
                        outcome,
                    });
                });

                ResolveOutcome::Pending { generation }
            }
        }
    }

    /// Apply a settled lookup
    ///
    /// Returns `None` when the result is stale (superseded or invalidated).
    pub fn accept(
        &mut self,
        resolution: Resolution,
    ) -> Option<Result<ResolvedSource, ResolutionError>> {
        if resolution.target != self.target || resolution.generation != self.generation {
            debug!(
                target_slot = ?resolution.target,
                stale_generation = resolution.generation,
                current_generation = self.generation,
                "Dropping stale resolution"
            );
            return None;
        }
        Some(resolution.outcome)
    }

    /// Orphan any lookup in flight
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::SignedUrlRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Signs paths as `https://signed.example/{path}` after a per-path delay
    struct DelayedSigner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SignedUrlProvider for DelayedSigner {
        async fn signed_url(
            &self,
            request: &SignedUrlRequest,
        ) -> Result<String, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = if request.path.starts_with("slow") { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if request.path.starts_with("missing") {
                return Err(ResolutionError::NotFound(request.path.clone()));
            }
            Ok(format!("https://signed.example/{}", request.path))
        }
    }

    fn resolver() -> (SourceResolver, Arc<DelayedSigner>) {
        let signer = Arc::new(DelayedSigner {
            calls: AtomicUsize::new(0),
        });
        let resolver = SourceResolver::new(
            ResolveTarget::Media,
            signer.clone(),
            LessonContext::new("c1", "Physics", 1),
        );
        (resolver, signer)
    }

    fn storage(path: &str) -> MediaReference {
        MediaReference::StorageRelativePath {
            path: path.to_string(),
            variant_index: 0,
        }
    }

    #[tokio::test]
    async fn test_remote_uri_resolves_immediately_without_network() {
        let (mut resolver, signer) = resolver();
        let (tx, _rx) = mpsc::unbounded_channel();
        let reference = MediaReference::RemoteAbsoluteUri {
            uri: "https://cdn.example/a.mp4".to_string(),
        };

        match resolver.resolve(&reference, &tx) {
            ResolveOutcome::Resolved(source) => assert_eq!(source.uri, "https://cdn.example/a.mp4"),
            other => panic!("Expected identity resolution, got {:?}", other),
        }
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_reference_wins_even_if_earlier_settles_last() {
        let (mut resolver, _) = resolver();
        let (tx, mut rx) = mpsc::unbounded_channel();

        resolver.resolve(&storage("slow/a.mp4"), &tx);
        resolver.resolve(&storage("fast/b.mp4"), &tx);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();

        let applied: Vec<_> = [first, second]
            .into_iter()
            .filter_map(|r| resolver.accept(r))
            .collect();

        assert_eq!(applied.len(), 1);
        assert_eq!(
            applied[0].as_ref().unwrap().uri,
            "https://signed.example/fast/b.mp4"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_orphans_pending_lookup() {
        let (mut resolver, _) = resolver();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = resolver.resolve(&storage("fast/a.mp4"), &tx);
        assert!(matches!(outcome, ResolveOutcome::Pending { generation: 1 }));
        resolver.invalidate();

        let late = rx.recv().await.unwrap();
        assert!(resolver.accept(late).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_surfaced_for_current_generation() {
        let (mut resolver, _) = resolver();
        let (tx, mut rx) = mpsc::unbounded_channel();

        resolver.resolve(&storage("missing/a.mp4"), &tx);
        let result = resolver.accept(rx.recv().await.unwrap());

        assert_eq!(
            result,
            Some(Err(ResolutionError::NotFound("missing/a.mp4".to_string())))
        );
    }
}
