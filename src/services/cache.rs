use crate::models::{Corpus, Listing};
use crate::services::source::{CorpusSource, SourceError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const SNAPSHOT_KEY: &str = "corpus";

/// Corpus source wrapper that keeps the last snapshot for a TTL
///
/// The engine itself never caches; this sits in front of a source and can
/// be dropped without touching the recommendation core.
pub struct CachedSource<S> {
    inner: S,
    snapshots: moka::future::Cache<&'static str, Arc<Corpus>>,
}

impl<S: CorpusSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        let snapshots = moka::future::CacheBuilder::new(1).time_to_live(ttl).build();
        Self { inner, snapshots }
    }

    /// Drop the cached snapshot so the next load refetches
    pub async fn invalidate(&self) {
        self.snapshots.invalidate(SNAPSHOT_KEY).await;
        tracing::debug!("Invalidated corpus snapshot");
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CorpusSource> CorpusSource for CachedSource<S> {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, SourceError> {
        self.inner.fetch_listings().await
    }

    async fn fetch_review_comments(&self) -> Result<HashMap<String, Vec<String>>, SourceError> {
        self.inner.fetch_review_comments().await
    }

    /// Concurrent misses share a single load of the inner source
    async fn load_corpus(&self) -> Result<Arc<Corpus>, SourceError> {
        self.snapshots
            .try_get_with(SNAPSHOT_KEY, self.inner.load_corpus())
            .await
            .map_err(|e| {
                Arc::try_unwrap(e).unwrap_or_else(|shared| SourceError::Unavailable(shared.to_string()))
            })
    }
}
