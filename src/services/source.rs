use crate::models::{Corpus, Listing};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when loading listing data
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

/// Read access to listings and their review comments
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, SourceError>;

    /// Review comments keyed by listing id
    async fn fetch_review_comments(&self) -> Result<HashMap<String, Vec<String>>, SourceError>;

    /// Fetch both collections and assemble a snapshot
    async fn load_corpus(&self) -> Result<Arc<Corpus>, SourceError> {
        let (listings, comments) =
            tokio::try_join!(self.fetch_listings(), self.fetch_review_comments())?;

        tracing::debug!(
            "Loaded {} listings with comments for {} of them",
            listings.len(),
            comments.len()
        );

        Ok(Arc::new(Corpus::from_parts(listings, comments)))
    }
}

/// In-memory snapshot, injected directly
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    listings: Vec<Listing>,
    comments: HashMap<String, Vec<String>>,
}

impl StaticSource {
    pub fn new(listings: Vec<Listing>, comments: HashMap<String, Vec<String>>) -> Self {
        Self { listings, comments }
    }

    pub fn from_listings(listings: Vec<Listing>) -> Self {
        Self::new(listings, HashMap::new())
    }
}

#[async_trait]
impl CorpusSource for StaticSource {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, SourceError> {
        Ok(self.listings.clone())
    }

    async fn fetch_review_comments(&self) -> Result<HashMap<String, Vec<String>>, SourceError> {
        Ok(self.comments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_attaches_comments() {
        let mut comments = HashMap::new();
        comments.insert("1".to_string(), vec!["clean".to_string(), "quiet".to_string()]);

        let source = StaticSource::new(vec![Listing::new("1", "A"), Listing::new("2", "B")], comments);
        let corpus = source.load_corpus().await.unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.listings()[0].review_text, "clean quiet");
        assert!(corpus.listings()[1].review_text.is_empty());
    }
}
