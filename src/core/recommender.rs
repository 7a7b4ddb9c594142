use crate::core::{
    features::build_corpus_features,
    filters::CandidateFilter,
    ranker::{rank_by_similarity, rank_by_tag_overlap, RankedCandidate},
    vectorizer::TfidfModel,
};
use crate::models::domain::{DEFAULT_SIMILARITY_MARGIN, DEFAULT_TAG_OVERLAP_MARGIN};
use crate::models::{Corpus, ListingSummary, RankingStrategy, RecommendOptions};
use crate::services::{CorpusSource, SourceError};
use thiserror::Error;

/// Reasons a recommendation could not be produced
///
/// These never reach callers of [`Recommender::recommend`]; they collapse to
/// an empty result there.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Listing not found: {0}")]
    NotFound(String),

    #[error("Listing data unavailable: {0}")]
    DataUnavailable(#[from] SourceError),
}

/// Ranked recommendations for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationResult {
    pub recommendations: Vec<ListingSummary>,
    /// Candidates left after filtering, before truncation
    pub total_candidates: usize,
}

impl RecommendationResult {
    pub fn names(&self) -> Vec<&str> {
        self.recommendations.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Engine tuning shared by every request
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    pub default_strategy: RankingStrategy,
    pub similarity_rating_margin: f64,
    pub tag_overlap_rating_margin: Option<f64>,
    pub similarity_top_n: usize,
    pub tag_overlap_top_n: usize,
    pub max_top_n: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            default_strategy: RankingStrategy::TagOverlap,
            similarity_rating_margin: DEFAULT_SIMILARITY_MARGIN,
            tag_overlap_rating_margin: Some(DEFAULT_TAG_OVERLAP_MARGIN),
            similarity_top_n: RankingStrategy::Similarity.default_top_n(),
            tag_overlap_top_n: RankingStrategy::TagOverlap.default_top_n(),
            max_top_n: 50,
        }
    }
}

/// Recommendation facade
///
/// # Pipeline Stages
/// 1. Resolve the query listing by name, then id
/// 2. Build per-listing documents and tag sets
/// 3. Fit TF-IDF (similarity strategy only)
/// 4. Candidate filtering
/// 5. Ranking and truncation
///
/// Holds no corpus state: every call works on the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Options for a strategy, filling gaps from the configuration
    pub fn options(&self, strategy: Option<RankingStrategy>, top_n: Option<usize>) -> RecommendOptions {
        let strategy = strategy.unwrap_or(self.config.default_strategy);
        let (default_top_n, margin) = match strategy {
            RankingStrategy::Similarity => (
                self.config.similarity_top_n,
                Some(self.config.similarity_rating_margin),
            ),
            RankingStrategy::TagOverlap => {
                (self.config.tag_overlap_top_n, self.config.tag_overlap_rating_margin)
            }
        };

        RecommendOptions {
            strategy,
            top_n: top_n.unwrap_or(default_top_n).min(self.config.max_top_n),
            rating_margin: margin,
        }
    }

    /// Recommend listings similar to `key`; empty when none are available
    pub fn recommend(&self, corpus: &Corpus, key: &str, options: &RecommendOptions) -> RecommendationResult {
        match self.try_recommend(corpus, key, options) {
            Ok(result) => result,
            Err(e) => {
                tracing::info!("No recommendations for '{}': {}", key, e);
                RecommendationResult::default()
            }
        }
    }

    /// Like [`recommend`](Self::recommend), but reports why nothing was produced
    pub fn try_recommend(
        &self,
        corpus: &Corpus,
        key: &str,
        options: &RecommendOptions,
    ) -> Result<RecommendationResult, RecommendError> {
        let query_index = corpus
            .resolve(key)
            .ok_or_else(|| RecommendError::NotFound(key.to_string()))?;

        let features = build_corpus_features(corpus);
        let candidates = CandidateFilter::new(options.rating_margin).apply(corpus, query_index);

        tracing::debug!(
            "{} of {} listings passed filtering for '{}'",
            candidates.len(),
            corpus.len(),
            key
        );

        let ranked: Vec<RankedCandidate> = match options.strategy {
            RankingStrategy::Similarity => {
                let documents: Vec<&str> = features.iter().map(|f| f.document.as_str()).collect();
                let model = TfidfModel::fit(&documents);
                let row = model.similarity_row(query_index);
                rank_by_similarity(&row, query_index, &candidates, options.top_n)
            }
            RankingStrategy::TagOverlap => {
                rank_by_tag_overlap(&features, query_index, &candidates, options.top_n)
            }
        };

        let recommendations = ranked
            .iter()
            .filter_map(|r| {
                corpus
                    .get(r.index)
                    .map(|listing| ListingSummary::from_listing(listing, r.score))
            })
            .collect();

        Ok(RecommendationResult {
            recommendations,
            total_candidates: candidates.len(),
        })
    }

    /// Load a fresh snapshot from `source` and recommend from it
    ///
    /// Source failures are logged and yield an empty result. Fitting and
    /// ranking run on the blocking pool, so a caller-side timeout around this
    /// future also bounds the CPU stage.
    pub async fn recommend_from<S>(&self, source: &S, key: &str, options: &RecommendOptions) -> RecommendationResult
    where
        S: CorpusSource + ?Sized,
    {
        let corpus = match source.load_corpus().await {
            Ok(corpus) => corpus,
            Err(e) => {
                let e = RecommendError::from(e);
                tracing::error!("Cannot recommend for '{}': {}", key, e);
                return RecommendationResult::default();
            }
        };

        let recommender = self.clone();
        let query = key.to_string();
        let options = *options;

        match tokio::task::spawn_blocking(move || recommender.recommend(&corpus, &query, &options)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Recommendation task for '{}' failed: {}", key, e);
                RecommendationResult::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;

    fn create_corpus() -> Corpus {
        Corpus::new(vec![
            Listing::new("1", "A").with_group("1").with_rating(4.0).with_tags(&["quiet", "wifi"]),
            Listing::new("2", "B").with_group("1").with_rating(4.2).with_tags(&["wifi"]),
            Listing::new("3", "C").with_group("2").with_rating(4.1).with_tags(&["wifi", "quiet"]),
        ])
    }

    #[test]
    fn test_options_defaults() {
        let recommender = Recommender::default();

        let similarity = recommender.options(Some(RankingStrategy::Similarity), None);
        assert_eq!(similarity.top_n, 3);
        assert_eq!(similarity.rating_margin, Some(0.45));

        let tags = recommender.options(None, Some(500));
        assert_eq!(tags.strategy, RankingStrategy::TagOverlap);
        assert_eq!(tags.top_n, 50);
        assert_eq!(tags.rating_margin, Some(0.5));
    }

    #[test]
    fn test_similarity_mode_scenario() {
        let recommender = Recommender::default();
        let options = RecommendOptions::similarity(3, 0.45);

        let result = recommender.recommend(&create_corpus(), "A", &options);
        assert_eq!(result.names(), vec!["B"]);
        assert_eq!(result.total_candidates, 1);
    }

    #[test]
    fn test_tag_overlap_scenario() {
        let recommender = Recommender::default();
        let options = RecommendOptions::tag_overlap(1);

        let result = recommender.recommend(&create_corpus(), "A", &options);
        assert_eq!(result.names(), vec!["B"]);
        assert_eq!(result.recommendations[0].score, 1.0);
    }

    #[test]
    fn test_not_found() {
        let recommender = Recommender::default();
        let options = RecommendOptions::tag_overlap(6);

        assert!(recommender.recommend(&create_corpus(), "Z", &options).recommendations.is_empty());
        assert!(matches!(
            recommender.try_recommend(&create_corpus(), "Z", &options),
            Err(RecommendError::NotFound(_))
        ));
    }

    #[test]
    fn test_lookup_by_id() {
        let recommender = Recommender::default();
        let options = RecommendOptions::tag_overlap(6);

        let result = recommender.recommend(&create_corpus(), "1", &options);
        assert_eq!(result.names(), vec!["B"]);
    }
}
