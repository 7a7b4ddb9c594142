// Core algorithm exports
pub mod features;
pub mod filters;
pub mod ranker;
pub mod recommender;
pub mod vectorizer;

pub use features::{build_corpus_features, build_document, build_features, normalize_tags, ListingFeatures};
pub use filters::{CandidateFilter, FilterRule};
pub use ranker::{rank_by_similarity, rank_by_tag_overlap, RankedCandidate};
pub use recommender::{RecommendError, RecommendationResult, Recommender, RecommenderConfig};
pub use vectorizer::{SimilarityMatrix, TfidfModel, ENGLISH_STOP_WORDS};
