//! PG Recommender - content-based similar-listing recommendations
//!
//! This library recommends shared-housing listings ("PGs") similar to one a
//! user is viewing. A recommendation is a pure function of a corpus snapshot,
//! the query listing and the ranking options: listings are turned into text
//! documents, filtered by hard constraints and ranked by TF-IDF cosine
//! similarity or by shared tags.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, RecommenderConfig, RecommendationResult, TfidfModel};
pub use crate::models::{Corpus, Listing, GenderPolicy, ListingSummary, RankingStrategy, RecommendOptions};
pub use crate::services::{CorpusSource, SourceError, StaticSource};
