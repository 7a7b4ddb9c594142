// Model exports
pub mod corpus;
pub mod domain;
pub mod requests;
pub mod responses;

pub use corpus::Corpus;
pub use domain::{Listing, GenderPolicy, ListingSummary, RankingStrategy, RecommendOptions};
pub use requests::RecommendRequest;
pub use responses::{RecommendResponse, HealthResponse, ErrorResponse};
