use serde::{Deserialize, Serialize};
use crate::models::domain::{ListingSummary, RankingStrategy};

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<ListingSummary>,
    pub strategy: RankingStrategy,
    pub total_candidates: usize,
}

impl RecommendResponse {
    pub fn empty(strategy: RankingStrategy) -> Self {
        Self {
            recommendations: vec![],
            strategy,
            total_candidates: 0,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
