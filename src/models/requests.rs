use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    /// Listing name or id to recommend from
    #[serde(alias = "name", default)]
    pub pg: Option<String>,
    /// Upper bound comes from configuration and is checked by the handler
    #[validate(range(min = 1))]
    #[serde(alias = "top_n", default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub strategy: Option<String>,
}
