use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use crate::core::RecommenderConfig;
use crate::models::RankingStrategy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_listings_table")]
    pub listings_table: String,
    #[serde(default = "default_reviews_table")]
    pub reviews_table: String,
    pub timeout_secs: Option<u64>,
}

fn default_listings_table() -> String { "pg_whole_info".to_string() }
fn default_reviews_table() -> String { "reviews".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
    #[serde(default = "default_similarity_margin")]
    pub similarity_rating_margin: f64,
    /// Rating margin for tag-overlap ranking; omit to disable
    #[serde(default = "default_tag_overlap_margin")]
    pub tag_overlap_rating_margin: Option<f64>,
    #[serde(default = "default_similarity_top_n")]
    pub similarity_top_n: usize,
    #[serde(default = "default_tag_overlap_top_n")]
    pub tag_overlap_top_n: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_strategy: default_strategy(),
            similarity_rating_margin: default_similarity_margin(),
            tag_overlap_rating_margin: default_tag_overlap_margin(),
            similarity_top_n: default_similarity_top_n(),
            tag_overlap_top_n: default_tag_overlap_top_n(),
            max_limit: default_max_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_strategy() -> String { "tag_overlap".to_string() }
fn default_similarity_margin() -> f64 { 0.45 }
fn default_tag_overlap_margin() -> Option<f64> { Some(0.5) }
fn default_similarity_top_n() -> usize { 3 }
fn default_tag_overlap_top_n() -> usize { 6 }
fn default_max_limit() -> usize { 50 }
fn default_request_timeout_secs() -> u64 { 10 }

impl RecommendationSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Engine configuration; an unknown strategy name falls back to tag overlap
    pub fn to_recommender_config(&self) -> RecommenderConfig {
        let default_strategy = self.default_strategy.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using tag_overlap", e);
            RankingStrategy::TagOverlap
        });

        RecommenderConfig {
            default_strategy,
            similarity_rating_margin: self.similarity_rating_margin,
            tag_overlap_rating_margin: self.tag_overlap_rating_margin,
            similarity_top_n: self.similarity_top_n,
            tag_overlap_top_n: self.tag_overlap_top_n,
            max_top_n: self.max_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Snapshot cache is off unless enabled
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with PGREC__)
    /// 4. SUPABASE_URL / SUPABASE_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., PGREC__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PGREC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_store_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PGREC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Override store settings from the conventional Supabase variables
fn apply_store_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Ok(api_key) = env::var("SUPABASE_API_KEY") {
        builder = builder.set_override("supabase.api_key", api_key)?;
    }

    builder.build()
}
