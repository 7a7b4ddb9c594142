use crate::models::domain::value_to_id;
use crate::models::Listing;
use crate::services::source::{CorpusSource, SourceError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Table names in the listing store
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub listings: String,
    pub reviews: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            listings: "pg_whole_info".to_string(),
            reviews: "reviews".to_string(),
        }
    }
}

/// Supabase REST client
///
/// Reads the listing and review tables that make up a corpus snapshot.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    tables: SupabaseTables,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            tables,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all rows of a table as a JSON array
    async fn fetch_rows(&self, table: &str, select: &str) -> Result<Vec<Value>, SourceError> {
        let url = format!(
            "{}/rest/v1/{}?select={}",
            self.base_url.trim_end_matches('/'),
            table,
            urlencoding::encode(select)
        );

        tracing::debug!("Fetching rows from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch {}: {} - {}", table, status, body);
            return Err(SourceError::ApiError(format!("Failed to fetch {}: {}", table, status)));
        }

        let json: Value = response.json().await?;

        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(SourceError::InvalidResponse(format!(
                "Expected an array of rows from {}",
                table
            ))),
        }
    }
}

#[async_trait]
impl CorpusSource for SupabaseClient {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, SourceError> {
        let rows = self.fetch_rows(&self.tables.listings, "*").await?;
        let total = rows.len();

        let listings: Vec<Listing> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Listing>(row) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::debug!("Skipping unparseable listing row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} listings ({} rows)", listings.len(), total);

        Ok(listings)
    }

    async fn fetch_review_comments(&self) -> Result<HashMap<String, Vec<String>>, SourceError> {
        let rows = self.fetch_rows(&self.tables.reviews, "pg_id,comment").await?;

        let mut comments: HashMap<String, Vec<String>> = HashMap::new();
        for mut row in rows {
            let Some(id) = row.get_mut("pg_id").map(Value::take).and_then(value_to_id) else {
                continue;
            };
            if let Some(Value::String(comment)) = row.get_mut("comment").map(Value::take) {
                comments.entry(id).or_default().push(comment);
            }
        }

        Ok(comments)
    }
}
