use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Shared-housing listing ("PG") with the attributes used for recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ListingRow")]
pub struct Listing {
    pub id: String,
    pub name: String,
    #[serde(rename = "college_id")]
    pub group_id: Option<String>,
    pub college_name: Option<String>,
    #[serde(rename = "college_city")]
    pub city: Option<String>,
    #[serde(rename = "gender_type")]
    pub gender_policy: Option<GenderPolicy>,
    pub tags: Vec<String>,
    pub rating: Option<f64>,
    pub image: Option<String>,
    pub location: Option<String>,
    /// Aggregated review comments, filled in when the corpus is assembled
    #[serde(skip_serializing)]
    pub review_text: String,
}

/// Listing row as stored, from either the `pgs` table or the `pg_whole_info` view
#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    name: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    college_id: Option<String>,
    #[serde(default)]
    college_name: Option<String>,
    #[serde(default)]
    college_city: Option<String>,
    #[serde(default, deserialize_with = "deserialize_gender")]
    gender_type: Option<GenderPolicy>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    tags: Vec<String>,
    #[serde(default)]
    rating: Option<f64>,
    /// Review average computed by the view; preferred over `rating`
    #[serde(default)]
    avg_rating: Option<f64>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            group_id: row.college_id,
            college_name: row.college_name,
            city: row.college_city,
            gender_policy: row.gender_type,
            tags: row.tags,
            rating: row.avg_rating.or(row.rating),
            image: row.image,
            location: row.location,
            review_text: String::new(),
        }
    }
}

impl Listing {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group_id: None,
            college_name: None,
            city: None,
            gender_policy: None,
            tags: vec![],
            rating: None,
            image: None,
            location: None,
            review_text: String::new(),
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_gender_policy(mut self, policy: GenderPolicy) -> Self {
        self.gender_policy = Some(policy);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_review_text(mut self, text: impl Into<String>) -> Self {
        self.review_text = text.into();
        self
    }

    /// Label used for the group in the text document: college name, else group id
    pub fn group_label(&self) -> &str {
        self.college_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.group_id.as_deref())
            .unwrap_or("")
    }

    /// Rating with NaN treated as unknown
    pub fn known_rating(&self) -> Option<f64> {
        self.rating.filter(|r| r.is_finite())
    }
}

/// Gender admission policy of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderPolicy {
    #[serde(rename = "Boys Only")]
    Male,
    #[serde(rename = "Girls Only")]
    Female,
    #[serde(rename = "Co-ed")]
    Any,
}

impl GenderPolicy {
    /// Label as stored in the listing store
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderPolicy::Male => "Boys Only",
            GenderPolicy::Female => "Girls Only",
            GenderPolicy::Any => "Co-ed",
        }
    }
}

impl fmt::Display for GenderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boys only" | "boys" | "male" | "men" => Ok(GenderPolicy::Male),
            "girls only" | "girls" | "female" | "women" => Ok(GenderPolicy::Female),
            "co-ed" | "coed" | "any" | "mixed" | "unisex" => Ok(GenderPolicy::Any),
            other => Err(format!("unknown gender policy: {}", other)),
        }
    }
}

/// Ranking strategy selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
    /// Cosine similarity of TF-IDF documents, with rating proximity
    Similarity,
    /// Count of shared tags
    #[default]
    TagOverlap,
}

impl RankingStrategy {
    /// Default result count for the strategy
    pub fn default_top_n(&self) -> usize {
        match self {
            RankingStrategy::Similarity => 3,
            RankingStrategy::TagOverlap => 6,
        }
    }
}

impl FromStr for RankingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "similarity" | "cosine" => Ok(RankingStrategy::Similarity),
            "tag_overlap" | "tags" => Ok(RankingStrategy::TagOverlap),
            other => Err(format!("unknown ranking strategy: {}", other)),
        }
    }
}

/// Rating margin applied in similarity mode unless overridden
pub const DEFAULT_SIMILARITY_MARGIN: f64 = 0.45;

/// Rating margin applied in tag-overlap mode unless overridden
pub const DEFAULT_TAG_OVERLAP_MARGIN: f64 = 0.5;

/// Per-call recommendation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendOptions {
    pub strategy: RankingStrategy,
    pub top_n: usize,
    /// Maximum rating distance; `None` disables rating-proximity filtering
    pub rating_margin: Option<f64>,
}

impl RecommendOptions {
    pub fn similarity(top_n: usize, rating_margin: f64) -> Self {
        Self {
            strategy: RankingStrategy::Similarity,
            top_n,
            rating_margin: Some(rating_margin),
        }
    }

    /// Tag-overlap ranking within [`DEFAULT_TAG_OVERLAP_MARGIN`] of the query
    /// rating; chain `with_rating_margin(None)` to drop the rating rule
    pub fn tag_overlap(top_n: usize) -> Self {
        Self {
            strategy: RankingStrategy::TagOverlap,
            top_n,
            rating_margin: Some(DEFAULT_TAG_OVERLAP_MARGIN),
        }
    }

    pub fn with_rating_margin(mut self, margin: Option<f64>) -> Self {
        self.rating_margin = margin;
        self
    }
}

/// Projected recommendation returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub score: f64,
}

impl ListingSummary {
    pub fn from_listing(listing: &Listing, score: f64) -> Self {
        Self {
            id: listing.id.clone(),
            name: listing.name.clone(),
            tags: listing.tags.clone(),
            image: listing.image.clone(),
            location: listing.location.clone(),
            rating: listing.known_rating(),
            score,
        }
    }
}

pub(crate) fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Store ids arrive as numbers or strings
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(value).ok_or_else(|| serde::de::Error::custom("id must be a string or number"))
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_id(Value::deserialize(deserializer)?))
}

fn deserialize_gender<'de, D>(deserializer: D) -> Result<Option<GenderPolicy>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(policy) => Some(policy),
        Err(e) => {
            if !s.trim().is_empty() {
                tracing::debug!("Treating gender policy as unset: {}", e);
            }
            None
        }
    }))
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(tags.unwrap_or_default().into_iter().flatten().collect())
}
