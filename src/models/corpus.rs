use crate::models::Listing;
use std::collections::HashMap;

/// Immutable per-request snapshot of all listings with their review text
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    listings: Vec<Listing>,
}

impl Corpus {
    /// Build a corpus from listings whose `review_text` is already populated
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Build a corpus and attach review comments keyed by listing id
    ///
    /// Comments are trimmed, empty ones dropped, and the rest joined by a
    /// single space. Listings without comments get empty review text.
    pub fn from_parts(mut listings: Vec<Listing>, comments: HashMap<String, Vec<String>>) -> Self {
        for listing in &mut listings {
            listing.review_text = comments
                .get(&listing.id)
                .map(|texts| aggregate_comments(texts))
                .unwrap_or_default();
        }

        Self { listings }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, index: usize) -> Option<&Listing> {
        self.listings.get(index)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Resolve a lookup key to a corpus position
    ///
    /// Names are matched first, then ids. When a name is not unique the
    /// first listing in corpus order wins.
    pub fn resolve(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        let mut by_name = self
            .listings
            .iter()
            .enumerate()
            .filter(|(_, l)| l.name == key)
            .map(|(i, _)| i);

        if let Some(first) = by_name.next() {
            let duplicates = by_name.count();
            if duplicates > 0 {
                tracing::warn!(
                    "Listing name '{}' is not unique ({} more matches), using first match",
                    key,
                    duplicates
                );
            }
            return Some(first);
        }

        self.listings.iter().position(|l| l.id == key)
    }
}

fn aggregate_comments(texts: &[String]) -> String {
    texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
