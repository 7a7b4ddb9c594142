use crate::models::{Corpus, Listing};
use std::collections::BTreeSet;

/// Text document and structured attributes derived from one listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFeatures {
    /// Lower-cased document: tags, gender policy, group, review text
    pub document: String,
    /// Normalized tag set used for overlap ranking
    pub tags: BTreeSet<String>,
}

/// Build the combined text document for a listing
///
/// Fields are concatenated in a fixed order (tags, gender policy, group
/// label, review text) separated by single spaces, then lower-cased.
/// Missing fields contribute an empty string.
pub fn build_document(listing: &Listing) -> String {
    let tags = listing.tags.join(" ");
    let gender = listing.gender_policy.map(|g| g.as_str()).unwrap_or("");

    format!(
        "{} {} {} {}",
        tags,
        gender,
        listing.group_label(),
        listing.review_text
    )
    .to_lowercase()
}

/// Trimmed, lower-cased, de-duplicated tags
pub fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[inline]
pub fn build_features(listing: &Listing) -> ListingFeatures {
    ListingFeatures {
        document: build_document(listing),
        tags: normalize_tags(&listing.tags),
    }
}

/// Features for every listing, in corpus order
pub fn build_corpus_features(corpus: &Corpus) -> Vec<ListingFeatures> {
    corpus.listings().iter().map(build_features).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderPolicy;

    fn create_listing() -> Listing {
        Listing {
            id: "1".to_string(),
            name: "Sunrise PG".to_string(),
            group_id: Some("7".to_string()),
            college_name: Some("COEP".to_string()),
            city: Some("Pune".to_string()),
            gender_policy: Some(GenderPolicy::Female),
            tags: vec!["WiFi".to_string(), "Quiet".to_string()],
            rating: Some(4.2),
            image: None,
            location: None,
            review_text: "Great Food".to_string(),
        }
    }

    #[test]
    fn test_document_field_order() {
        let doc = build_document(&create_listing());
        assert_eq!(doc, "wifi quiet girls only coep great food");
    }

    #[test]
    fn test_document_missing_fields() {
        let mut listing = create_listing();
        listing.tags.clear();
        listing.gender_policy = None;
        listing.college_name = None;
        listing.group_id = None;
        listing.review_text.clear();

        let doc = build_document(&listing);
        assert!(doc.trim().is_empty());
    }

    #[test]
    fn test_group_falls_back_to_id() {
        let mut listing = create_listing();
        listing.college_name = None;

        assert!(build_document(&listing).contains(" 7 "));
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" WiFi".to_string(), "wifi".to_string(), "".to_string(), "AC".to_string()];
        let set = normalize_tags(&tags);

        assert_eq!(set.len(), 2);
        assert!(set.contains("wifi"));
        assert!(set.contains("ac"));
    }
}
