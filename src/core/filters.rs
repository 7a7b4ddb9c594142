use crate::models::{Corpus, Listing};

/// Absorbs float representation error at the rating-margin boundary
const RATING_EPSILON: f64 = 1e-9;

/// Hard constraint applied to candidate listings
///
/// Rules run left-to-right. Each rule documents when it is skipped; a
/// skipped rule accepts every candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterRule {
    /// Drop the query listing itself. Never skipped.
    ExcludeQuery,
    /// Same group as the query, or same city when the query has no group.
    /// Skipped when the query has neither.
    SameLocality,
    /// Rating within the margin of the query rating. Skipped when the
    /// query rating is unknown; candidates with unknown rating fail.
    RatingWithin(f64),
    /// Same gender policy as the query. Skipped when the query policy is unset.
    SameGenderPolicy,
}

impl FilterRule {
    pub fn name(&self) -> &'static str {
        match self {
            FilterRule::ExcludeQuery => "exclude_query",
            FilterRule::SameLocality => "same_locality",
            FilterRule::RatingWithin(_) => "rating_within",
            FilterRule::SameGenderPolicy => "same_gender_policy",
        }
    }

    /// Whether the rule is skipped entirely for this query
    pub fn is_skipped(&self, query: &Listing) -> bool {
        match self {
            FilterRule::ExcludeQuery => false,
            FilterRule::SameLocality => query.group_id.is_none() && city_key(query).is_none(),
            FilterRule::RatingWithin(_) => query.known_rating().is_none(),
            FilterRule::SameGenderPolicy => query.gender_policy.is_none(),
        }
    }

    #[inline]
    pub fn accepts(
        &self,
        query: &Listing,
        query_index: usize,
        candidate: &Listing,
        candidate_index: usize,
    ) -> bool {
        match self {
            FilterRule::ExcludeQuery => {
                candidate_index != query_index && candidate.id != query.id
            }
            FilterRule::SameLocality => match (&query.group_id, city_key(query)) {
                (Some(group), _) => candidate.group_id.as_ref() == Some(group),
                (None, Some(city)) => city_key(candidate).as_deref() == Some(city.as_str()),
                (None, None) => true,
            },
            FilterRule::RatingWithin(margin) => match query.known_rating() {
                Some(target) => candidate
                    .known_rating()
                    .map(|r| (r - target).abs() <= margin + RATING_EPSILON)
                    .unwrap_or(false),
                None => true,
            },
            FilterRule::SameGenderPolicy => match query.gender_policy {
                Some(policy) => candidate.gender_policy == Some(policy),
                None => true,
            },
        }
    }
}

fn city_key(listing: &Listing) -> Option<String> {
    listing
        .city
        .as_deref()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
}

/// Ordered list of candidate constraints
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    rules: Vec<FilterRule>,
}

impl CandidateFilter {
    /// Standard rule order; `rating_margin` of `None` leaves out rating proximity
    pub fn new(rating_margin: Option<f64>) -> Self {
        let mut rules = vec![FilterRule::ExcludeQuery, FilterRule::SameLocality];
        if let Some(margin) = rating_margin {
            rules.push(FilterRule::RatingWithin(margin));
        }
        rules.push(FilterRule::SameGenderPolicy);
        Self { rules }
    }

    pub fn with_rules(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Corpus positions of listings passing every active rule, in corpus order
    ///
    /// An empty result is a valid outcome.
    pub fn apply(&self, corpus: &Corpus, query_index: usize) -> Vec<usize> {
        let Some(query) = corpus.get(query_index) else {
            return vec![];
        };

        let active: Vec<&FilterRule> = self
            .rules
            .iter()
            .filter(|rule| {
                let skipped = rule.is_skipped(query);
                if skipped {
                    tracing::debug!("Skipping filter rule {} for '{}'", rule.name(), query.name);
                }
                !skipped
            })
            .collect();

        corpus
            .listings()
            .iter()
            .enumerate()
            .filter(|(index, candidate)| {
                active
                    .iter()
                    .all(|rule| rule.accepts(query, query_index, candidate, *index))
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderPolicy;

    #[test]
    fn test_rule_order() {
        let filter = CandidateFilter::new(Some(0.45));
        assert_eq!(
            filter.rules(),
            &[
                FilterRule::ExcludeQuery,
                FilterRule::SameLocality,
                FilterRule::RatingWithin(0.45),
                FilterRule::SameGenderPolicy,
            ]
        );
        assert_eq!(CandidateFilter::new(None).rules().len(), 3);
    }

    #[test]
    fn test_group_and_rating() {
        let corpus = Corpus::new(vec![
            Listing::new("1", "A").with_group("1").with_rating(4.0),
            Listing::new("2", "B").with_group("1").with_rating(4.2),
            Listing::new("3", "C").with_group("2").with_rating(4.1),
            Listing::new("4", "D").with_group("1").with_rating(4.6),
            Listing::new("5", "E").with_group("1"),
        ]);

        let result = CandidateFilter::new(Some(0.45)).apply(&corpus, 0);
        assert_eq!(result, vec![1]);
    }

    #[test]
    fn test_margin_boundary_is_inclusive() {
        let corpus = Corpus::new(vec![
            Listing::new("1", "A").with_group("1").with_rating(4.0),
            Listing::new("2", "B").with_group("1").with_rating(4.45),
        ]);

        assert_eq!(CandidateFilter::new(Some(0.45)).apply(&corpus, 0), vec![1]);
    }

    #[test]
    fn test_unknown_query_rating_skips_rating_rule() {
        let corpus = Corpus::new(vec![
            Listing::new("1", "A").with_group("1"),
            Listing::new("2", "B").with_group("1").with_rating(1.0),
            Listing::new("3", "C").with_group("1"),
        ]);

        assert_eq!(CandidateFilter::new(Some(0.45)).apply(&corpus, 0), vec![1, 2]);
    }

    #[test]
    fn test_city_fallback_without_group() {
        let corpus = Corpus::new(vec![
            Listing::new("1", "A").with_city("Pune"),
            Listing::new("2", "B").with_city(" pune "),
            Listing::new("3", "C").with_city("Delhi"),
            Listing::new("4", "D").with_group("9"),
        ]);

        assert_eq!(CandidateFilter::new(None).apply(&corpus, 0), vec![1]);
    }

    #[test]
    fn test_no_locality_keeps_everyone() {
        let corpus = Corpus::new(vec![
            Listing::new("1", "A"),
            Listing::new("2", "B").with_group("1"),
            Listing::new("3", "C").with_city("Pune"),
        ]);

        assert!(FilterRule::SameLocality.is_skipped(&corpus.listings()[0]));
        assert_eq!(CandidateFilter::new(None).apply(&corpus, 0), vec![1, 2]);
    }

    #[test]
    fn test_gender_policy() {
        let corpus = Corpus::new(vec![
            Listing::new("1", "A").with_group("1").with_gender_policy(GenderPolicy::Female),
            Listing::new("2", "B").with_group("1").with_gender_policy(GenderPolicy::Male),
            Listing::new("3", "C").with_group("1").with_gender_policy(GenderPolicy::Female),
            Listing::new("4", "D").with_group("1"),
        ]);

        assert_eq!(CandidateFilter::new(None).apply(&corpus, 0), vec![2]);
        // Unset policy on the query applies no gender filter
        assert_eq!(CandidateFilter::new(None).apply(&corpus, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_query() {
        let corpus = Corpus::new(vec![Listing::new("1", "A")]);
        assert!(CandidateFilter::new(None).apply(&corpus, 4).is_empty());
    }
}
