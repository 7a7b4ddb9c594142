use crate::core::features::ListingFeatures;
use std::cmp::Ordering;

/// Candidate position in the corpus with its ranking score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub index: usize,
    pub score: f64,
}

/// Order candidates by descending similarity to the query
///
/// `similarity_row` holds the query's similarity to every corpus position.
pub fn rank_by_similarity(
    similarity_row: &[f64],
    query_index: usize,
    candidates: &[usize],
    top_n: usize,
) -> Vec<RankedCandidate> {
    let scored = candidates
        .iter()
        .filter(|&&index| index != query_index)
        .map(|&index| RankedCandidate {
            index,
            score: similarity_row.get(index).copied().unwrap_or(0.0),
        })
        .collect();

    sort_and_truncate(scored, top_n)
}

/// Order candidates by descending count of tags shared with the query
pub fn rank_by_tag_overlap(
    features: &[ListingFeatures],
    query_index: usize,
    candidates: &[usize],
    top_n: usize,
) -> Vec<RankedCandidate> {
    let Some(query) = features.get(query_index) else {
        return vec![];
    };

    let scored = candidates
        .iter()
        .filter(|&&index| index != query_index)
        .filter_map(|&index| {
            let candidate = features.get(index)?;
            let shared = query.tags.intersection(&candidate.tags).count();
            Some(RankedCandidate {
                index,
                score: shared as f64,
            })
        })
        .collect();

    sort_and_truncate(scored, top_n)
}

/// Sort by score (descending), ties by corpus order, then keep the top `top_n`
fn sort_and_truncate(mut scored: Vec<RankedCandidate>, top_n: usize) -> Vec<RankedCandidate> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });
    scored.truncate(top_n);
    scored
}
