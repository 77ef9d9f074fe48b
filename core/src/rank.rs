use crate::config::PARALLEL_SCORING_MIN_ITEMS;
use crate::index::{Index, IndexEntry, TermVector};
use crate::ItemId;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    /// Build-time position in the index; the tie-break key.
    pub position: usize,
    pub score: f32,
}

/// Highest score first; equal scores keep build-time order.
fn by_score_then_position(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score.total_cmp(&a.score).then(a.position.cmp(&b.position))
}

/// Ranks the catalog against an indexed item, leaving the item itself out.
/// Unknown ids and `top_n == 0` give an empty result.
pub fn similar_to(index: &Index, item_id: ItemId, top_n: usize) -> Vec<ScoredItem> {
    match index.position(item_id) {
        Some(pos) => rank(index, &index.entries()[pos].vector, Some(pos), top_n),
        None => Vec::new(),
    }
}

/// Scores every entry against `query` and returns the best `top_n`.
pub fn rank(index: &Index, query: &TermVector, exclude: Option<usize>, top_n: usize) -> Vec<ScoredItem> {
    if top_n == 0 || index.is_empty() {
        return Vec::new();
    }

    let score = |(position, entry): (usize, &IndexEntry)| ScoredItem {
        item_id: entry.item_id,
        position,
        score: query.dot(&entry.vector),
    };
    let mut scored: Vec<ScoredItem> = if index.len() >= PARALLEL_SCORING_MIN_ITEMS {
        index.entries().par_iter().enumerate().map(score).collect()
    } else {
        index.entries().iter().enumerate().map(score).collect()
    };
    if let Some(pos) = exclude {
        scored.retain(|s| s.position != pos);
    }

    // positions are unique so the order is total and the selection is deterministic
    if top_n < scored.len() {
        scored.select_nth_unstable_by(top_n - 1, by_score_then_position);
        scored.truncate(top_n);
    }
    scored.sort_unstable_by(by_score_then_position);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    fn index_of(texts: &[&str]) -> Index {
        let docs: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Document { item_id: (i as ItemId + 1) * 10, text: t.to_string() })
            .collect();
        Index::build(&docs)
    }

    fn ids(results: &[ScoredItem]) -> Vec<ItemId> { results.iter().map(|s| s.item_id).collect() }

    #[test]
    fn shared_term_ranks_above_disjoint() {
        let index = index_of(&["dragon magic", "magic sword", "space travel"]);
        let results = similar_to(&index, 10, 2);
        assert_eq!(ids(&results), vec![20, 30]);
        assert!(results[0].score > 0.0);
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn query_item_is_excluded() {
        let index = index_of(&["magic", "magic", "magic"]);
        let results = similar_to(&index, 20, 10);
        assert_eq!(ids(&results), vec![10, 30]);
        for r in &results {
            assert!((r.score - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn ties_follow_build_order() {
        let index = index_of(&["the a an", "space", "dragon", "sword", "magic"]);
        let results = similar_to(&index, 10, 10);
        assert_eq!(ids(&results), vec![20, 30, 40, 50]);
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn truncated_selection_matches_full_sort() {
        let texts = ["magic dragon", "magic", "dragon sword", "space", "magic dragon sword", "dragon", "magic space"];
        let index = index_of(&texts);
        let full = similar_to(&index, 10, 100);
        for n in 1..full.len() {
            assert_eq!(similar_to(&index, 10, n), full[..n].to_vec());
        }
        for pair in full.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn edge_cases_are_empty() {
        let index = index_of(&["dragon magic", "magic sword"]);
        assert!(similar_to(&index, 10, 0).is_empty());
        assert!(similar_to(&index, 999, 5).is_empty());
        assert_eq!(similar_to(&index, 10, 50).len(), 1);
        assert!(similar_to(&Index::default(), 10, 5).is_empty());
    }

    #[test]
    fn large_catalog_scores_in_parallel_with_ordered_ties() {
        let cycle = ["dragon", "magic", "sword", "space", "the"];
        let texts: Vec<&str> = (0..PARALLEL_SCORING_MIN_ITEMS + 904).map(|i| cycle[i % cycle.len()]).collect();
        let index = index_of(&texts);
        assert!(index.len() >= PARALLEL_SCORING_MIN_ITEMS);

        let full = similar_to(&index, 10, usize::MAX);
        assert_eq!(full.len(), index.len() - 1);
        for pair in full.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].position < pair[1].position);
            }
        }

        // every other "dragon" document scores 1, in catalog order
        let top = similar_to(&index, 10, 20);
        let expected: Vec<ItemId> = (1..=20).map(|k| (5 * k as ItemId + 1) * 10).collect();
        assert_eq!(ids(&top), expected);
        for n in [1, 7, 500, 1000] {
            assert_eq!(similar_to(&index, 10, n), full[..n].to_vec());
        }
    }

    #[test]
    fn free_text_query_excludes_nothing() {
        let index = index_of(&["dragon magic", "magic sword", "space travel"]);
        let q = index.vectorize("magic");
        let results = rank(&index, &q, None, 3);
        assert_eq!(ids(&results), vec![10, 20, 30]);
    }
}
