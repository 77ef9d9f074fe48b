//! Relational filters over the item table: title/author substring match and
//! the top-rated listing. Neither touches the vector index.

use crate::config::FILTER_MAX_MATCHES;
use crate::ItemRecord;
use std::cmp::Ordering;

#[derive(Debug, Clone, Default)]
pub struct TextFilter {
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum FilterOutcome<'a> {
    Matches(Vec<&'a ItemRecord>),
    TooMany { count: usize },
}

impl FilterOutcome<'_> {
    pub fn count(&self) -> usize {
        match self {
            FilterOutcome::Matches(m) => m.len(),
            FilterOutcome::TooMany { count } => *count,
        }
    }
}

/// Case-insensitive substring test; an empty needle matches anything.
fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

fn normalized(field: &Option<String>) -> String {
    field.as_deref().map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

impl TextFilter {
    pub fn new(title: Option<String>, author: Option<String>) -> Self { Self { title, author } }

    /// Matching records in catalog order, or a count once there are more than
    /// [`FILTER_MAX_MATCHES`].
    pub fn apply<'a>(&self, records: &'a [ItemRecord]) -> FilterOutcome<'a> {
        self.apply_with_limit(records, FILTER_MAX_MATCHES)
    }

    pub fn apply_with_limit<'a>(&self, records: &'a [ItemRecord], max_matches: usize) -> FilterOutcome<'a> {
        let title = normalized(&self.title);
        let author = normalized(&self.author);
        let matches: Vec<&ItemRecord> = records
            .iter()
            .filter(|r| contains_ci(r.title_or_empty(), &title) && contains_ci(r.authors_or_empty(), &author))
            .collect();
        if matches.len() > max_matches {
            FilterOutcome::TooMany { count: matches.len() }
        } else {
            FilterOutcome::Matches(matches)
        }
    }
}

/// What the top-rated listing does with records that have no rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingValuePolicy {
    /// Leave the record out.
    #[default]
    Skip,
    /// Keep the record, ranked below every rated record.
    SortLast,
}

/// Top-N by rating with optional inclusive year bounds. Records without a year
/// are left out whenever a bound is set.
#[derive(Debug, Clone)]
pub struct TopRatedQuery {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub limit: usize,
    pub missing_rating: MissingValuePolicy,
}

impl Default for TopRatedQuery {
    fn default() -> Self {
        Self {
            start_year: None,
            end_year: None,
            limit: crate::config::DEFAULT_TOP_RATED_LIMIT,
            missing_rating: MissingValuePolicy::default(),
        }
    }
}

fn year_in_range(record: &ItemRecord, start: Option<i32>, end: Option<i32>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    match record.year {
        Some(y) => start.map_or(true, |s| y >= s) && end.map_or(true, |e| y <= e),
        None => false,
    }
}

/// Rated before unrated, higher rating first.
fn by_rating_desc(a: &ItemRecord, b: &ItemRecord) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl TopRatedQuery {
    /// Sorted by rating descending; equal ratings keep catalog order.
    pub fn apply<'a>(&self, records: &'a [ItemRecord]) -> Vec<&'a ItemRecord> {
        if self.limit == 0 {
            return Vec::new();
        }
        let mut selected: Vec<&ItemRecord> = records
            .iter()
            .filter(|r| year_in_range(r, self.start_year, self.end_year))
            .filter(|r| r.rating.is_some() || self.missing_rating == MissingValuePolicy::SortLast)
            .collect();
        // stable sort: ties stay in catalog order
        selected.sort_by(|a, b| by_rating_desc(a, b));
        selected.truncate(self.limit);
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: u64, title: &str, authors: &str, rating: Option<f32>, year: Option<i32>) -> ItemRecord {
        ItemRecord { rating, year, ..ItemRecord::new(id, title, authors) }
    }

    fn sample() -> Vec<ItemRecord> {
        vec![
            book(1, "The Hobbit", "J.R.R. Tolkien", Some(4.25), Some(1937)),
            book(2, "Dune", "Frank Herbert", Some(4.2), Some(1965)),
            book(3, "The Fellowship of the Ring", "J.R.R. Tolkien", Some(4.34), Some(1954)),
            book(4, "Untitled", "Unknown", None, Some(1960)),
            book(5, "Children of Dune", "Frank Herbert", Some(3.9), None),
            book(6, "Dune Messiah", "Frank Herbert", Some(4.2), Some(1969)),
        ]
    }

    fn ids(records: &[&ItemRecord]) -> Vec<u64> { records.iter().map(|r| r.id).collect() }

    #[test]
    fn substring_filter_is_case_insensitive() {
        let books = sample();
        let outcome = TextFilter::new(Some("DUNE".into()), None).apply(&books);
        match outcome {
            FilterOutcome::Matches(m) => assert_eq!(ids(&m), vec![2, 5, 6]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn title_and_author_must_both_match() {
        let books = sample();
        let outcome = TextFilter::new(Some("the".into()), Some("tolkien".into())).apply(&books);
        assert_eq!(outcome, FilterOutcome::Matches(vec![&books[0], &books[2]]));
    }

    #[test]
    fn too_many_matches_reports_count() {
        let books = sample();
        let outcome = TextFilter::default().apply_with_limit(&books, 3);
        assert_eq!(outcome, FilterOutcome::TooMany { count: 6 });
        assert_eq!(outcome.count(), 6);
    }

    #[test]
    fn top_rated_sorts_desc_with_stable_ties() {
        let books = sample();
        let top = TopRatedQuery { limit: 10, ..TopRatedQuery::default() }.apply(&books);
        assert_eq!(ids(&top), vec![3, 1, 2, 6, 5]);
    }

    #[test]
    fn top_rated_year_bounds_are_inclusive() {
        let books = sample();
        let query = TopRatedQuery { start_year: Some(1954), end_year: Some(1965), limit: 10, ..TopRatedQuery::default() };
        assert_eq!(ids(&query.apply(&books)), vec![3, 2]);
    }

    #[test]
    fn missing_rating_policy() {
        let books = sample();
        let query = TopRatedQuery {
            start_year: Some(1950),
            limit: 10,
            missing_rating: MissingValuePolicy::SortLast,
            ..TopRatedQuery::default()
        };
        assert_eq!(ids(&query.apply(&books)), vec![3, 2, 6, 4]);
    }

    #[test]
    fn limit_and_inverted_range() {
        let books = sample();
        assert_eq!(TopRatedQuery { limit: 2, ..TopRatedQuery::default() }.apply(&books).len(), 2);
        assert!(TopRatedQuery { limit: 0, ..TopRatedQuery::default() }.apply(&books).is_empty());
        let inverted = TopRatedQuery { start_year: Some(2000), end_year: Some(1900), limit: 10, ..TopRatedQuery::default() };
        assert!(inverted.apply(&books).is_empty());
    }
}
