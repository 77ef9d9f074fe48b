use crate::catalog::Catalog;
use crate::corpus::build_corpus;
use crate::filter::{FilterOutcome, TextFilter, TopRatedQuery};
use crate::index::Index;
use crate::rank::{self, ScoredItem};
use crate::source::CatalogSource;
use crate::tokenizer::TokenizerOptions;
use crate::{ItemId, ItemRecord, Tag, TagAssociation};
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Instant;

/// One recommended item as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub book_id: ItemId,
    pub title: String,
    pub authors: String,
    pub best_book_id: Option<ItemId>,
}

impl From<&ItemRecord> for Recommendation {
    fn from(record: &ItemRecord) -> Self {
        Self {
            book_id: record.id,
            title: record.title_or_empty().to_string(),
            authors: record.authors_or_empty().to_string(),
            best_book_id: record.display_id,
        }
    }
}

/// Item table plus the vector index built from it. Built once, read-only after.
pub struct RecommendationService {
    catalog: Catalog,
    index: Index,
}

impl RecommendationService {
    pub fn build(records: Vec<ItemRecord>, associations: &[TagAssociation], tags: &[Tag], options: TokenizerOptions) -> Self {
        let start = Instant::now();
        let catalog = Catalog::new(records);
        let docs = build_corpus(catalog.records(), associations, tags);
        let index = Index::build_with(&docs, options);
        tracing::info!(
            items = catalog.len(),
            tags = tags.len(),
            associations = associations.len(),
            took_ms = start.elapsed().as_millis() as u64,
            "recommendation service ready"
        );
        Self { catalog, index }
    }

    /// Loads every table from `source` and builds the service. Any load failure is fatal.
    pub fn from_source<S: CatalogSource>(source: &S, options: TokenizerOptions) -> Result<Self> {
        let records = source.load_item_records().context("loading item records")?;
        let associations = source.load_tag_associations().context("loading tag associations")?;
        let tags = source.load_tags().context("loading tags")?;
        Ok(Self::build(records, &associations, &tags, options))
    }

    /// Up to `top_n` items most similar to `item_id`, never including it.
    pub fn recommend(&self, item_id: ItemId, top_n: usize) -> Vec<Recommendation> {
        self.to_recommendations(&self.similar(item_id, top_n))
    }

    /// Like [`recommend`](Self::recommend) but keeps the scores.
    pub fn similar(&self, item_id: ItemId, top_n: usize) -> Vec<ScoredItem> { rank::similar_to(&self.index, item_id, top_n) }

    /// Items sharing at least one term with free text, best first.
    pub fn similar_to_text(&self, text: &str, top_n: usize) -> Vec<ScoredItem> {
        let query = self.index.vectorize(text);
        if query.is_zero() {
            return Vec::new();
        }
        let mut scored = rank::rank(&self.index, &query, None, top_n);
        scored.retain(|s| s.score > 0.0);
        scored
    }

    pub fn recommend_text(&self, text: &str, top_n: usize) -> Vec<Recommendation> {
        self.to_recommendations(&self.similar_to_text(text, top_n))
    }

    pub fn to_recommendations(&self, scored: &[ScoredItem]) -> Vec<Recommendation> {
        scored
            .iter()
            .filter_map(|s| self.catalog.at(s.position))
            .map(Recommendation::from)
            .collect()
    }

    pub fn record(&self, item_id: ItemId) -> Option<&ItemRecord> { self.catalog.get(item_id) }

    pub fn records(&self) -> &[ItemRecord] { self.catalog.records() }

    pub fn filter(&self, filter: &TextFilter) -> FilterOutcome<'_> { filter.apply(self.catalog.records()) }

    pub fn top_rated(&self, query: &TopRatedQuery) -> Vec<&ItemRecord> { query.apply(self.catalog.records()) }

    pub fn index(&self) -> &Index { &self.index }
}
