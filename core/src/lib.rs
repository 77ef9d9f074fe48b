pub mod catalog;
pub mod config;
pub mod corpus;
pub mod filter;
pub mod index;
pub mod rank;
pub mod service;
pub mod source;
pub mod tokenizer;

pub use catalog::{Catalog, ItemId, ItemRecord, Tag, TagAssociation, TagId};
pub use corpus::{build_corpus, Document};
pub use filter::{FilterOutcome, MissingValuePolicy, TextFilter, TopRatedQuery};
pub use index::{Index, TermId, TermVector, Vocabulary};
pub use rank::ScoredItem;
pub use service::{Recommendation, RecommendationService};
pub use source::{CatalogSource, CsvSource, DataPaths, MemorySource};
pub use tokenizer::TokenizerOptions;
