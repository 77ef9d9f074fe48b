use crate::corpus::Document;
use crate::tokenizer::{tokenize_with, TokenizerOptions};
use crate::ItemId;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

pub type TermId = u32;

/// Term -> dense id, with document frequency and smoothed idf per id.
///
/// Ids follow the lexicographic order of the terms, so the same corpus always
/// produces the same vocabulary regardless of how the build was scheduled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f32>,
}

impl Vocabulary {
    fn from_counts(doc_counts: &[HashMap<String, u32>]) -> Self {
        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for counts in doc_counts {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n = doc_counts.len() as f64;
        let mut vocab = Vocabulary {
            terms: HashMap::with_capacity(df.len()),
            df: Vec::with_capacity(df.len()),
            idf: Vec::with_capacity(df.len()),
        };
        for (id, (term, df_t)) in df.into_iter().enumerate() {
            vocab.terms.insert(term.to_string(), id as TermId);
            vocab.df.push(df_t);
            vocab.idf.push(smoothed_idf(n, df_t as f64) as f32);
        }
        vocab
    }

    pub fn len(&self) -> usize { self.df.len() }

    pub fn is_empty(&self) -> bool { self.df.is_empty() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.terms.get(term).copied() }

    pub fn df(&self, id: TermId) -> Option<u32> { self.df.get(id as usize).copied() }

    pub fn idf(&self, id: TermId) -> Option<f32> { self.idf.get(id as usize).copied() }

    /// Terms in id order.
    pub fn terms(&self) -> Vec<&str> {
        let mut out = vec![""; self.len()];
        for (term, &id) in &self.terms {
            out[id as usize] = term.as_str();
        }
        out
    }
}

/// `ln((1 + n) / (1 + df)) + 1`, never below 1 for `df <= n`.
fn smoothed_idf(n: f64, df: f64) -> f64 { ((1.0 + n) / (1.0 + df)).ln() + 1.0 }

/// Sparse tf-idf vector, entries sorted by term id, unit length or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(TermId, f32)>,
}

impl TermVector {
    fn from_counts(counts: &HashMap<String, u32>, vocab: &Vocabulary) -> Self {
        let mut entries: Vec<(TermId, f32)> = counts
            .iter()
            .filter_map(|(term, &tf)| {
                let tid = vocab.term_id(term)?;
                Some((tid, tf as f32 * vocab.idf[tid as usize]))
            })
            .collect();
        entries.sort_unstable_by_key(|&(tid, _)| tid);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Self::default();
        }
        for (_, w) in entries.iter_mut() {
            *w /= norm;
        }
        Self { entries }
    }

    /// True for documents with no recognized terms.
    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    /// Number of non-zero dimensions.
    pub fn nnz(&self) -> usize { self.entries.len() }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f32)> + '_ { self.entries.iter().copied() }

    pub fn weight(&self, id: TermId) -> f32 {
        match self.entries.binary_search_by_key(&id, |&(tid, _)| tid) {
            Ok(i) => self.entries[i].1,
            Err(_) => 0.0,
        }
    }

    pub fn norm(&self) -> f32 { self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt() }

    /// Dot product over shared dimensions; the cosine similarity of two index vectors.
    pub fn dot(&self, other: &TermVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub item_id: ItemId,
    pub vector: TermVector,
}

/// Frozen vector-space index. Entry order is the document order given to
/// [`Index::build`] and is what ranking ties fall back to.
#[derive(Debug, Default)]
pub struct Index {
    vocabulary: Vocabulary,
    entries: Vec<IndexEntry>,
    positions: HashMap<ItemId, usize>,
    options: TokenizerOptions,
}

fn term_counts(text: &str, options: TokenizerOptions) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in tokenize_with(text, options) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

impl Index {
    pub fn build(docs: &[Document]) -> Self { Self::build_with(docs, TokenizerOptions::default()) }

    /// Tokenizes and counts every document in parallel, merges document frequencies
    /// into the vocabulary, then weights and normalizes every document in parallel.
    pub fn build_with(docs: &[Document], options: TokenizerOptions) -> Self {
        let start = Instant::now();
        let counts: Vec<HashMap<String, u32>> = docs.par_iter().map(|d| term_counts(&d.text, options)).collect();

        let vocabulary = Vocabulary::from_counts(&counts);

        let vectors: Vec<TermVector> = counts.par_iter().map(|c| TermVector::from_counts(c, &vocabulary)).collect();

        let mut positions = HashMap::with_capacity(docs.len());
        let entries: Vec<IndexEntry> = docs
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(pos, (doc, vector))| {
                positions.entry(doc.item_id).or_insert(pos);
                IndexEntry { item_id: doc.item_id, vector }
            })
            .collect();

        let zero_vectors = entries.iter().filter(|e| e.vector.is_zero()).count();
        tracing::info!(
            num_docs = entries.len(),
            num_terms = vocabulary.len(),
            zero_vectors,
            took_ms = start.elapsed().as_millis() as u64,
            "built vector index"
        );
        Self { vocabulary, entries, positions, options }
    }

    /// Projects free text onto the frozen vocabulary. Unknown terms are dropped.
    pub fn vectorize(&self, text: &str) -> TermVector {
        TermVector::from_counts(&term_counts(text, self.options), &self.vocabulary)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn entries(&self) -> &[IndexEntry] { &self.entries }

    pub fn options(&self) -> TokenizerOptions { self.options }

    pub fn position(&self, item_id: ItemId) -> Option<usize> { self.positions.get(&item_id).copied() }

    pub fn vector(&self, item_id: ItemId) -> Option<&TermVector> {
        self.position(item_id).map(|pos| &self.entries[pos].vector)
    }
}
