use crate::{ItemId, ItemRecord, Tag, TagAssociation, TagId};
use anyhow::{Context, Result};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Supplies the raw tables the recommendation service is built from.
pub trait CatalogSource {
    fn load_item_records(&self) -> Result<Vec<ItemRecord>>;
    fn load_tag_associations(&self) -> Result<Vec<TagAssociation>>;
    fn load_tags(&self) -> Result<Vec<Tag>>;
}

pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn books(&self) -> PathBuf { self.root.join("books.csv") }
    pub fn tags(&self) -> PathBuf { self.root.join("tags.csv") }
    pub fn book_tags(&self) -> PathBuf { self.root.join("book_tags.csv") }
}

/// Goodreads-style CSV export: `books.csv`, `tags.csv`, `book_tags.csv`.
pub struct CsvSource {
    paths: DataPaths,
}

#[derive(Debug, Deserialize)]
struct BookRow {
    book_id: ItemId,
    #[serde(default)]
    best_book_id: Option<String>,
    #[serde(default, deserialize_with = "lossy_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lossy_text")]
    authors: Option<String>,
    #[serde(default)]
    average_rating: Option<String>,
    #[serde(default)]
    original_publication_year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagRow {
    tag_id: TagId,
    #[serde(default, deserialize_with = "lossy_text")]
    tag_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookTagRow {
    goodreads_book_id: ItemId,
    tag_id: TagId,
}

struct LossyText;

impl<'de> Visitor<'de> for LossyText {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str("a text cell") }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> { Ok(Some(v.to_string())) }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(Some(String::from_utf8_lossy(v).into_owned()))
    }
}

/// Free-text cells with broken encoding keep their readable part instead of failing the row.
fn lossy_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_bytes(LossyText)
}

/// Parses an optional numeric cell; unreadable values are dropped, not fatal.
fn parse_cell<T: std::str::FromStr>(cell: Option<&str>, column: &str, book_id: ItemId) -> Option<T> {
    let raw = cell?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(book_id, column, value = raw, "ignoring unreadable cell");
            None
        }
    }
}

/// Years are exported as floats ("1937.0", "-750.0").
fn parse_year(cell: Option<&str>, book_id: ItemId) -> Option<i32> {
    parse_cell::<f64>(cell, "original_publication_year", book_id)
        .filter(|y| y.is_finite())
        .map(|y| y.trunc() as i32)
}

fn non_empty(cell: Option<String>) -> Option<String> { cell.filter(|s| !s.trim().is_empty()) }

fn record_from_row(row: BookRow) -> ItemRecord {
    let id = row.book_id;
    ItemRecord {
        id,
        display_id: parse_cell::<f64>(row.best_book_id.as_deref(), "best_book_id", id)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as ItemId),
        rating: parse_cell::<f32>(row.average_rating.as_deref(), "average_rating", id),
        year: parse_year(row.original_publication_year.as_deref(), id),
        title: non_empty(row.title),
        authors: non_empty(row.authors),
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    // byte records: text cells are decoded per field, not per line
    let headers = reader.byte_headers().with_context(|| format!("{}: reading header", path.display()))?.clone();
    let mut rows = Vec::new();
    for (line, record) in reader.byte_records().enumerate() {
        let row: T = record
            .and_then(|r| r.deserialize(Some(&headers)))
            .with_context(|| format!("{}: bad record {}", path.display(), line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self { Self { paths: DataPaths::new(root) } }
}

impl CatalogSource for CsvSource {
    fn load_item_records(&self) -> Result<Vec<ItemRecord>> {
        let rows: Vec<BookRow> = read_rows(&self.paths.books())?;
        tracing::debug!(rows = rows.len(), "loaded books");
        Ok(rows.into_iter().map(record_from_row).collect())
    }

    fn load_tag_associations(&self) -> Result<Vec<TagAssociation>> {
        let rows: Vec<BookTagRow> = read_rows(&self.paths.book_tags())?;
        tracing::debug!(rows = rows.len(), "loaded book tags");
        Ok(rows.into_iter().map(|r| TagAssociation { item_id: r.goodreads_book_id, tag_id: r.tag_id }).collect())
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        let rows: Vec<TagRow> = read_rows(&self.paths.tags())?;
        tracing::debug!(rows = rows.len(), "loaded tags");
        Ok(rows.into_iter().map(|r| Tag { tag_id: r.tag_id, name: r.tag_name.unwrap_or_default() }).collect())
    }
}

/// Tables already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub records: Vec<ItemRecord>,
    pub associations: Vec<TagAssociation>,
    pub tags: Vec<Tag>,
}

impl CatalogSource for MemorySource {
    fn load_item_records(&self) -> Result<Vec<ItemRecord>> { Ok(self.records.clone()) }
    fn load_tag_associations(&self) -> Result<Vec<TagAssociation>> { Ok(self.associations.clone()) }
    fn load_tags(&self) -> Result<Vec<Tag>> { Ok(self.tags.clone()) }
}
