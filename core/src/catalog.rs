use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ItemId = u64;
pub type TagId = u64;

/// One catalog entry. Text fields that were empty in the source are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub rating: Option<f32>,
    pub year: Option<i32>,
    /// Alternate id used by clients for display/linking (`best_book_id`).
    pub display_id: Option<ItemId>,
}

impl ItemRecord {
    pub fn new(id: ItemId, title: &str, authors: &str) -> Self {
        Self {
            id,
            title: Some(title.to_string()),
            authors: Some(authors.to_string()),
            rating: None,
            year: None,
            display_id: None,
        }
    }

    pub fn title_or_empty(&self) -> &str { self.title.as_deref().unwrap_or("") }

    pub fn authors_or_empty(&self) -> &str { self.authors.as_deref().unwrap_or("") }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssociation {
    pub item_id: ItemId,
    pub tag_id: TagId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: TagId,
    pub name: String,
}

/// Read-only item table in load order.
///
/// Positions are stable for the life of the value and line up with the
/// positions of the vector index built from the same records.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<ItemRecord>,
    positions: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Builds the table, keeping the first record for each id.
    pub fn new(records: Vec<ItemRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut positions = HashMap::with_capacity(records.len());
        for record in records {
            if positions.contains_key(&record.id) {
                tracing::warn!(item_id = record.id, "duplicate item id, keeping first occurrence");
                continue;
            }
            positions.insert(record.id, kept.len());
            kept.push(record);
        }
        Self { records: kept, positions }
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn records(&self) -> &[ItemRecord] { &self.records }

    pub fn position(&self, id: ItemId) -> Option<usize> { self.positions.get(&id).copied() }

    pub fn get(&self, id: ItemId) -> Option<&ItemRecord> {
        self.position(id).map(|pos| &self.records[pos])
    }

    pub fn at(&self, pos: usize) -> Option<&ItemRecord> { self.records.get(pos) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_keep_first() {
        let catalog = Catalog::new(vec![
            ItemRecord::new(7, "First", "A"),
            ItemRecord::new(8, "Other", "B"),
            ItemRecord::new(7, "Second", "C"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(7).unwrap().title_or_empty(), "First");
        assert_eq!(catalog.position(8), Some(1));
        assert!(catalog.get(9).is_none());
    }

    #[test]
    fn missing_text_reads_as_empty() {
        let mut record = ItemRecord::new(1, "", "");
        record.title = None;
        record.authors = None;
        assert_eq!(record.title_or_empty(), "");
        assert_eq!(record.authors_or_empty(), "");
    }
}
