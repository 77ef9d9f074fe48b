use crate::{ItemId, ItemRecord, Tag, TagAssociation, TagId};
use std::collections::{HashMap, HashSet};

/// Text representation of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub item_id: ItemId,
    pub text: String,
}

/// Joins each record with the names of its tags, one document per record, in record order.
///
/// Missing title, authors or tags become empty strings. Associations pointing at
/// unknown items or unknown tags are skipped.
pub fn build_corpus(records: &[ItemRecord], associations: &[TagAssociation], tags: &[Tag]) -> Vec<Document> {
    let tag_names: HashMap<TagId, &str> = tags.iter().map(|t| (t.tag_id, t.name.as_str())).collect();
    let known_items: HashSet<ItemId> = records.iter().map(|r| r.id).collect();

    let mut by_item: HashMap<ItemId, Vec<&str>> = HashMap::new();
    let mut orphans = 0usize;
    let mut unknown_tags = 0usize;
    for assoc in associations {
        if !known_items.contains(&assoc.item_id) {
            orphans += 1;
            continue;
        }
        match tag_names.get(&assoc.tag_id) {
            Some(name) => by_item.entry(assoc.item_id).or_default().push(name),
            None => unknown_tags += 1,
        }
    }
    if orphans > 0 || unknown_tags > 0 {
        tracing::debug!(orphans, unknown_tags, "skipped tag associations");
    }

    records
        .iter()
        .map(|record| {
            let tag_text = by_item.get(&record.id).map(|names| names.join(" ")).unwrap_or_default();
            Document {
                item_id: record.id,
                text: format!("{} {} {}", record.title_or_empty(), record.authors_or_empty(), tag_text),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(tag_id: TagId, name: &str) -> Tag { Tag { tag_id, name: name.to_string() } }

    fn assoc(item_id: ItemId, tag_id: TagId) -> TagAssociation { TagAssociation { item_id, tag_id } }

    #[test]
    fn joins_title_authors_and_tags() {
        let records = vec![ItemRecord::new(1, "Dune", "Frank Herbert")];
        let tags = vec![tag(10, "sci-fi"), tag(11, "classics")];
        let docs = build_corpus(&records, &[assoc(1, 10), assoc(1, 11)], &tags);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].item_id, 1);
        assert_eq!(docs[0].text, "Dune Frank Herbert sci-fi classics");
    }

    #[test]
    fn missing_fields_and_tags_are_empty() {
        let mut record = ItemRecord::new(2, "", "");
        record.title = None;
        record.authors = Some("Anon".into());
        let docs = build_corpus(&[record], &[], &[]);
        assert_eq!(docs[0].text.trim(), "Anon");
    }

    #[test]
    fn orphan_and_unknown_tag_links_are_ignored() {
        let records = vec![ItemRecord::new(1, "A", "B")];
        let tags = vec![tag(10, "fantasy")];
        let docs = build_corpus(&records, &[assoc(99, 10), assoc(1, 42), assoc(1, 10)], &tags);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "A B fantasy");
    }

    #[test]
    fn duplicate_tags_are_kept() {
        let records = vec![ItemRecord::new(1, "A", "B")];
        let tags = vec![tag(10, "magic")];
        let docs = build_corpus(&records, &[assoc(1, 10), assoc(1, 10)], &tags);
        assert_eq!(docs[0].text, "A B magic magic");
    }
}
