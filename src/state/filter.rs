/// Filter and search over the current collection
///
/// Everything here is a pure function of the full collection: the visible
/// subset is always recomputed from scratch, never narrowed from a previous
/// result.

use std::collections::BTreeMap;

use super::data::Record;

/// Current tag selector and search text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub tag: Option<String>,
    pub query: String,
}

impl FilterState {
    pub fn new(tag: Option<String>, query: impl Into<String>) -> Self {
        Self {
            tag: tag.map(|t| t.to_lowercase()),
            query: query.into(),
        }
    }

    /// True when neither predicate restricts anything
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.query.trim().is_empty()
    }

    /// Selecting the active tag again clears it
    pub fn toggle_tag(&mut self, tag: &str) {
        let tag = tag.to_lowercase();
        if self.tag.as_deref() == Some(tag.as_str()) {
            self.tag = None;
        } else {
            self.tag = Some(tag);
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let tag_ok = match &self.tag {
            Some(tag) => record.has_tag(tag),
            None => true,
        };

        tag_ok && matches_query(record, &self.query)
    }
}

/// Name contains the query (case-insensitive) or the id equals it exactly
fn matches_query(record: &Record, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    record.name.to_lowercase().contains(&query) || record.id.to_string() == query
}

/// Order-preserving subset of `records` matching `filter`
pub fn apply<'a>(records: &'a [Record], filter: &FilterState) -> Vec<&'a Record> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// One selector entry: a tag and how many records carry it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Count each distinct tag over the full collection, sorted by tag name
pub fn tag_index(records: &[Record]) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for tag in &record.types {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect()
}
