use std::collections::HashMap;

use tns_api::{Filter, StoreError, TopicId, TopicRecord};

// ═══════════════════════════════════════════════════════════════
//  Collection
// ═══════════════════════════════════════════════════════════════

/// Ordered set of topic records with unique indexes on `topic` and `id`.
///
/// Synchronous and lock-free on its own; callers wrap it in whatever
/// lock their backend needs so that "check index, then write" runs as
/// one critical section.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    /// Insertion order is the natural order returned by `find_all`.
    records: Vec<TopicRecord>,
    by_topic: HashMap<String, TopicId>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a collection from persisted records, validating that the
    /// unique indexes hold and every record carries an id.
    pub fn from_records(records: Vec<TopicRecord>) -> Result<Self, StoreError> {
        let mut collection = Self::new();
        for record in records {
            collection.insert(record)?;
        }
        Ok(collection)
    }

    pub fn records(&self) -> &[TopicRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn insert(&mut self, record: TopicRecord) -> Result<(), StoreError> {
        let Some(id) = record.id else {
            return Err(StoreError::new(format!(
                "record for topic '{}' has no id",
                record.topic
            )));
        };
        if self.by_topic.contains_key(&record.topic) {
            return Err(StoreError::duplicate("topic", &record.topic));
        }
        if self.position(&Filter::Id(id)).is_some() {
            return Err(StoreError::duplicate("id", &id.to_string()));
        }

        self.by_topic.insert(record.topic.clone(), id);
        self.records.push(record);
        Ok(())
    }

    pub fn find_one(&self, filter: &Filter) -> Option<&TopicRecord> {
        self.position(filter).map(|pos| &self.records[pos])
    }

    /// Replace the matched record. The stored id survives; the new topic
    /// must not belong to a different record.
    pub fn update(&mut self, filter: &Filter, mut record: TopicRecord) -> Result<Option<TopicRecord>, StoreError> {
        let Some(pos) = self.position(filter) else {
            return Ok(None);
        };
        let stored = &self.records[pos];
        let stored_id = stored.id;
        let old_topic = stored.topic.clone();

        if record.topic != old_topic && self.by_topic.contains_key(&record.topic) {
            return Err(StoreError::duplicate("topic", &record.topic));
        }

        record.id = stored_id;
        if record.topic != old_topic {
            self.by_topic.remove(&old_topic);
            if let Some(id) = stored_id {
                self.by_topic.insert(record.topic.clone(), id);
            }
        }
        self.records[pos] = record.clone();
        Ok(Some(record))
    }

    pub fn delete(&mut self, filter: &Filter) -> Option<TopicRecord> {
        let pos = self.position(filter)?;
        let removed = self.records.remove(pos);
        self.by_topic.remove(&removed.topic);
        Some(removed)
    }

    fn position(&self, filter: &Filter) -> Option<usize> {
        match filter {
            Filter::Topic(name) => {
                let id = self.by_topic.get(name)?;
                self.records.iter().position(|r| r.id.as_ref() == Some(id))
            }
            Filter::Id(_) => self.records.iter().position(|r| filter.matches(r)),
        }
    }
}
