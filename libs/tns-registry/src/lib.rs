pub mod error;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tns_api::{Filter, StoreError, TopicId, TopicRecord, TopicStore};

pub use error::{ErrorClass, RegistryError};

// ═══════════════════════════════════════════════════════════════
//  TopicRegistry
// ═══════════════════════════════════════════════════════════════

/// Registry of named topics on top of a `TopicStore`.
///
/// Owns the naming rules: names are non-blank, unique (exact,
/// case-sensitive match) and every stored record has an id assigned
/// here. Holds no state besides the shared store handle, so one
/// instance is shared by all request tasks.
pub struct TopicRegistry {
    store: Arc<dyn TopicStore>,
    query_timeout: Duration,
}

impl TopicRegistry {
    pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(store: Arc<dyn TopicStore>) -> Self {
        Self {
            store,
            query_timeout: Self::DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Upper bound for a single store call. Exceeding it fails the
    /// operation with `RegistryError::Storage`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Every registered topic, in the store's natural order.
    pub async fn find_all(&self) -> Result<Vec<TopicRecord>, RegistryError> {
        let records = self.query("find_all", self.store.find_all()).await?;
        tracing::debug!(count = records.len(), "listed topics");
        Ok(records)
    }

    /// Resolve a topic by name. Read-only.
    pub async fn discover_topic(&self, name: &str) -> Result<TopicRecord, RegistryError> {
        validate_name(name)?;
        let filter = Filter::Topic(name.to_string());
        let found = self.query("discover", self.store.find_one(&filter)).await?;
        tracing::debug!(topic = %name, found = found.is_some(), "discover topic");
        found.ok_or_else(|| RegistryError::not_found(filter))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<TopicRecord, RegistryError> {
        let id = TopicId::parse(id).map_err(|_| RegistryError::InvalidId(id.to_string()))?;
        let filter = Filter::Id(id);
        self.query("find_by_id", self.store.find_one(&filter))
            .await?
            .ok_or_else(|| RegistryError::not_found(filter))
    }

    /// `true` iff some record already uses `candidate.topic`.
    pub async fn check_duplicate(&self, candidate: &TopicRecord) -> Result<bool, RegistryError> {
        let filter = Filter::Topic(candidate.topic.clone());
        let existing = self.query("check_duplicate", self.store.find_one(&filter)).await?;
        Ok(existing.is_some())
    }

    /// Register a new topic under a freshly generated id.
    ///
    /// The pre-check gives the common case a cheap rejection; the store's
    /// unique index decides the race between concurrent registrants of
    /// the same name.
    pub async fn register(&self, mut candidate: TopicRecord) -> Result<TopicRecord, RegistryError> {
        validate_name(&candidate.topic)?;

        if self.check_duplicate(&candidate).await? {
            tracing::warn!(topic = %candidate.topic, "rejected duplicate topic");
            return Err(RegistryError::DuplicateTopic { topic: candidate.topic });
        }

        let id = TopicId::generate();
        candidate.id = Some(id);
        match self.query("insert", self.store.insert(candidate.clone())).await {
            Ok(()) => {}
            Err(RegistryError::Storage(e)) if e.is_duplicate() => {
                tracing::warn!(topic = %candidate.topic, "lost registration race, topic taken");
                return Err(RegistryError::DuplicateTopic { topic: candidate.topic });
            }
            Err(e) => return Err(e),
        }

        tracing::info!(topic = %candidate.topic, %id, "registered topic");
        Ok(candidate)
    }

    /// Replace the stored record addressed by `record.id`, or by
    /// `record.topic` when no id is given. The stored id is kept.
    pub async fn update(&self, record: TopicRecord) -> Result<TopicRecord, RegistryError> {
        validate_name(&record.topic)?;
        let filter = record.filter();
        let topic = record.topic.clone();

        let updated = match self.query("update", self.store.update(&filter, record)).await {
            Ok(updated) => updated,
            Err(RegistryError::Storage(e)) if e.is_duplicate() => {
                tracing::warn!(%filter, topic = %topic, "update would duplicate topic");
                return Err(RegistryError::DuplicateTopic { topic });
            }
            Err(e) => return Err(e),
        };

        let updated = updated.ok_or_else(|| RegistryError::not_found(&filter))?;
        tracing::info!(%filter, topic = %updated.topic, "updated topic");
        Ok(updated)
    }

    /// Remove the record addressed by `record.id`, or by `record.topic`
    /// when no id is given. Returns the removed record.
    pub async fn delete(&self, record: &TopicRecord) -> Result<TopicRecord, RegistryError> {
        let filter = record.filter();
        if let Filter::Topic(name) = &filter {
            validate_name(name)?;
        }

        let removed = self
            .query("delete", self.store.delete(&filter))
            .await?
            .ok_or_else(|| RegistryError::not_found(&filter))?;
        tracing::info!(topic = %removed.topic, "deleted topic");
        Ok(removed)
    }

    pub async fn flush(&self) -> Result<(), RegistryError> {
        self.query("flush", self.store.flush()).await
    }

    /// Run one store call under the query timeout.
    async fn query<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, RegistryError> {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RegistryError::Storage(e.with_context(op))),
            Err(_) => Err(RegistryError::Storage(StoreError::io(format!(
                "{op}: query timed out after {} ms",
                self.query_timeout.as_millis()
            )))),
        }
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::Validation("topic name must not be blank".into()));
    }
    Ok(())
}
