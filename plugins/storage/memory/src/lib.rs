mod collection;

use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;

use tns_api::{Filter, StoreError, TopicRecord, TopicStore};

pub use collection::Collection;

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// In-memory topic store (`database = "memory://"`). State is lost on
/// restart; used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TopicStore for MemoryStore {
    fn insert(&self, record: TopicRecord) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut buf = self.records.write().await;
            buf.insert(record)
        })
    }

    fn find_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<TopicRecord>, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let buf = self.records.read().await;
            Ok(buf.records().to_vec())
        })
    }

    fn find_one(&self, filter: &Filter) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move {
            let buf = self.records.read().await;
            Ok(buf.find_one(&filter).cloned())
        })
    }

    fn update(
        &self,
        filter: &Filter,
        record: TopicRecord,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move {
            let mut buf = self.records.write().await;
            buf.update(&filter, record)
        })
    }

    fn delete(&self, filter: &Filter) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move {
            let mut buf = self.records.write().await;
            Ok(buf.delete(&filter))
        })
    }

    fn count(&self) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>> {
        Box::pin(async move { Ok(self.records.read().await.len()) })
    }

    fn flush(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async {
            tracing::debug!("memory store has nothing to flush");
            Ok(())
        })
    }
}
