use std::future::Future;
use std::pin::Pin;

use crate::{Filter, StoreError, TopicRecord};

// ════════════════════════════════════════════════════════════════
//  Storage adapter trait
// ════════════════════════════════════════════════════════════════

/// Document collection holding topic records.
///
/// One instance per process, opened at startup and shared behind an
/// `Arc<dyn TopicStore>`. Implementations must keep a unique index on
/// both `id` and `topic`: an `insert` or `update` that would give two
/// records the same key fails with `ErrorKind::Duplicate` and changes
/// nothing. The check and the write happen atomically.
///
/// Backends: memory, file.
pub trait TopicStore: Send + Sync {
    /// Insert a record. The record must already carry its `id`.
    fn insert(&self, record: TopicRecord) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// All records in the store's natural order.
    fn find_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<TopicRecord>, StoreError>> + Send + '_>>;

    /// The single record matching `filter`, if any.
    fn find_one(&self, filter: &Filter) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>>;

    /// Replace the record matching `filter` with `record`, keeping the
    /// stored `id`. Returns the stored result, or `None` if nothing matched.
    fn update(&self, filter: &Filter, record: TopicRecord)
        -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>>;

    /// Remove the record matching `filter`. Returns it, or `None` if nothing matched.
    fn delete(&self, filter: &Filter) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>>;

    /// Number of stored records.
    fn count(&self) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>>;

    /// Flush buffered state to durable storage (graceful shutdown).
    fn flush(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}
