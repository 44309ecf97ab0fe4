use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;

use tns_api::{Filter, StoreError, TopicRecord, TopicStore};
use tns_storage_memory::Collection;

// ════════════════════════════════════════════════════════════════
//  FileStore
// ════════════════════════════════════════════════════════════════

/// Topic store persisted as a single JSON array (`database = "file://<path>"`).
///
/// The whole collection is kept in memory and rewritten on every
/// mutation: serialize to `<path>.tmp`, then rename over `<path>`. A
/// mutation only becomes visible once the file write succeeded, so a
/// failed write leaves both disk and memory untouched.
///
/// Writes run on a spawned task that owns the lock until the new state
/// is published. Dropping the caller's future (a query timeout) does not
/// stop a write halfway.
pub struct FileStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    state: Mutex<Collection>,
}

impl FileStore {
    /// Open (or create) the store at `path`.
    ///
    /// A missing file starts an empty collection. An unreadable or corrupt
    /// file, or one that violates the unique indexes, is an error. An empty
    /// path or a path naming a directory is a `Config` error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(StoreError::config("file store path is empty"));
        }
        let collection = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collection::new(),
            Ok(bytes) => {
                let records: Vec<TopicRecord> = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::format_err(format!("parse {}: {e}", path.display())))?;
                Collection::from_records(records).map_err(|e| e.with_context(path.display()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| StoreError::io(format!("mkdir {}: {e}", parent.display())))?;
                }
                Collection::new()
            }
            Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => {
                return Err(StoreError::config(format!("{} is a directory", path.display())));
            }
            Err(e) => return Err(StoreError::io(format!("open {}: {e}", path.display()))),
        };

        tracing::info!(path = %path.display(), records = collection.len(), "opened file store");
        Ok(Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(collection),
            }),
        })
    }

    /// Apply `op` to a copy of the collection, persist the copy if it
    /// changed, then publish it. The whole step runs detached from the
    /// caller and holds the lock across the write, so index checks and
    /// persistence are one critical section.
    async fn mutate<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Collection) -> Result<T, StoreError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut state = inner.state.lock().await;
            let mut next = state.clone();
            let out = op(&mut next)?;
            if next.records() != state.records() {
                inner.persist(&next).await?;
                *state = next;
            }
            Ok::<_, StoreError>(out)
        })
        .await
        .map_err(|e| StoreError::io(format!("write task: {e}")))?
    }
}

impl Inner {
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn persist(&self, collection: &Collection) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(collection.records())?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(format!("rename {} -> {}: {e}", tmp.display(), self.path.display())))
    }
}

impl TopicStore for FileStore {
    fn insert(&self, record: TopicRecord) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(self.mutate(move |c| c.insert(record)))
    }

    fn find_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<TopicRecord>, StoreError>> + Send + '_>> {
        Box::pin(async move { Ok(self.inner.state.lock().await.records().to_vec()) })
    }

    fn find_one(&self, filter: &Filter) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(async move { Ok(self.inner.state.lock().await.find_one(&filter).cloned()) })
    }

    fn update(
        &self,
        filter: &Filter,
        record: TopicRecord,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(self.mutate(move |c| c.update(&filter, record)))
    }

    fn delete(&self, filter: &Filter) -> Pin<Box<dyn Future<Output = Result<Option<TopicRecord>, StoreError>> + Send + '_>> {
        let filter = filter.clone();
        Box::pin(self.mutate(move |c| Ok(c.delete(&filter))))
    }

    fn count(&self) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>> {
        Box::pin(async move { Ok(self.inner.state.lock().await.len()) })
    }

    fn flush(&self) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            tokio::spawn(async move {
                let state = inner.state.lock().await;
                inner.persist(&state).await?;
                tracing::debug!(path = %inner.path.display(), records = state.len(), "flushed file store");
                Ok::<_, StoreError>(())
            })
            .await
            .map_err(|e| StoreError::io(format!("flush task: {e}")))?
        })
    }
}
