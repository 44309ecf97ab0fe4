//! Writes whose caller gives up early must still leave disk and memory in step.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use tns_api::{Filter, TopicId, TopicRecord, TopicStore};
use tns_storage_file::FileStore;

fn topics_on_disk(path: &Path) -> BTreeSet<String> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let records: Vec<TopicRecord> = serde_json::from_slice(&bytes).expect("file is valid json");
            records.into_iter().map(|r| r.topic).collect()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
        Err(e) => panic!("read {}: {e}", path.display()),
    }
}

async fn topics_in_memory(store: &FileStore) -> BTreeSet<String> {
    store.find_all().await.unwrap().into_iter().map(|r| r.topic).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timed_out_writes_keep_disk_and_memory_in_step() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("tns.json");
    let store = FileStore::open(&path).await.expect("open");

    for micros in 1..=40u64 {
        let record = TopicRecord::new(format!("t{micros}")).with_id(TopicId::generate());
        let _ = tokio::time::timeout(Duration::from_micros(micros), store.insert(record)).await;
    }
    for micros in (1..=40u64).step_by(3) {
        let filter = Filter::Topic(format!("t{micros}"));
        let _ = tokio::time::timeout(Duration::from_micros(micros), store.delete(&filter)).await;
    }

    // Let detached writes finish.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let in_memory = topics_in_memory(&store).await;
    assert_eq!(in_memory, topics_on_disk(&path));

    drop(store);
    let reopened = FileStore::open(&path).await.expect("reopen after cancelled writes");
    assert_eq!(topics_in_memory(&reopened).await, in_memory);
}
