//! Property and stress tests for the registry invariants.
//!
//! Runs against the in-memory store; the file store shares the same
//! collection and index code.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use tns_api::{TopicRecord, TopicStore};
use tns_registry::{RegistryError, TopicRegistry};
use tns_storage_memory::MemoryStore;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("build runtime")
}

/// Non-blank topic names: dotted / slashed identifiers like real topics.
fn topic_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._/-]{0,24}"
}

proptest! {
    #[test]
    fn distinct_names_coexist(names in prop::collection::hash_set(topic_name(), 1..20)) {
        let rt = runtime();
        rt.block_on(async {
            let reg = TopicRegistry::new(Arc::new(MemoryStore::new()));
            for name in &names {
                reg.register(TopicRecord::new(name.as_str())).await.unwrap();
            }

            let listed: HashSet<String> = reg.find_all().await.unwrap().into_iter().map(|r| r.topic).collect();
            assert_eq!(&listed, &names);

            for name in &names {
                assert_eq!(reg.discover_topic(name).await.unwrap().topic, *name);
            }
        });
    }

    #[test]
    fn registering_a_taken_name_never_changes_the_count(
        names in prop::collection::vec(topic_name(), 1..30),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let reg = TopicRegistry::new(store.clone());
            let mut seen = HashSet::new();

            for name in &names {
                let before = store.count().await.unwrap();
                let res = reg.register(TopicRecord::new(name.as_str())).await;
                let after = store.count().await.unwrap();

                if seen.insert(name.clone()) {
                    assert!(res.is_ok());
                    assert_eq!(after, before + 1);
                } else {
                    assert!(matches!(res, Err(RegistryError::DuplicateTopic { .. })));
                    assert_eq!(after, before);
                }
            }
        });
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_registration_of_one_name_persists_exactly_one() {
    const N: usize = 64;

    let store = Arc::new(MemoryStore::new());
    let reg = Arc::new(TopicRegistry::new(store.clone()));
    let barrier = Arc::new(tokio::sync::Barrier::new(N));

    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let reg = reg.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            reg.register(TopicRecord::new("orders").with_field("worker", i.into())).await
        }));
    }

    let mut registered = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => registered += 1,
            Err(RegistryError::DuplicateTopic { .. }) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(registered, 1);
    assert_eq!(duplicates, N - 1);
    assert_eq!(store.count().await.unwrap(), 1);
}
