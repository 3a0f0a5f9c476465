//! Behavior every `KvStore` backend must share.
//!
//! Each check takes a key namespace so backends with a shared server
//! can run them side by side without clearing anything.

use std::sync::Arc;

use influence_store::{CommitOutcome, KvStore};

fn key(ns: &str, name: &str) -> String {
    format!("{ns}:{name}")
}

pub async fn get_missing_key_returns_none<S: KvStore>(store: &S, ns: &str) {
    assert!(store.get(&key(ns, "nope")).await.unwrap().is_none());
}

pub async fn set_then_get_returns_bytes<S: KvStore>(store: &S, ns: &str) {
    let k = key(ns, "k");
    store.set(&k, b"hello".to_vec(), None).await.unwrap();
    assert_eq!(store.get(&k).await.unwrap(), Some(b"hello".to_vec()));
}

pub async fn delete_reports_whether_entry_existed<S: KvStore>(store: &S, ns: &str) {
    let k = key(ns, "k");
    store.set(&k, b"v".to_vec(), None).await.unwrap();

    assert!(store.delete(&k).await.unwrap());
    assert!(!store.delete(&k).await.unwrap());
    assert!(store.get(&k).await.unwrap().is_none());
}

pub async fn set_if_absent_second_writer_loses<S: KvStore>(store: &S, ns: &str) {
    let k = key(ns, "k");

    assert!(store.set_if_absent(&k, b"first".to_vec(), None).await.unwrap());
    assert!(!store.set_if_absent(&k, b"second".to_vec(), None).await.unwrap());
    assert_eq!(store.get(&k).await.unwrap(), Some(b"first".to_vec()));
}

pub async fn watched_commit_writes_transform_output<S: KvStore>(store: &S, ns: &str) {
    let k = key(ns, "n");
    store.set(&k, b"1".to_vec(), None).await.unwrap();

    let outcome = store
        .watched_commit::<(), _>(&k, |current| {
            assert_eq!(current, Some(&b"1"[..]));
            Ok(b"2".to_vec())
        })
        .await
        .unwrap();

    assert!(matches!(outcome, CommitOutcome::Committed));
    assert_eq!(store.get(&k).await.unwrap(), Some(b"2".to_vec()));
}

pub async fn watched_commit_abort_leaves_value_untouched<S: KvStore>(store: &S, ns: &str) {
    let k = key(ns, "n");
    store.set(&k, b"1".to_vec(), None).await.unwrap();

    let outcome = store.watched_commit(&k, |_| Err("nope")).await.unwrap();

    assert!(matches!(outcome, CommitOutcome::Aborted("nope")));
    assert_eq!(store.get(&k).await.unwrap(), Some(b"1".to_vec()));
}

pub async fn watched_commit_sees_none_for_absent_key<S: KvStore>(store: &S, ns: &str) {
    let k = key(ns, "fresh");

    let outcome = store
        .watched_commit::<(), _>(&k, |current| {
            assert!(current.is_none());
            Ok(b"created".to_vec())
        })
        .await
        .unwrap();

    assert!(matches!(outcome, CommitOutcome::Committed));
    assert_eq!(store.get(&k).await.unwrap(), Some(b"created".to_vec()));
}

/// Each task retries its own increment until it commits. With a real
/// compare-and-swap every increment lands exactly once.
pub async fn racing_increments_never_lose_updates<S: KvStore>(store: Arc<S>, ns: &str) {
    const TASKS: u64 = 32;
    let k = key(ns, "counter");
    store.set(&k, b"0".to_vec(), None).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..TASKS {
        let store = Arc::clone(&store);
        let k = k.clone();
        tasks.push(tokio::spawn(async move {
            loop {
                let outcome = store
                    .watched_commit::<(), _>(&k, |current| {
                        let text = std::str::from_utf8(current.unwrap()).unwrap();
                        let n: u64 = text.parse().unwrap();
                        Ok((n + 1).to_string().into_bytes())
                    })
                    .await
                    .unwrap();
                if matches!(outcome, CommitOutcome::Committed) {
                    break;
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(
        store.get(&k).await.unwrap(),
        Some(TASKS.to_string().into_bytes())
    );
}
