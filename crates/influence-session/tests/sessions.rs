//! Integration tests for sessions and join codes sharing one store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use influence_protocol::{MatchId, PlayerId};
use influence_session::{
    JoinCodeAllocator, JoinCodeConfig, SessionConfig, SessionError, SessionManager,
};
use influence_store::{KvStore, MemoryStore};

#[tokio::test]
async fn test_sessions_survive_match_record_removal() {
    // Sessions hold ids by value; removing the match doesn't touch them.
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(Arc::clone(&store), SessionConfig::default());
    let match_id = MatchId::new("m-1");
    store
        .set("match:m-1", b"{}".to_vec(), None)
        .await
        .unwrap();
    let token = sessions
        .create_session(&match_id, &PlayerId::new("alice"))
        .await
        .unwrap();

    store.delete("match:m-1").await.unwrap();

    let session = sessions.resolve_session(&match_id, &token).await.unwrap();
    assert_eq!(session.player_id, PlayerId::new("alice"));
}

#[tokio::test]
async fn test_many_reservations_yield_distinct_codes() {
    let store = Arc::new(MemoryStore::new());
    let codes = JoinCodeAllocator::new(Arc::clone(&store), JoinCodeConfig::default());

    let mut seen = HashSet::new();
    for i in 0..200 {
        let match_id = MatchId::new(format!("m-{i}"));
        let code = codes.reserve(&match_id).await.unwrap();
        assert!(seen.insert(code.clone()), "code {code} handed out twice");
        assert_eq!(codes.resolve(&code).await.unwrap(), match_id);
    }
}

#[tokio::test(start_paused = true)]
async fn test_code_and_session_expire_independently() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(Arc::clone(&store), SessionConfig::default());
    let codes = JoinCodeAllocator::new(Arc::clone(&store), JoinCodeConfig::default());
    let match_id = MatchId::new("m-1");

    let code = codes.reserve(&match_id).await.unwrap();
    let token = sessions
        .create_session(&match_id, &PlayerId::new("alice"))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(2 * 60 * 60)).await;

    assert!(matches!(
        codes.resolve(&code).await,
        Err(SessionError::JoinCodeNotFound(_))
    ));
    assert!(sessions.resolve_session(&match_id, &token).await.is_ok());

    tokio::time::advance(Duration::from_secs(23 * 60 * 60)).await;

    assert!(matches!(
        sessions.resolve_session(&match_id, &token).await,
        Err(SessionError::InvalidSession)
    ));
}
