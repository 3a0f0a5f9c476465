//! Integration tests for `GameServer::handle`: the full request boundary.

use std::sync::Arc;

use influence::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

fn server() -> GameServer<MemoryStore, ChannelPublisher> {
    GameServerBuilder::new().build(Arc::new(MemoryStore::new()), Arc::new(ChannelPublisher::new()))
}

fn onboarded(response: Response) -> OnboardingResult {
    match response {
        Response::Onboarded(result) => result,
        other => panic!("expected Onboarded, got {other:?}"),
    }
}

fn state(response: Response) -> PublicMatchState {
    match response {
        Response::State(state) => state,
        other => panic!("expected State, got {other:?}"),
    }
}

async fn create(server: &GameServer<MemoryStore, ChannelPublisher>, nickname: &str) -> OnboardingResult {
    let response = server
        .handle(Request::Create(CreateMatchRequest {
            nickname: nickname.into(),
        }))
        .await
        .unwrap();
    onboarded(response)
}

async fn join(
    server: &GameServer<MemoryStore, ChannelPublisher>,
    code: &str,
    nickname: &str,
) -> Result<OnboardingResult, ErrorBody> {
    server
        .handle(Request::Join(JoinMatchRequest {
            join_code: code.into(),
            nickname: nickname.into(),
        }))
        .await
        .map(onboarded)
}

/// Creates alice's match, seats bob, starts it.
async fn started(
    server: &GameServer<MemoryStore, ChannelPublisher>,
) -> (OnboardingResult, OnboardingResult, PublicMatchState) {
    let alice = create(server, "alice").await;
    let bob = join(server, &alice.state.join_code, "bob").await.unwrap();
    let response = server
        .handle(Request::Start {
            match_id: alice.state.match_id.clone(),
            token: alice.token.clone(),
        })
        .await
        .unwrap();
    (alice, bob, state(response))
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_returns_token_and_lobby() {
    let server = server();

    let alice = create(&server, "alice").await;

    assert_eq!(alice.token.len(), 32);
    assert_eq!(alice.state.join_code.len(), 6);
    assert_eq!(alice.player.nickname, "alice");
    assert!(!alice.state.started);
}

#[tokio::test]
async fn test_onboarding_serializes_under_match_key() {
    let server = server();
    let alice = create(&server, "alice").await;

    let json = serde_json::to_value(Response::Onboarded(alice)).unwrap();

    assert!(json["match"]["matchID"].is_string());
    assert_eq!(json["player"]["nickname"], "alice");
    assert!(json["token"].is_string());
}

#[tokio::test]
async fn test_declare_decodes_body_and_applies_income() {
    let server = server();
    let (alice, bob, started) = started(&server).await;
    let current = &started.players[started.turn_index].id;
    let token = if *current == alice.player.id {
        alice.token.clone()
    } else {
        bob.token.clone()
    };

    let response = server
        .handle(Request::Declare {
            match_id: started.match_id.clone(),
            token,
            body: br#"{"actionName":"income"}"#.to_vec(),
        })
        .await
        .unwrap();

    let Response::Action(action) = response else {
        panic!("expected Action");
    };
    assert_eq!(action.action_name, ActionKind::Income);
    assert_eq!(&action.actor_player_id, current);
}

#[tokio::test]
async fn test_declare_malformed_body_is_malformed_request() {
    let server = server();
    let (alice, _bob, started) = started(&server).await;

    let err = server
        .handle(Request::Declare {
            match_id: started.match_id,
            token: alice.token,
            body: b"{not json".to_vec(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, "malformed_request");
}

#[tokio::test]
async fn test_declare_unknown_action_is_invalid_action() {
    let server = server();
    let (alice, _bob, started) = started(&server).await;

    let err = server
        .handle(Request::Declare {
            match_id: started.match_id,
            token: alice.token,
            body: br#"{"actionName":"assassinate"}"#.to_vec(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, "invalid_action");
}

#[tokio::test]
async fn test_state_with_bad_token_is_invalid_session() {
    let server = server();
    let alice = create(&server, "alice").await;

    let err = server
        .handle(Request::State {
            match_id: alice.state.match_id,
            token: "deadbeef".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, ErrorBody { code: "invalid_session".into() });
}

#[tokio::test]
async fn test_hand_returns_own_roles_only_to_owner() {
    let server = server();
    let (_alice, bob, started) = started(&server).await;

    let response = server
        .handle(Request::Hand {
            match_id: started.match_id.clone(),
            token: bob.token.clone(),
        })
        .await
        .unwrap();

    let Response::Hand(hand) = response else {
        panic!("expected Hand");
    };
    assert_eq!(hand.player_id, bob.player.id);
    assert_eq!(hand.influences.len(), 2);

    // The broadcast view never carries those roles.
    let view = serde_json::to_string(&started).unwrap();
    assert!(!view.contains("\"role\""));
}

#[tokio::test]
async fn test_seventh_join_is_match_full() {
    let server = server();
    let alice = create(&server, "alice").await;
    for name in ["b", "c", "d", "e", "f"] {
        join(&server, &alice.state.join_code, name).await.unwrap();
    }

    let err = join(&server, &alice.state.join_code, "g").await.unwrap_err();

    assert_eq!(err.code, "match_full");
}

#[tokio::test]
async fn test_builder_applies_match_config() {
    let server = GameServerBuilder::new()
        .match_config(MatchConfig {
            min_players: 3,
            ..MatchConfig::default()
        })
        .build(Arc::new(MemoryStore::new()), Arc::new(ChannelPublisher::new()));
    let alice = create(&server, "alice").await;
    join(&server, &alice.state.join_code, "bob").await.unwrap();

    let err = server
        .handle(Request::Start {
            match_id: alice.state.match_id,
            token: alice.token,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, "not_enough_players");
}

#[tokio::test]
async fn test_builder_clamps_player_range_to_supported_table() {
    let server = GameServerBuilder::new()
        .match_config(MatchConfig {
            min_players: 1,
            max_players: 10,
            copies_per_role: 5,
            ..MatchConfig::default()
        })
        .build(Arc::new(MemoryStore::new()), Arc::new(ChannelPublisher::new()));
    assert_eq!(server.config().rules.min_players, 2);
    assert_eq!(server.config().rules.max_players, 6);

    let alice = create(&server, "alice").await;
    let err = server
        .handle(Request::Start {
            match_id: alice.state.match_id.clone(),
            token: alice.token.clone(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, "not_enough_players");

    for name in ["b", "c", "d", "e", "f"] {
        join(&server, &alice.state.join_code, name).await.unwrap();
    }
    let err = join(&server, &alice.state.join_code, "g").await.unwrap_err();
    assert_eq!(err.code, "match_full");
}
