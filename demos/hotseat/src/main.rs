//! Plays a whole match locally: three players share one process, take
//! income until they can afford a coup, and coup the next player in line
//! until one is left standing.
//!
//! Run with `RUST_LOG=debug cargo run -p hotseat` to see every retry and
//! rejected intent.

use std::sync::Arc;

use influence::prelude::*;

type Server = GameServer<MemoryStore, ChannelPublisher>;

const MAX_TURNS: usize = 200;

fn onboarded(response: Response) -> Result<OnboardingResult, String> {
    match response {
        Response::Onboarded(result) => Ok(result),
        other => Err(format!("unexpected response: {other:?}")),
    }
}

fn public_state(response: Response) -> Result<PublicMatchState, String> {
    match response {
        Response::State(state) => Ok(state),
        other => Err(format!("unexpected response: {other:?}")),
    }
}

/// Picks this turn's move for the current player.
fn choose(state: &PublicMatchState) -> (ActionKind, Option<PlayerId>) {
    let count = state.players.len();
    let me = &state.players[state.turn_index];
    if me.coins < 7 {
        return (ActionKind::Income, None);
    }
    let target = (1..count)
        .map(|step| &state.players[(state.turn_index + step) % count])
        .find(|p| p.alive)
        .map(|p| p.id.clone());
    (ActionKind::Coup, target)
}

async fn play(server: &Server, seats: &[OnboardingResult]) -> Result<(), String> {
    let match_id = seats[0].state.match_id.clone();
    let admin_token = seats[0].token.clone();

    let mut state = public_state(
        server
            .handle(Request::Start {
                match_id: match_id.clone(),
                token: admin_token.clone(),
            })
            .await
            .map_err(|e| e.code)?,
    )?;

    for _ in 0..MAX_TURNS {
        if state.finished {
            break;
        }
        let current = &state.players[state.turn_index];
        let seat = seats
            .iter()
            .find(|s| s.player.id == current.id)
            .ok_or("current player has no seat")?;

        let (action, target) = choose(&state);
        let body = serde_json::to_vec(&DeclareActionRequest {
            action_name: action.name().to_string(),
            target_player_id: target,
        })
        .map_err(|e| e.to_string())?;
        server
            .handle(Request::Declare {
                match_id: match_id.clone(),
                token: seat.token.clone(),
                body,
            })
            .await
            .map_err(|e| e.code)?;

        state = public_state(
            server
                .handle(Request::State {
                    match_id: match_id.clone(),
                    token: admin_token.clone(),
                })
                .await
                .map_err(|e| e.code)?,
        )?;
    }

    for p in &state.players {
        println!(
            "{:>6}  coins={:<2} alive={:<5} influences={}",
            p.nickname,
            p.coins,
            p.alive,
            p.influences
                .iter()
                .map(|inf| match inf.role {
                    Some(role) => role.to_string(),
                    None => "?".to_string(),
                })
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");

    let publisher = Arc::new(ChannelPublisher::new());
    let server = GameServerBuilder::new().build(Arc::new(MemoryStore::new()), Arc::clone(&publisher));

    let admin = onboarded(
        server
            .handle(Request::Create(CreateMatchRequest {
                nickname: "alice".into(),
            }))
            .await
            .map_err(|e| e.code)?,
    )?;
    println!("join code: {}", admin.state.join_code);

    let mut seats = vec![admin];
    for nickname in ["bob", "carol"] {
        let seat = onboarded(
            server
                .handle(Request::Join(JoinMatchRequest {
                    join_code: seats[0].state.join_code.clone(),
                    nickname: nickname.into(),
                }))
                .await
                .map_err(|e| e.code)?,
        )?;
        seats.push(seat);
    }

    // Alice's feed, printed as it arrives.
    let match_id = seats[0].state.match_id.clone();
    let mut feed = publisher.subscribe(&match_id, &seats[0].player.id).await;
    let printer = tokio::spawn(async move {
        while let Some(event) = feed.recv().await {
            let finished = event.event_type == EventType::MatchFinished;
            match &event.payload {
                Some(payload) => println!("[{:?}] {payload}", event.event_type),
                None => println!("[{:?}]", event.event_type),
            }
            if finished {
                break;
            }
        }
    });

    play(&server, &seats).await?;

    publisher.unsubscribe(&match_id, &seats[0].player.id).await;
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "event printer stopped");
    }
    Ok(())
}
