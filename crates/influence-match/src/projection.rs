//! Projection from the authoritative record to what clients may see.
//!
//! All three functions are pure and total. [`project_public`] is the only
//! view that gets broadcast and it never contains an unrevealed role.

use influence_protocol::{
    OwnInfluence, PlayerId, PlayerPublicInfo, PrivateHand, PublicInfluence, PublicMatchState,
};

use crate::{Influence, Match, Player};

/// The shared public view of a match.
pub fn project_public(m: &Match) -> PublicMatchState {
    PublicMatchState {
        match_id: m.id.clone(),
        join_code: m.join_code.clone(),
        started: m.started,
        admin_id: m.admin_id.clone(),
        finished: m.finished,
        turn_index: m.turn_index,
        players: m.players.iter().map(project_player).collect(),
        deck_length: m.deck.len(),
    }
}

/// Public info for one player, with face-down roles stripped.
pub fn project_player(p: &Player) -> PlayerPublicInfo {
    PlayerPublicInfo {
        id: p.id.clone(),
        nickname: p.nickname.clone(),
        coins: p.coins,
        alive: p.alive,
        influences: p.influences.iter().map(redact).collect(),
    }
}

fn redact(inf: &Influence) -> PublicInfluence {
    PublicInfluence {
        role: inf.revealed.then_some(inf.role),
        revealed: inf.revealed,
    }
}

/// The caller's own hand, roles included. `None` if they aren't seated.
pub fn project_hand(m: &Match, player_id: &PlayerId) -> Option<PrivateHand> {
    let player = m.player(player_id)?;
    Some(PrivateHand {
        match_id: m.id.clone(),
        player_id: player.id.clone(),
        influences: player
            .influences
            .iter()
            .map(|inf| OwnInfluence {
                role: inf.role,
                revealed: inf.revealed,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use influence_protocol::{MatchId, Role};

    use super::*;

    fn match_with_hand() -> Match {
        let mut alice = Player::new("alice", 2);
        alice.influences = vec![
            Influence {
                role: Role::Contessa,
                revealed: true,
            },
            Influence::hidden(Role::Assassin),
        ];
        let mut m = Match::new(MatchId::new("m"), "ABC234", alice);
        m.started = true;
        m.deck = vec![Influence::hidden(Role::Duke); 13];
        m
    }

    #[test]
    fn test_project_public_hides_unrevealed_role() {
        let m = match_with_hand();

        let view = project_public(&m);
        let json = serde_json::to_string(&view).unwrap();

        let influences = &view.players[0].influences;
        assert_eq!(influences[0].role, Some(Role::Contessa));
        assert!(influences[0].revealed);
        assert_eq!(influences[1].role, None);
        assert!(!influences[1].revealed);
        assert!(json.contains("Contessa"));
        assert!(!json.contains("Assassin"), "leaked hidden role: {json}");
        assert!(!json.contains("Duke"), "leaked deck contents: {json}");
        assert_eq!(view.deck_length, 13);
    }

    #[test]
    fn test_project_public_copies_scalars() {
        let m = match_with_hand();

        let view = project_public(&m);

        assert_eq!(view.match_id, m.id);
        assert_eq!(view.join_code, "ABC234");
        assert_eq!(view.admin_id, m.admin_id);
        assert!(view.started);
        assert!(!view.finished);
        assert_eq!(view.turn_index, 0);
        assert_eq!(view.players[0].coins, 2);
    }

    #[test]
    fn test_project_hand_includes_hidden_roles() {
        let m = match_with_hand();
        let alice = m.players[0].id.clone();

        let hand = project_hand(&m, &alice).unwrap();

        assert_eq!(hand.influences[1].role, Role::Assassin);
        assert!(!hand.influences[1].revealed);
    }

    #[test]
    fn test_project_hand_unknown_player_none() {
        assert!(project_hand(&match_with_hand(), &PlayerId::new("ghost")).is_none());
    }
}
