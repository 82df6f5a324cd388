//! End-to-end integration tests driving a full hand through a live
//! `RoomActor` via `RoomRegistry`/`RoomHandle`, exercising join, start,
//! multi-street betting, and showdown chip settlement together.

use room_poker::action::ActionKind;
use room_poker::registry::RoomRegistry;
use room_poker::room::{Phase, RoomStatus};
use room_poker::store::InMemoryStore;
use std::sync::Arc;

fn registry() -> RoomRegistry {
    RoomRegistry::new(Arc::new(InMemoryStore::new()))
}

#[tokio::test]
async fn heads_up_hand_checks_down_to_showdown_and_conserves_chips() {
    let registry = registry();
    let handle = registry
        .create_room("heads up".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();

    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    handle.join("bob".into(), "bob".into(), 500).await.unwrap();

    let total_before: u32 = 1000;

    let snapshot = handle.start_hand("alice".into()).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Preflop);
    assert_eq!(snapshot.pot, 15); // small blind 5 + big blind 10

    // Drive the hand to showdown by having both seats just call/check every
    // street: whichever seat is first to act, call; the other, check.
    loop {
        let snapshot = handle.get_state(None).await.unwrap();
        if snapshot.phase == Phase::Idle {
            break;
        }
        let Some(turn) = snapshot.current_turn else { break };
        let player = &snapshot.players[turn];
        let action = if player.bet < snapshot.current_bet {
            ActionKind::Call
        } else {
            ActionKind::Check
        };
        let player_id = player.id.clone();
        let result = handle.act(player_id, action).await;
        assert!(result.is_ok(), "action should be accepted: {result:?}");
    }

    let final_state = handle.get_state(None).await.unwrap();
    assert_eq!(final_state.status, RoomStatus::Waiting);
    let total_after: u32 = final_state.players.iter().map(|p| p.chips).sum();
    assert_eq!(total_before, total_after, "no chips may be created or destroyed across a hand");
}

#[tokio::test]
async fn folding_preflop_ends_the_hand_uncontested_and_conserves_chips() {
    let registry = registry();
    let handle = registry
        .create_room("fold test".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 300).await.unwrap();
    handle.join("bob".into(), "bob".into(), 300).await.unwrap();

    let snapshot = handle.start_hand("alice".into()).await.unwrap();
    let first_to_act = snapshot.current_turn.unwrap();
    let player_id = snapshot.players[first_to_act].id.clone();

    let after_fold = handle.act(player_id, ActionKind::Fold).await.unwrap();
    assert_eq!(after_fold.phase, Phase::Idle);
    let total: u32 = after_fold.players.iter().map(|p| p.chips).sum();
    assert_eq!(total, 600);
}

#[tokio::test]
async fn three_handed_hand_with_all_in_runs_out_the_board() {
    let registry = registry();
    let handle = registry
        .create_room("three handed".into(), "alice".into(), 6, 20, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 1000).await.unwrap();
    handle.join("bob".into(), "bob".into(), 1000).await.unwrap();
    handle.join("carol".into(), "carol".into(), 1000).await.unwrap();

    handle.start_hand("alice".into()).await.unwrap();

    loop {
        let snapshot = handle.get_state(None).await.unwrap();
        if snapshot.phase == Phase::Idle {
            break;
        }
        let Some(turn) = snapshot.current_turn else { break };
        let player = &snapshot.players[turn];
        let player_id = player.id.clone();
        let action = if player.bet < snapshot.current_bet {
            ActionKind::AllIn
        } else {
            ActionKind::Check
        };
        let result = handle.act(player_id, action).await;
        assert!(result.is_ok(), "action should be accepted: {result:?}");
    }

    let final_state = handle.get_state(None).await.unwrap();
    let total: u32 = final_state.players.iter().map(|p| p.chips).sum();
    assert_eq!(total, 3000, "all-in runout must conserve total chips");
}
