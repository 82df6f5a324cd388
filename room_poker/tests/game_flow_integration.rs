//! Integration tests for lobby/room flow: joining, leaving, seat limits,
//! and who may start or end a room.

use room_poker::errors::ClientError;
use room_poker::registry::RoomRegistry;
use room_poker::room::RoomStatus;
use room_poker::store::InMemoryStore;
use std::sync::Arc;

fn registry() -> RoomRegistry {
    RoomRegistry::new(Arc::new(InMemoryStore::new()))
}

#[tokio::test]
async fn two_players_join_a_waiting_room() {
    let registry = registry();
    let handle = registry
        .create_room("table one".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();

    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    let snapshot = handle.join("bob".into(), "bob".into(), 500).await.unwrap();

    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.status, RoomStatus::Waiting);
}

#[tokio::test]
async fn cannot_start_hand_with_one_player() {
    let registry = registry();
    let handle = registry
        .create_room("table".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 500).await.unwrap();

    let err = handle.start_hand("alice".into()).await.unwrap_err();
    assert!(matches!(
        err,
        room_poker::errors::CoordinatorError::Client(ClientError::NotEnoughPlayers)
    ));
}

#[tokio::test]
async fn only_the_creator_may_start_a_hand() {
    let registry = registry();
    let handle = registry
        .create_room("table".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    handle.join("bob".into(), "bob".into(), 500).await.unwrap();

    let err = handle.start_hand("bob".into()).await.unwrap_err();
    assert!(matches!(
        err,
        room_poker::errors::CoordinatorError::Client(ClientError::NotTheCreator)
    ));
}

#[tokio::test]
async fn joining_a_full_room_is_rejected() {
    let registry = registry();
    let handle = registry
        .create_room("two seater".into(), "alice".into(), 2, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    handle.join("bob".into(), "bob".into(), 500).await.unwrap();

    let err = handle.join("carol".into(), "carol".into(), 500).await.unwrap_err();
    assert_eq!(err, ClientError::RoomFull);
}

#[tokio::test]
async fn leaving_before_a_hand_starts_frees_the_seat_and_id() {
    let registry = registry();
    let handle = registry
        .create_room("table".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    handle.join("bob".into(), "bob".into(), 500).await.unwrap();

    handle.leave("bob".into()).await.unwrap();
    let snapshot = handle.get_state(None).await.unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].id, "alice");
}

#[tokio::test]
async fn re_joining_with_a_seat_already_held_is_idempotent() {
    let registry = registry();
    let handle = registry
        .create_room("table".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    let snapshot = handle.join("alice".into(), "alice".into(), 999).await.unwrap();

    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].chips, 500, "re-joining must not top up or duplicate the seat");
}

#[tokio::test]
async fn list_waiting_reflects_rooms_still_accepting_players() {
    let registry = registry();
    let full = registry
        .create_room("full".into(), "alice".into(), 2, 10, None)
        .await
        .unwrap();
    full.join("alice".into(), "alice".into(), 500).await.unwrap();
    full.join("bob".into(), "bob".into(), 500).await.unwrap();

    let open = registry
        .create_room("open".into(), "carol".into(), 6, 10, None)
        .await
        .unwrap();
    open.join("carol".into(), "carol".into(), 500).await.unwrap();

    let waiting = registry.list_waiting().await;
    let ids: Vec<i64> = waiting.iter().map(|r| r.id).collect();
    assert!(ids.contains(&open.room_id()));
    assert!(!ids.contains(&full.room_id()));
}

#[tokio::test]
async fn closing_a_room_resolves_any_in_progress_hand() {
    let registry = registry();
    let handle = registry
        .create_room("table".into(), "alice".into(), 6, 10, None)
        .await
        .unwrap();
    handle.join("alice".into(), "alice".into(), 500).await.unwrap();
    handle.join("bob".into(), "bob".into(), 500).await.unwrap();
    handle.start_hand("alice".into()).await.unwrap();

    registry.close_room(handle.room_id(), "alice".into()).await.unwrap();

    let err = registry.get(handle.room_id()).await.unwrap_err();
    assert_eq!(err, room_poker::registry::RegistryError::NotFound);
}
