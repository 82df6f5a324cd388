//! The room directory (§4.F): create, look up, and list rooms backed by a
//! shared `SnapshotStore`.
//!
//! Each room runs as its own `RoomActor` (`coordinator.rs`); this registry
//! only tracks the `RoomHandle`s, assigns ids, and answers the `listRooms`
//! query. Closing a room always routes `forceEnd` through the coordinator
//! first so an in-progress hand is resolved rather than abandoned mid-street.

use crate::coordinator::{RoomActor, RoomHandle};
use crate::room::{Chips, Room, RoomStatus};
use crate::store::SnapshotStore;
use crate::view::RoomSummary;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum RegistryError {
    #[error("room not found")]
    NotFound,
    #[error("room name must not be empty")]
    EmptyName,
    #[error("seat limit must be between 2 and 10")]
    InvalidSeatLimit,
    #[error("min bet must be greater than zero")]
    InvalidMinBet,
    #[error("max bet must be greater than or equal to min bet")]
    InvalidMaxBet,
}

/// Bounds enforced on room creation (§4.G configuration).
pub struct RoomLimits {
    pub min_seats: usize,
    pub max_seats: usize,
}

impl Default for RoomLimits {
    fn default() -> Self {
        Self {
            min_seats: 2,
            max_seats: 10,
        }
    }
}

/// The live directory of rooms. Cloneable; every clone shares the same
/// underlying map and id counter.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<i64, RoomHandle>>>,
    next_id: Arc<RwLock<i64>>,
    store: Arc<dyn SnapshotStore>,
    limits: Arc<RoomLimits>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_limits(store, RoomLimits::default())
    }

    #[must_use]
    pub fn with_limits(store: Arc<dyn SnapshotStore>, limits: RoomLimits) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
            store,
            limits: Arc::new(limits),
        }
    }

    /// Create a new room, spawn its actor, and register the handle.
    pub async fn create_room(
        &self,
        name: String,
        creator: String,
        seat_limit: usize,
        min_bet: Chips,
        max_bet: Option<Chips>,
    ) -> Result<RoomHandle, RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if seat_limit < self.limits.min_seats || seat_limit > self.limits.max_seats {
            return Err(RegistryError::InvalidSeatLimit);
        }
        if min_bet == 0 {
            return Err(RegistryError::InvalidMinBet);
        }
        if let Some(max_bet) = max_bet {
            if max_bet < min_bet {
                return Err(RegistryError::InvalidMaxBet);
            }
        }

        let mut next_id = self.next_id.write().await;
        let room_id = *next_id;
        *next_id += 1;
        drop(next_id);

        let room = Room::new(room_id, name, creator, seat_limit, min_bet, max_bet);
        let handle = RoomActor::spawn(room, self.store.clone());

        self.rooms.write().await.insert(room_id, handle.clone());
        log::info!("created room {room_id}");
        Ok(handle)
    }

    pub async fn get(&self, room_id: i64) -> Result<RoomHandle, RegistryError> {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    /// Rooms still accepting players, newest first (§4.F).
    pub async fn list_waiting(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.read().await;
        let mut summaries = Vec::new();
        for handle in rooms.values() {
            if let Some(summary) = handle.summary().await {
                if summary.status == RoomStatus::Waiting
                    && summary.current_players < summary.seat_limit
                {
                    summaries.push(summary);
                }
            }
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Tear down a room: resolve any in-progress hand via `forceEnd` before
    /// dropping the handle, so a close never abandons a hand mid-street.
    pub async fn close_room(&self, room_id: i64, requested_by: String) -> Result<(), RegistryError> {
        let handle = self.get(room_id).await?;
        let _ = handle.force_end(requested_by).await;
        self.rooms.write().await.remove(&room_id);
        log::info!("closed room {room_id}");
        Ok(())
    }

    pub async fn active_room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let registry = registry();
        let handle = registry
            .create_room("table one".into(), "alice".into(), 6, 10, None)
            .await
            .unwrap();
        let fetched = registry.get(handle.room_id()).await.unwrap();
        assert_eq!(fetched.room_id(), handle.room_id());
    }

    #[tokio::test]
    async fn get_unknown_room_is_not_found() {
        let registry = registry();
        assert_eq!(registry.get(999).await.unwrap_err(), RegistryError::NotFound);
    }

    #[tokio::test]
    async fn invalid_seat_limit_is_rejected() {
        let registry = registry();
        let err = registry
            .create_room("table".into(), "alice".into(), 1, 10, None)
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidSeatLimit);
    }

    #[tokio::test]
    async fn seat_limit_of_ten_is_accepted() {
        let registry = registry();
        registry
            .create_room("table".into(), "alice".into(), 10, 10, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn max_bet_below_min_bet_is_rejected() {
        let registry = registry();
        let err = registry
            .create_room("table".into(), "alice".into(), 6, 100, Some(50))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidMaxBet);
    }

    #[tokio::test]
    async fn list_waiting_excludes_full_rooms() {
        let registry = registry();
        let handle = registry
            .create_room("table".into(), "alice".into(), 2, 10, None)
            .await
            .unwrap();
        handle.join("alice".into(), "alice".into(), 500).await.unwrap();
        handle.join("bob".into(), "bob".into(), 500).await.unwrap();

        let waiting = registry.list_waiting().await;
        assert!(waiting.iter().all(|r| r.id != handle.room_id()));
    }

    #[tokio::test]
    async fn close_room_removes_it_from_the_directory() {
        let registry = registry();
        let handle = registry
            .create_room("table".into(), "alice".into(), 6, 10, None)
            .await
            .unwrap();
        registry.close_room(handle.room_id(), "alice".into()).await.unwrap();
        assert_eq!(registry.get(handle.room_id()).await.unwrap_err(), RegistryError::NotFound);
    }
}
