//! Per-room fanout of state-change notifications to subscribers.
//!
//! A full subscriber is never allowed to block the coordinator: a `Full`
//! channel just drops the notification (the subscriber will catch up on
//! its next successful push, or on a later `get_state` poll), while a
//! `Closed` one is pruned so the map doesn't grow without bound.
//!
//! Every subscriber gets its *own* rendering of the room (§4.E): hole cards
//! of other seats are redacted unless the hand reached showdown unfolded,
//! so `publish` calls `view::snapshot_for` once per subscriber rather than
//! broadcasting one shared snapshot.

use crate::room::Room;
use crate::view::{self, RoomSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// The envelope kinds described in §6's streaming-operations contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    PlayerJoined,
    PlayerLeft,
    HandStarted,
    ActionApplied,
    PhaseAdvanced,
    Showdown,
    HandEnded,
    WaitingForPlayers,
    Error,
}

impl From<&crate::action::HandOutcome> for EventKind {
    fn from(outcome: &crate::action::HandOutcome) -> Self {
        use crate::action::HandOutcome;
        match outcome {
            HandOutcome::HandStarted => EventKind::HandStarted,
            HandOutcome::ActionApplied { .. } => EventKind::ActionApplied,
            HandOutcome::PhaseAdvanced => EventKind::PhaseAdvanced,
            HandOutcome::Showdown => EventKind::Showdown,
            HandOutcome::HandEnded => EventKind::HandEnded,
            HandOutcome::WaitingForPlayers => EventKind::WaitingForPlayers,
        }
    }
}

/// A notification pushed to one subscriber: its own per-player-redacted
/// rendering of the room, tagged with why it was sent.
#[derive(Clone, Debug)]
pub struct StateChangeNotification {
    pub room_id: i64,
    pub kind: EventKind,
    pub snapshot: RoomSnapshot,
}

const SUBSCRIBER_CHANNEL_CAPACITY: usize = 32;

/// Fanout registry for one room's subscribers, keyed by player id.
#[derive(Default)]
pub struct SubscriberBus {
    subscribers: HashMap<String, mpsc::Sender<StateChangeNotification>>,
}

impl SubscriberBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register `player_id` for notifications, returning the receiving
    /// half. Replaces any existing subscription for that player.
    pub fn subscribe(&mut self, player_id: String) -> mpsc::Receiver<StateChangeNotification> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        self.subscribers.insert(player_id, tx);
        rx
    }

    pub fn unsubscribe(&mut self, player_id: &str) {
        self.subscribers.remove(player_id);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Render and push `room`'s current state to every subscriber, each
    /// seeing only their own hole cards. A full channel just drops the
    /// notification; a closed one is pruned.
    pub fn publish(&mut self, room: &Room, kind: EventKind) {
        self.subscribers.retain(|player_id, sender| {
            let notification = StateChangeNotification {
                room_id: room.id,
                kind,
                snapshot: view::snapshot_for(room, Some(player_id.as_str())),
            };
            match sender.try_send(notification) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("subscriber {player_id} channel full, dropping notification");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("subscriber {player_id} disconnected, removing");
                    false
                }
            }
        });
    }

    /// Push a single rendered notification to one subscriber directly, used
    /// to deliver the full snapshot a freshly (re)subscribed or
    /// backpressure-detached client is owed before incremental events
    /// resume (§5 backpressure).
    pub fn notify_one(&mut self, player_id: &str, room: &Room, kind: EventKind) {
        if let Some(sender) = self.subscribers.get(player_id) {
            let notification = StateChangeNotification {
                room_id: room.id,
                kind,
                snapshot: view::snapshot_for(room, Some(player_id)),
            };
            let _ = sender.try_send(notification);
        }
    }
}
