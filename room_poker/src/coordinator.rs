//! The room coordinator (§4.D): the only path that mutates a `Room`.
//!
//! One `RoomActor` task owns one room. Callers talk to it through a cloneable
//! `RoomHandle` that sends a message and awaits a `oneshot` reply, so every
//! action and timer tick for a given room is serialized through the actor's
//! inbox in arrival order — the single-writer contract of §4.D. Persistence
//! writes and subscriber fanout happen after the exclusive `&mut self` borrow
//! inside `run` is released, against the snapshot just computed, as §5
//! requires of long-running suspension points.

use crate::action::{ActionKind, HandEvent, HandOutcome};
use crate::errors::{ClientError, CoordinatorError, InvariantViolation};
use crate::room::{Chips, Room, RoomStatus, Seat, SeatIndex};
use crate::state_machine;
use crate::store::{self, SnapshotStore};
use crate::subscriber::{EventKind, StateChangeNotification, SubscriberBus};
use crate::view::{self, RoomSnapshot, RoomSummary};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// The per-turn action clock (§4.D).
pub const TURN_DEADLINE: Duration = Duration::from_secs(30);
/// The disconnect reconnection grace window (§4.D).
pub const DISCONNECT_GRACE: Duration = Duration::from_secs(60);
/// How often the actor checks its deadlines for expiry. Timer callbacks
/// enqueue synthetic events onto the same inbox rather than calling the
/// state machine directly (§5); this tick is what notices an elapsed
/// deadline and performs that enqueue.
const DEADLINE_POLL_INTERVAL: Duration = Duration::from_millis(200);

const INBOX_CAPACITY: usize = 256;
const MAX_PERSIST_RETRIES: u32 = 3;

/// A request/response message sent to a `RoomActor`. Every variant that
/// mutates the room carries a `oneshot` reply channel so the caller can
/// await the resulting snapshot (or error) without blocking the actor's
/// next message.
enum CoordinatorMessage {
    Join {
        player_id: String,
        username: String,
        buy_in: Chips,
        response: oneshot::Sender<Result<RoomSnapshot, ClientError>>,
    },
    Leave {
        player_id: String,
        response: oneshot::Sender<Result<(), ClientError>>,
    },
    StartHand {
        player_id: String,
        response: oneshot::Sender<Result<RoomSnapshot, CoordinatorError>>,
    },
    Act {
        player_id: String,
        kind: ActionKind,
        response: oneshot::Sender<Result<RoomSnapshot, CoordinatorError>>,
    },
    ForceEnd {
        player_id: String,
        response: oneshot::Sender<Result<RoomSnapshot, CoordinatorError>>,
    },
    GetState {
        viewer_id: Option<String>,
        response: oneshot::Sender<Result<RoomSnapshot, ClientError>>,
    },
    Summary {
        response: oneshot::Sender<RoomSummary>,
    },
    Subscribe {
        player_id: String,
        response: oneshot::Sender<mpsc::Receiver<StateChangeNotification>>,
    },
    Unsubscribe {
        player_id: String,
    },
    Disconnect {
        player_id: String,
    },
    Reconnect {
        player_id: String,
    },
    /// Coordinator-generated: the turn clock elapsed for `seat`. Carries the
    /// seat index that was current *when the timer was armed*; a timer
    /// whose seat no longer owes action (folded, not on turn, phase moved
    /// on) is a tolerated no-op via the state machine's own rejection (§5
    /// cancellation).
    TurnTimeout {
        seat: SeatIndex,
    },
    /// Coordinator-generated: the reconnection grace window elapsed for a
    /// still-disconnected seat.
    GraceExpired {
        seat: SeatIndex,
    },
}

/// A cloneable, cheap-to-share reference to a running room. All methods
/// round-trip through the actor's single-writer inbox.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
    room_id: i64,
}

/// The actor is gone; its task panicked or the room was torn down.
#[derive(Debug, thiserror::Error)]
#[error("room actor is no longer running")]
pub struct RoomGone;

impl RoomHandle {
    #[must_use]
    pub fn room_id(&self) -> i64 {
        self.room_id
    }

    async fn roundtrip<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> CoordinatorMessage,
    ) -> Result<T, RoomGone> {
        let (tx, rx) = oneshot::channel();
        self.sender.send(build(tx)).await.map_err(|_| RoomGone)?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn join(
        &self,
        player_id: String,
        username: String,
        buy_in: Chips,
    ) -> Result<RoomSnapshot, ClientError> {
        self.roundtrip(|response| CoordinatorMessage::Join {
            player_id,
            username,
            buy_in,
            response,
        })
        .await
        .unwrap_or(Err(ClientError::RoomNotFound))
    }

    pub async fn leave(&self, player_id: String) -> Result<(), ClientError> {
        self.roundtrip(|response| CoordinatorMessage::Leave { player_id, response })
            .await
            .unwrap_or(Ok(()))
    }

    pub async fn start_hand(&self, player_id: String) -> Result<RoomSnapshot, CoordinatorError> {
        self.roundtrip(|response| CoordinatorMessage::StartHand { player_id, response })
            .await
            .unwrap_or(Err(CoordinatorError::Quarantined))
    }

    pub async fn act(
        &self,
        player_id: String,
        kind: ActionKind,
    ) -> Result<RoomSnapshot, CoordinatorError> {
        self.roundtrip(|response| CoordinatorMessage::Act {
            player_id,
            kind,
            response,
        })
        .await
        .unwrap_or(Err(CoordinatorError::Quarantined))
    }

    pub async fn force_end(&self, player_id: String) -> Result<RoomSnapshot, CoordinatorError> {
        self.roundtrip(|response| CoordinatorMessage::ForceEnd { player_id, response })
            .await
            .unwrap_or(Err(CoordinatorError::Quarantined))
    }

    pub async fn get_state(&self, viewer_id: Option<&str>) -> Result<RoomSnapshot, ClientError> {
        let viewer_id = viewer_id.map(str::to_owned);
        self.roundtrip(|response| CoordinatorMessage::GetState { viewer_id, response })
            .await
            .unwrap_or(Err(ClientError::RoomNotFound))
    }

    pub async fn summary(&self) -> Option<RoomSummary> {
        self.roundtrip(|response| CoordinatorMessage::Summary { response })
            .await
            .ok()
    }

    pub async fn subscribe(
        &self,
        player_id: String,
    ) -> Result<mpsc::Receiver<StateChangeNotification>, RoomGone> {
        self.roundtrip(|response| CoordinatorMessage::Subscribe { player_id, response })
            .await
    }

    pub async fn unsubscribe(&self, player_id: String) {
        let _ = self.sender.send(CoordinatorMessage::Unsubscribe { player_id }).await;
    }

    pub async fn disconnect(&self, player_id: String) {
        let _ = self.sender.send(CoordinatorMessage::Disconnect { player_id }).await;
    }

    pub async fn reconnect(&self, player_id: String) {
        let _ = self.sender.send(CoordinatorMessage::Reconnect { player_id }).await;
    }
}

/// A timer whose seat was correct when armed. The actor records the seat
/// index alongside the deadline so a stale timer (room state moved on
/// before it fired) can be recognized and dropped as a no-op.
#[derive(Clone, Copy)]
struct ArmedDeadline {
    seat: SeatIndex,
    at: Instant,
}

/// The actor task. Owns the only mutable reference to a room for its
/// lifetime.
pub struct RoomActor {
    room: Room,
    inbox: mpsc::Receiver<CoordinatorMessage>,
    self_sender: mpsc::Sender<CoordinatorMessage>,
    store: Arc<dyn SnapshotStore>,
    bus: SubscriberBus,
    rng: StdRng,
    turn_deadline: Option<ArmedDeadline>,
    grace_deadlines: HashMap<SeatIndex, Instant>,
    degraded: bool,
}

impl RoomActor {
    /// Spawn a fresh room and return the handle callers use to talk to it.
    #[must_use]
    pub fn spawn(room: Room, store: Arc<dyn SnapshotStore>) -> RoomHandle {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let room_id = room.id;
        let actor = RoomActor {
            room,
            inbox,
            self_sender: sender.clone(),
            store,
            bus: SubscriberBus::new(),
            rng: StdRng::from_os_rng(),
            turn_deadline: None,
            grace_deadlines: HashMap::new(),
            degraded: false,
        };
        tokio::spawn(actor.run());
        RoomHandle { sender, room_id }
    }

    async fn run(mut self) {
        let mut poll = tokio::time::interval(DEADLINE_POLL_INTERVAL);
        loop {
            tokio::select! {
                maybe_message = self.inbox.recv() => {
                    match maybe_message {
                        Some(message) => self.handle(message).await,
                        None => break,
                    }
                }
                _ = poll.tick() => {
                    self.check_deadlines().await;
                }
            }
        }
        log::info!("room {} actor stopped", self.room.id);
    }

    /// Enqueue synthetic timer events onto this actor's own inbox rather
    /// than calling the state machine directly (§5).
    async fn check_deadlines(&mut self) {
        let now = Instant::now();
        if let Some(deadline) = self.turn_deadline {
            if now >= deadline.at {
                self.turn_deadline = None;
                let _ = self
                    .self_sender
                    .send(CoordinatorMessage::TurnTimeout { seat: deadline.seat })
                    .await;
            }
        }
        let expired: Vec<SeatIndex> = self
            .grace_deadlines
            .iter()
            .filter(|(_, &at)| now >= at)
            .map(|(&seat, _)| seat)
            .collect();
        for seat in expired {
            self.grace_deadlines.remove(&seat);
            let _ = self
                .self_sender
                .send(CoordinatorMessage::GraceExpired { seat })
                .await;
        }
    }

    fn seat_of(&self, player_id: &str) -> Option<SeatIndex> {
        self.room.seats.iter().position(|s| s.player_id == player_id)
    }

    async fn handle(&mut self, message: CoordinatorMessage) {
        match message {
            CoordinatorMessage::Join {
                player_id,
                username,
                buy_in,
                response,
            } => {
                let result = self.handle_join(player_id, username, buy_in);
                if result.is_ok() {
                    self.after_mutation(EventKind::PlayerJoined).await;
                }
                let _ = response.send(result.map(|()| view::snapshot_for(&self.room, None)));
            }
            CoordinatorMessage::Leave { player_id, response } => {
                let result = self.handle_leave(&player_id);
                if result.is_ok() {
                    self.after_mutation(EventKind::PlayerLeft).await;
                }
                let _ = response.send(result);
            }
            CoordinatorMessage::StartHand { player_id, response } => {
                let outcomes = self.dispatch_creator_event(&player_id, HandEvent::StartHand);
                let reply = self.finish(outcomes, &player_id).await;
                let _ = response.send(reply);
            }
            CoordinatorMessage::Act {
                player_id,
                kind,
                response,
            } => {
                let outcomes = self.dispatch_seat_event(&player_id, |seat| HandEvent::Action { seat, kind });
                let reply = self.finish(outcomes, &player_id).await;
                let _ = response.send(reply);
            }
            CoordinatorMessage::ForceEnd { player_id, response } => {
                let outcomes = self.dispatch_creator_event(&player_id, HandEvent::ForceEnd);
                let reply = self.finish(outcomes, &player_id).await;
                let _ = response.send(reply);
            }
            CoordinatorMessage::GetState { viewer_id, response } => {
                let _ = response.send(Ok(view::snapshot_for(&self.room, viewer_id.as_deref())));
            }
            CoordinatorMessage::Summary { response } => {
                let _ = response.send(view::summary_of(&self.room));
            }
            CoordinatorMessage::Subscribe { player_id, response } => {
                let rx = self.bus.subscribe(player_id.clone());
                self.bus.notify_one(&player_id, &self.room, EventKind::WaitingForPlayers);
                let _ = response.send(rx);
            }
            CoordinatorMessage::Unsubscribe { player_id } => {
                self.bus.unsubscribe(&player_id);
            }
            CoordinatorMessage::Disconnect { player_id } => {
                if let Some(seat) = self.seat_of(&player_id) {
                    let result = state_machine::apply(self.room.clone(), HandEvent::Disconnect { seat }, &mut self.rng);
                    self.absorb(result).await;
                    self.grace_deadlines
                        .insert(seat, Instant::now() + DISCONNECT_GRACE);
                }
            }
            CoordinatorMessage::Reconnect { player_id } => {
                if let Some(seat) = self.seat_of(&player_id) {
                    self.grace_deadlines.remove(&seat);
                    let result = state_machine::apply(self.room.clone(), HandEvent::Reconnect { seat }, &mut self.rng);
                    self.absorb(result).await;
                }
            }
            CoordinatorMessage::TurnTimeout { seat } => {
                // A cancelled timer may already have enqueued this; if the
                // seat no longer owes action the state machine's
                // NotYourTurn rejection makes this a tolerated no-op (§5).
                let result = state_machine::apply(self.room.clone(), HandEvent::Timeout { seat }, &mut self.rng);
                self.absorb(result).await;
            }
            CoordinatorMessage::GraceExpired { seat } => {
                self.remove_seat_on_grace_expiry(seat).await;
            }
        }
    }

    fn handle_join(&mut self, player_id: String, username: String, buy_in: Chips) -> Result<(), ClientError> {
        if self.seat_of(&player_id).is_some() {
            return Ok(()); // Idempotent re-join while the player still holds a seat.
        }
        if self.room.status != RoomStatus::Waiting {
            return Err(ClientError::RoomNotAcceptingPlayers);
        }
        if self.room.seats.len() >= self.room.seat_limit {
            return Err(ClientError::RoomFull);
        }
        self.room.seats.push(Seat::new(player_id, username, buy_in));
        self.room.updated_at = chrono::Utc::now();
        Ok(())
    }

    fn handle_leave(&mut self, player_id: &str) -> Result<(), ClientError> {
        let Some(seat) = self.seat_of(player_id) else {
            return Ok(()); // Idempotent: already gone.
        };
        if self.room.hand_in_progress() {
            // Mid-hand: fold the seat's stake but leave bookkeeping to the
            // state machine; `after_mutation` purges `left` seats once the
            // hand ends and no `Hand` addresses seats by index anymore.
            self.room.seats[seat].folded = true;
            self.room.seats[seat].sitting_out = true;
            self.room.seats[seat].left = true;
            return Ok(());
        }
        self.room.seats.remove(seat);
        self.room.updated_at = chrono::Utc::now();
        if self.room.seats.is_empty() {
            self.room.status = RoomStatus::Finished;
        }
        Ok(())
    }

    /// Dispatch an event only the room's creator may trigger.
    fn dispatch_creator_event(
        &mut self,
        player_id: &str,
        event: HandEvent,
    ) -> Result<Vec<HandOutcome>, CoordinatorError> {
        if self.degraded {
            return Err(CoordinatorError::Degraded);
        }
        if player_id != self.room.creator {
            return Err(ClientError::NotTheCreator.into());
        }
        self.apply_event(event)
    }

    fn dispatch_seat_event(
        &mut self,
        player_id: &str,
        build: impl FnOnce(SeatIndex) -> HandEvent,
    ) -> Result<Vec<HandOutcome>, CoordinatorError> {
        if self.degraded {
            return Err(CoordinatorError::Degraded);
        }
        let Some(seat) = self.seat_of(player_id) else {
            return Err(ClientError::RoomNotFound.into());
        };
        self.apply_event(build(seat))
    }

    /// `state_machine::apply` takes the room by value and is pure, so on
    /// error the clone passed in is simply dropped and `self.room` is left
    /// untouched.
    fn apply_event(&mut self, event: HandEvent) -> Result<Vec<HandOutcome>, CoordinatorError> {
        match state_machine::apply(self.room.clone(), event, &mut self.rng) {
            Ok((next, outcomes)) => {
                self.room = next;
                Ok(outcomes)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Apply the outcomes of a dispatched event: re-arm the turn timer,
    /// persist, and publish — then report the caller-facing result.
    async fn finish(
        &mut self,
        result: Result<Vec<HandOutcome>, CoordinatorError>,
        player_id: &str,
    ) -> Result<RoomSnapshot, CoordinatorError> {
        match result {
            Ok(outcomes) => {
                self.rearm_turn_timer();
                let kind = outcomes
                    .last()
                    .map(EventKind::from)
                    .unwrap_or(EventKind::WaitingForPlayers);
                self.after_mutation(kind).await;
                Ok(view::snapshot_for(&self.room, Some(player_id)))
            }
            Err(err) => Err(err),
        }
    }

    /// Restore `self.room` from a raw `state_machine::apply` result (used by
    /// the disconnect/reconnect/timeout paths, which have no client waiting
    /// on a typed error).
    async fn absorb(&mut self, result: Result<(Room, Vec<HandOutcome>), ClientError>) {
        match result {
            Ok((room, outcomes)) => {
                self.room = room;
                self.rearm_turn_timer();
                let kind = outcomes
                    .last()
                    .map(EventKind::from)
                    .unwrap_or(EventKind::WaitingForPlayers);
                self.after_mutation(kind).await;
            }
            Err(_) => {
                // A late/stale timeout or a disconnect for an already-gone
                // seat; tolerated no-op per §5.
            }
        }
    }

    fn rearm_turn_timer(&mut self) {
        self.turn_deadline = self.room.hand.as_ref().and_then(|h| h.current_turn).map(|seat| ArmedDeadline {
            seat,
            at: Instant::now() + TURN_DEADLINE,
        });
    }

    /// Grace-window expiry never removes a seat by splicing it out of
    /// `self.room.seats` directly — a running `Hand` addresses every other
    /// seat by index, and shifting them would silently reassign whose turn
    /// it is. Instead the seat is flagged `left` (same as a voluntary
    /// mid-hand leave) and `after_mutation`'s purge removes it once no hand
    /// references indices, i.e. as soon as the in-progress hand concludes.
    async fn remove_seat_on_grace_expiry(&mut self, seat: SeatIndex) {
        if seat >= self.room.seats.len() || self.room.seats[seat].connected {
            return;
        }
        self.room.seats[seat].left = true;
        self.room.seats[seat].sitting_out = true;
        if self.room.hand_in_progress() {
            let result = state_machine::apply(
                self.room.clone(),
                HandEvent::Action { seat, kind: ActionKind::Fold },
                &mut self.rng,
            );
            self.absorb(result).await;
        } else {
            self.after_mutation(EventKind::PlayerLeft).await;
        }
        if self.room.seats.len() <= 1 {
            self.room.status = RoomStatus::Finished;
        }
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        // A hand resting at `Showdown` has already paid its pot out to the
        // winners (`hand.pot == 0`) while seats still carry last hand's
        // `hand_committed` for display, so §8.1's pot/committed equality is
        // only checked while a hand is actually in progress.
        if self.room.hand_in_progress() {
            let hand = self.room.hand.as_ref().expect("checked above");
            let committed_total: Chips = self.room.seats.iter().map(|s| s.hand_committed).sum();
            if hand.pot != committed_total {
                return Err(InvariantViolation::PotMismatch {
                    pot: hand.pot,
                    committed: committed_total,
                });
            }
            if let Some(turn) = hand.current_turn {
                if turn >= self.room.seats.len() || !self.room.seats[turn].owes_action() {
                    return Err(InvariantViolation::TurnOnDeadSeat { seat: turn });
                }
            }
        }
        Ok(())
    }

    /// Persist the new snapshot and publish it to subscribers. Both happen
    /// after the room has already been updated in place, so they never hold
    /// up the next inbox message (§5 suspension points).
    async fn after_mutation(&mut self, kind: EventKind) {
        if let Err(violation) = self.check_invariants() {
            log::error!("room {} quarantined: {violation}", self.room.id);
            self.degraded = true;
            self.bus.publish(&self.room, EventKind::Error);
            return;
        }

        if !self.room.hand_in_progress() {
            self.room.purge_left_seats();
        }

        let key = store::room_key(self.room.id);
        let payload = match serde_json::to_vec(&self.room) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("room {} snapshot failed to serialize: {e}", self.room.id);
                self.degraded = true;
                return;
            }
        };

        let mut attempt = 0;
        loop {
            match self.store.put(&key, payload.clone()).await {
                Ok(()) => break,
                Err(e) if attempt < MAX_PERSIST_RETRIES => {
                    attempt += 1;
                    log::warn!("room {} persistence write failed (attempt {attempt}): {e}", self.room.id);
                    tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                }
                Err(e) => {
                    log::error!("room {} persistence exhausted retries, marking degraded: {e}", self.room.id);
                    self.degraded = true;
                    self.bus.publish(&self.room, EventKind::Error);
                    return;
                }
            }
        }

        self.bus.publish(&self.room, kind);
    }
}

impl From<ClientError> for CoordinatorError {
    fn from(e: ClientError) -> Self {
        CoordinatorError::Client(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn new_room() -> Room {
        Room::new(1, "table".into(), "alice".into(), 6, 10, None)
    }

    #[tokio::test]
    async fn join_then_get_state_reflects_seat() {
        let handle = RoomActor::spawn(new_room(), Arc::new(InMemoryStore::new()));
        handle
            .join("alice".into(), "alice".into(), 500)
            .await
            .unwrap();
        let snapshot = handle.get_state(Some("alice")).await.unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].id, "alice");
    }

    #[tokio::test]
    async fn only_creator_can_start_hand() {
        let handle = RoomActor::spawn(new_room(), Arc::new(InMemoryStore::new()));
        handle.join("alice".into(), "alice".into(), 500).await.unwrap();
        handle.join("bob".into(), "bob".into(), 500).await.unwrap();
        let err = handle.start_hand("bob".into()).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Client(ClientError::NotTheCreator)));
    }

    #[tokio::test]
    async fn creator_starts_hand_and_subscriber_is_notified() {
        let handle = RoomActor::spawn(new_room(), Arc::new(InMemoryStore::new()));
        handle.join("alice".into(), "alice".into(), 500).await.unwrap();
        handle.join("bob".into(), "bob".into(), 500).await.unwrap();
        let mut rx = handle.subscribe("alice".into()).await.unwrap();
        let _ = rx.recv().await.unwrap(); // initial WaitingForPlayers push

        let snapshot = handle.start_hand("alice".into()).await.unwrap();
        assert_eq!(snapshot.phase, crate::room::Phase::Preflop);

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.kind, EventKind::HandStarted);
    }

    #[tokio::test]
    async fn leave_before_a_hand_starts_frees_the_seat() {
        let handle = RoomActor::spawn(new_room(), Arc::new(InMemoryStore::new()));
        handle.join("alice".into(), "alice".into(), 500).await.unwrap();
        handle.leave("alice".into()).await.unwrap();
        let snapshot = handle.get_state(None).await.unwrap();
        assert!(snapshot.players.is_empty());
    }
}
