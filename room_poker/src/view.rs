//! Redacted, client-facing views of a room (§6 wire shape).
//!
//! A `RoomSnapshot` never carries another player's hole cards unless the
//! hand has reached showdown and that player didn't fold, and never
//! carries the deck. `RoomSummary` is the list-rooms shape — no per-seat
//! detail at all.

use crate::cards::Card;
use crate::room::{Chips, Phase, Room, RoomStatus, SeatIndex};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub username: String,
    pub chips: Chips,
    pub bet: Chips,
    pub total_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub connected: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub sitting_out: bool,
    /// Present only for the viewer's own seat, or for any seat still in
    /// the hand at showdown.
    pub hand: Vec<Card>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoomSnapshot {
    pub id: i64,
    pub name: String,
    pub creator: String,
    pub status: RoomStatus,
    pub phase: Phase,
    pub pot: Chips,
    pub current_bet: Chips,
    pub current_turn: Option<SeatIndex>,
    pub community: Vec<Card>,
    pub players: Vec<PlayerView>,
    pub min_bet: Chips,
    pub max_bet: Option<Chips>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The list-rooms shape: enough to choose a room, nothing about its hand.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoomSummary {
    pub id: i64,
    pub name: String,
    pub status: RoomStatus,
    pub current_players: usize,
    pub seat_limit: usize,
    pub min_bet: Chips,
    pub max_bet: Option<Chips>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Build the view of `room` as seen by `viewer_id` (or the fully-public
/// view when `viewer_id` is `None`).
#[must_use]
pub fn snapshot_for(room: &Room, viewer_id: Option<&str>) -> RoomSnapshot {
    let at_showdown = room
        .hand
        .as_ref()
        .map(|h| h.phase == Phase::Showdown)
        .unwrap_or(false);

    let players = room
        .seats
        .iter()
        .map(|seat| {
            let is_viewer = viewer_id == Some(seat.player_id.as_str());
            let reveal = is_viewer || (at_showdown && !seat.folded);
            PlayerView {
                id: seat.player_id.clone(),
                username: seat.username.clone(),
                chips: seat.chips,
                bet: seat.round_committed,
                total_bet: seat.hand_committed,
                folded: seat.folded,
                all_in: seat.all_in,
                connected: seat.connected,
                is_dealer: seat.is_dealer,
                is_small_blind: seat.is_small_blind,
                is_big_blind: seat.is_big_blind,
                sitting_out: seat.sitting_out,
                hand: if reveal {
                    seat.hole_cards.clone()
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    let (phase, pot, current_bet, current_turn, community) = match &room.hand {
        Some(hand) => (
            hand.phase,
            hand.pot,
            hand.current_bet,
            hand.current_turn,
            hand.community.clone(),
        ),
        None => (Phase::Idle, 0, 0, None, Vec::new()),
    };

    RoomSnapshot {
        id: room.id,
        name: room.name.clone(),
        creator: room.creator.clone(),
        status: room.status,
        phase,
        pot,
        current_bet,
        current_turn,
        community,
        players,
        min_bet: room.min_bet,
        max_bet: room.max_bet,
        created_at: room.created_at,
        updated_at: room.updated_at,
    }
}

#[must_use]
pub fn summary_of(room: &Room) -> RoomSummary {
    RoomSummary {
        id: room.id,
        name: room.name.clone(),
        status: room.status,
        current_players: room.current_players(),
        seat_limit: room.seat_limit,
        min_bet: room.min_bet,
        max_bet: room.max_bet,
        created_at: room.created_at,
    }
}
