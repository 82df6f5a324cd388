//! The room/hand/seat data model (§3).

use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Index into `Room::seats`, stable for the lifetime of the seat.
pub type SeatIndex = usize;

/// Chip amounts. Whole units only; there is no sub-unit currency here.
pub type Chips = u32;

pub type PlayerId = String;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    Idle,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    /// Number of community cards expected to be visible in this phase.
    #[must_use]
    pub fn community_len(self) -> usize {
        match self {
            Phase::Idle | Phase::Preflop => 0,
            Phase::Flop => 3,
            Phase::Turn => 4,
            Phase::River | Phase::Showdown => 5,
        }
    }
}

/// A stable position at a room.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Seat {
    pub player_id: PlayerId,
    pub username: String,
    pub chips: Chips,
    /// Amount committed to the pot so far *this betting round*.
    pub round_committed: Chips,
    /// Amount committed to the pot so far *this hand* (across all rounds).
    pub hand_committed: Chips,
    pub hole_cards: Vec<Card>,
    /// Set only for seats actually dealt cards when the current hand was
    /// started; distinguishes a busted or sitting-out seat from a live
    /// contender so neither is mistaken for the other mid-hand.
    pub in_hand: bool,
    pub folded: bool,
    pub all_in: bool,
    pub connected: bool,
    pub has_acted_this_round: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    /// Set between hands when the stack fell below one big blind; excluded
    /// from the next `StartHand` until topped up (§9, Open Question 4).
    pub sitting_out: bool,
    /// Set when the player left (voluntarily or via grace-window expiry)
    /// while a hand was in progress. The seat stays put — and keeps its
    /// index, which the in-progress `Hand` refers to by position — until
    /// `Room::purge_left_seats` removes it once no hand is running.
    pub left: bool,
}

impl Seat {
    #[must_use]
    pub fn new(player_id: PlayerId, username: String, chips: Chips) -> Self {
        Self {
            player_id,
            username,
            chips,
            round_committed: 0,
            hand_committed: 0,
            hole_cards: Vec::new(),
            in_hand: false,
            folded: false,
            all_in: false,
            connected: true,
            has_acted_this_round: false,
            is_dealer: false,
            is_small_blind: false,
            is_big_blind: false,
            sitting_out: false,
            left: false,
        }
    }

    /// Reset per-hand fields, called once between hands.
    pub fn reset_for_new_hand(&mut self) {
        self.round_committed = 0;
        self.hand_committed = 0;
        self.hole_cards.clear();
        self.in_hand = false;
        self.folded = false;
        self.all_in = false;
        self.has_acted_this_round = false;
        self.is_dealer = false;
        self.is_small_blind = false;
        self.is_big_blind = false;
    }

    /// Reset only the per-round committed/acted fields, called between streets.
    pub fn reset_for_new_round(&mut self) {
        self.round_committed = 0;
        self.has_acted_this_round = false;
    }

    #[must_use]
    pub fn owes_action(&self) -> bool {
        self.in_hand && !self.folded && !self.all_in
    }

    /// Move `amount` chips from stack into the pot, flagging all-in if the
    /// stack hits zero. Saturates at the seat's available chips.
    pub(crate) fn commit(&mut self, amount: Chips) -> Chips {
        let amount = amount.min(self.chips);
        self.chips -= amount;
        self.round_committed += amount;
        self.hand_committed += amount;
        if self.chips == 0 {
            self.all_in = true;
        }
        amount
    }
}

/// One deal cycle.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Hand {
    pub phase: Phase,
    pub community: Vec<Card>,
    pub deck: crate::cards::Deck,
    pub pot: Chips,
    pub current_bet: Chips,
    /// Seat that most recently bet or raised; `None` at the start of a street.
    pub last_aggressor: Option<SeatIndex>,
    /// Seats that still owe an action this betting round.
    pub acted: BTreeSet<SeatIndex>,
    pub dealer_seat: SeatIndex,
    pub min_bet: Chips,
    /// The previous raise *increment* on the current street, used to
    /// enforce the standard no-limit minimum-raise rule.
    pub last_raise_increment: Chips,
    pub current_turn: Option<SeatIndex>,
}

/// A side pot resolved at showdown.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SidePot {
    pub amount: Chips,
    pub eligible_seats: Vec<SeatIndex>,
}

/// The room container (§3).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub creator: PlayerId,
    pub seat_limit: usize,
    pub min_bet: Chips,
    pub max_bet: Option<Chips>,
    pub status: RoomStatus,
    pub hand: Option<Hand>,
    pub seats: Vec<Seat>,
    pub dealer_cursor: SeatIndex,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Room {
    #[must_use]
    pub fn new(
        id: i64,
        name: String,
        creator: PlayerId,
        seat_limit: usize,
        min_bet: Chips,
        max_bet: Option<Chips>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            name,
            creator,
            seat_limit,
            min_bet,
            max_bet,
            status: RoomStatus::Waiting,
            hand: None,
            seats: Vec::new(),
            dealer_cursor: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn current_players(&self) -> usize {
        self.seats.len()
    }

    /// Seats with chips > 0 and not sitting out, eligible to be dealt in.
    #[must_use]
    pub fn chipped_seats(&self) -> Vec<SeatIndex> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.chips > 0 && !s.sitting_out)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether a hand is actively being played — i.e. there is a `Hand` and
    /// it hasn't merely been left resting at `Showdown` so its final
    /// snapshot could be published (see `state_machine::resolve_showdown`).
    #[must_use]
    pub fn hand_in_progress(&self) -> bool {
        self.hand.as_ref().is_some_and(|h| h.phase != Phase::Showdown)
    }

    /// Seats dealt into the current hand that haven't folded — the live
    /// contenders for the pot. Seats never dealt in (busted, sitting out, or
    /// joined mid-hand) are excluded even though they default to `folded`
    /// `false`.
    #[must_use]
    pub fn non_folded_seats(&self) -> Vec<SeatIndex> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.in_hand && !s.folded)
            .map(|(i, _)| i)
            .collect()
    }

    /// Remove seats flagged `left` once no hand is in progress — safe only
    /// then, since a running `Hand` addresses seats by index.
    pub fn purge_left_seats(&mut self) {
        debug_assert!(!self.hand_in_progress());
        if !self.seats.iter().any(|s| s.left) {
            return;
        }
        let dealer_id = self.seats.get(self.dealer_cursor).map(|s| s.player_id.clone());
        self.seats.retain(|s| !s.left);
        self.dealer_cursor = dealer_id
            .and_then(|id| self.seats.iter().position(|s| s.player_id == id))
            .unwrap_or(0);
        if self.seats.is_empty() {
            self.status = RoomStatus::Finished;
        }
    }
}
