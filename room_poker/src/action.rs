//! The closed action/event vocabulary exchanged with the hand state machine.
//!
//! The source this was distilled from dispatched on raw strings and allowed
//! inconsistent spellings (`allin` vs `all-in`) and a single `raise` verb
//! that conflated opening a bet with raising one. `ActionKind` below is a
//! closed tagged union with `Bet` and `Raise` kept distinct.

use crate::room::SeatIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player's requested action. `amount` on `Bet`/`Raise` is the amount
/// being bet/raised by, not the resulting total committed.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet { amount: u32 },
    Raise { amount: u32 },
    AllIn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fold => write!(f, "folds"),
            Self::Check => write!(f, "checks"),
            Self::Call => write!(f, "calls"),
            Self::Bet { amount } => write!(f, "bets {amount}"),
            Self::Raise { amount } => write!(f, "raises by {amount}"),
            Self::AllIn => write!(f, "goes all-in"),
        }
    }
}

/// Input events the coordinator feeds to the pure hand state machine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum HandEvent {
    /// The room creator requests a new hand.
    StartHand,
    /// A seat takes an action; only legal when `seat == currentTurn`.
    Action { seat: SeatIndex, kind: ActionKind },
    /// Coordinator-generated: the per-turn deadline elapsed for `seat`.
    Timeout { seat: SeatIndex },
    /// A seat's connection dropped.
    Disconnect { seat: SeatIndex },
    /// A previously disconnected seat reconnected.
    Reconnect { seat: SeatIndex },
    /// The room creator ended the room; any in-progress hand is resolved.
    ForceEnd,
}

/// Outbound events emitted alongside the new room snapshot.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum HandOutcome {
    HandStarted,
    ActionApplied { seat: SeatIndex, kind: ActionKind },
    PhaseAdvanced,
    Showdown,
    HandEnded,
    WaitingForPlayers,
}

impl fmt::Display for HandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandStarted => write!(f, "hand started"),
            Self::ActionApplied { seat, kind } => write!(f, "seat {seat} {kind}"),
            Self::PhaseAdvanced => write!(f, "phase advanced"),
            Self::Showdown => write!(f, "showdown"),
            Self::HandEnded => write!(f, "hand ended"),
            Self::WaitingForPlayers => write!(f, "waiting for players"),
        }
    }
}
