//! The three-way error taxonomy (§7): client errors, transient errors, and
//! invariant violations each get their own type so a call site can't
//! accidentally surface a bug to a client or retry a client mistake.

use thiserror::Error;

/// The caller violated a precondition. State is unchanged; not logged as
/// an error (logged at `debug` by the coordinator).
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ClientError {
    #[error("room not found")]
    RoomNotFound,
    #[error("not your turn")]
    NotYourTurn,
    #[error("insufficient chips for raise")]
    InsufficientChipsForRaise,
    #[error("bet below minimum")]
    BetBelowMinimum,
    #[error("illegal action for the current phase")]
    IllegalPhase,
    #[error("invalid action")]
    InvalidAction,
    #[error("already seated at this room")]
    AlreadyInRoom,
    #[error("room is full")]
    RoomFull,
    #[error("room is not accepting players")]
    RoomNotAcceptingPlayers,
    #[error("only the room creator may do that")]
    NotTheCreator,
    #[error("not enough seated players with chips to start a hand")]
    NotEnoughPlayers,
    #[error("cannot check when there is a bet to call")]
    CannotCheckFacingBet,
    #[error("seat is folded or all-in and cannot act")]
    SeatCannotAct,
}

/// A failure in a surrounding system (persistence, broadcast) rather than a
/// caller mistake. The coordinator retries with bounded backoff; on
/// exhaustion the room is marked degraded.
#[derive(Debug, Error)]
pub enum TransientError {
    #[error("failed to persist room snapshot: {0}")]
    PersistenceWrite(String),
    #[error("failed to push to a subscriber: {0}")]
    BroadcastPush(String),
}

/// A bug: an invariant from §8 was violated. Fatal for the room — it is
/// quarantined and no snapshot is written from the corrupt state.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("pot {pot} does not equal sum of committed contributions {committed}")]
    PotMismatch { pot: u32, committed: u32 },
    #[error("current turn points at seat {seat} which is folded or all-in")]
    TurnOnDeadSeat { seat: usize },
    #[error("deck underflow: attempted to deal from an empty deck")]
    DeckUnderflow,
    #[error("duplicate card detected while reconstructing the 52-card deck")]
    DuplicateCard,
}

/// Errors the coordinator can surface beyond client mistakes.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("transient failure, room may be degraded: {0}")]
    Transient(#[from] TransientError),
    #[error("room quarantined due to an invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("the room is degraded and refusing new actions")]
    Degraded,
    #[error("the room is quarantined and refusing new actions")]
    Quarantined,
}
