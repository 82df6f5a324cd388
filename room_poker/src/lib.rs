//! # room_poker
//!
//! A real-time multi-table Texas Hold'em poker engine, split the way the
//! room lifecycle actually separates: a pure hand state machine with no I/O,
//! a per-room actor that serializes concurrent access to it, and a thin
//! wire layer that redacts each subscriber's own view of a room.
//!
//! ## Core modules
//!
//! - [`cards`]: suits, ranks, and an injectable-RNG deck.
//! - [`evaluator`]: best-5-of-7 hand scoring.
//! - [`action`]: the closed action/event/outcome vocabulary.
//! - [`room`]: the `Room`/`Seat`/`Hand` data model.
//! - [`state_machine`]: `apply(Room, HandEvent, &mut Rng) -> Result<(Room, Vec<HandOutcome>), ClientError>`.
//! - [`errors`]: the client/transient/invariant error taxonomy.
//! - [`coordinator`]: `RoomActor`/`RoomHandle`, the single-writer concurrency boundary.
//! - [`registry`]: the room directory (create/lookup/list).
//! - [`subscriber`]: per-subscriber redacted state-change fanout.
//! - [`view`]: the redacted wire shapes (`RoomSnapshot`, `RoomSummary`).
//! - [`store`]: the `SnapshotStore` persistence contract.
//!
//! ## Example
//!
//! ```
//! use room_poker::room::Room;
//!
//! let room = Room::new(1, "table one".into(), "alice".into(), 6, 10, None);
//! assert_eq!(room.current_players(), 0);
//! ```

pub mod action;
pub mod cards;
pub mod coordinator;
pub mod errors;
pub mod evaluator;
pub mod registry;
pub mod room;
pub mod state_machine;
pub mod store;
pub mod subscriber;
pub mod view;

pub use action::{ActionKind, HandEvent, HandOutcome};
pub use coordinator::{RoomActor, RoomHandle};
pub use errors::{ClientError, CoordinatorError, InvariantViolation, TransientError};
pub use registry::{RegistryError, RoomRegistry};
pub use room::{Room, RoomStatus, Seat};
pub use view::{PlayerView, RoomSnapshot, RoomSummary};
