//! Library surface for `room_poker_server`'s own integration tests.
//!
//! `main.rs` wires these same modules into a binary; splitting them out
//! behind a `lib.rs` target lets `tests/*.rs` build the router directly
//! with an in-memory store instead of spawning a real process.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
