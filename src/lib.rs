//! Concurrent state core for a "Memory Scramble" multiplayer card-matching game.
//!
//! [`engine::Board`] owns the grid, per-player turn state, per-cell wait
//! queues, and the watcher set, and exposes exactly four operations:
//! [`engine::Board::look`], [`engine::Board::flip`], [`engine::Board::map`],
//! and [`engine::Board::watch`].

pub mod common;
pub mod engine;
pub mod interop;
pub mod model;

pub mod prelude {
    //! Convenient re-exports of commonly imported items.
    pub use super::{
        common::*,
        engine::Board,
        model::*,
    };
}

/// Version of this crate (as a string).
pub const VERSION_STR: &str = env!("CARGO_PKG_VERSION");
