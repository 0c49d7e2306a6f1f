//! Parsers for external formats the core's collaborators hand it, kept
//! separate from the core itself so the engine never depends on a
//! particular transport's wire format.

pub mod board_file;

pub use board_file::*;
