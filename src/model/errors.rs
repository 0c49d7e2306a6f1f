use thiserror::Error;

use crate::common::Coordinate;

/// Failure modes of [`crate::engine::Board::flip`].
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum FlipError {
    #[error("no card at {0}")]
    NoCard(Coordinate),

    #[error("{0} is still held by another player")]
    StillHeld(Coordinate),

    #[error("{0} is held")]
    Held(Coordinate),

    #[error("{coordinate} is out of range for a {rows}x{columns} board")]
    OutOfRange {
        coordinate: Coordinate,
        rows: usize,
        columns: usize,
    },
}

/// Failure modes of [`crate::engine::Board::new`] and the board-file loader.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum BoardParseError {
    #[error("board file is empty")]
    Empty,

    #[error("malformed dimension line: {0:?}")]
    MalformedDimensions(String),

    #[error("expected {expected} labels for this board, found {found}")]
    LabelCountMismatch { expected: usize, found: usize },
}

/// Failure of [`crate::engine::Board::map`]: the caller-supplied relabel
/// function failed for one label. Per the atomic-all-or-nothing policy, no
/// replacements are applied when this is returned.
#[derive(Error, Debug)]
#[error("relabeling function failed for label {label:?}")]
pub struct MapError<E: std::error::Error + 'static> {
    pub label: String,
    #[source]
    pub source: E,
}
