use derive_more::Display;

/// A position in the grid -- `(row, column)`, both zero-indexed.
///
/// Unlike [`super::PlayerId`] this is a plain value type with no validity
/// constraints of its own; range-checking against a particular board's
/// dimensions happens at the [`crate::engine::Board`] boundary, not here.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Display)]
#[display(fmt = "({}, {})", row, column)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub row: usize,
    pub column: usize,
}

impl Coordinate {
    pub const fn new(row: usize, column: usize) -> Self {
        Coordinate { row, column }
    }

    /// Row-major flat index into a `rows x columns` grid.
    ///
    /// Caller is responsible for having already range-checked `self`
    /// against `columns` (and, transitively, `rows`).
    pub const fn flat_index(self, columns: usize) -> usize {
        self.row * columns + self.column
    }

    /// Inverse of [`Coordinate::flat_index`]: recovers the coordinate for a
    /// row-major flat index into a grid with the given column count.
    pub const fn from_flat_index(index: usize, columns: usize) -> Self {
        Coordinate {
            row: index / columns,
            column: index % columns,
        }
    }

    pub const fn in_bounds(self, rows: usize, columns: usize) -> bool {
        self.row < rows && self.column < columns
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((row, column): (usize, usize)) -> Self {
        Coordinate::new(row, column)
    }
}
