//! Error types for grid layouts and searches.

use grid_util::point::Point;
use thiserror::Error;

use crate::cell::CellTag;

/// Reasons a search refuses to run. Every variant is a caller error; an unreachable end is
/// not an error but a [SearchOutcome::NoPath](crate::solver::SearchOutcome::NoPath).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{0} lies outside the grid")]
    OutOfBounds(Point),

    #[error("{0} is a barrier and cannot be an endpoint")]
    BlockedEndpoint(Point),

    #[error("neighbour lists are stale, recompute them after changing barriers")]
    StaleNeighbours,

    #[error("grid holds {count} cells tagged {tag:?}, at most one is allowed")]
    DuplicateMarker { tag: CellTag, count: usize },

    #[error("no start cell has been placed")]
    MissingStart,

    #[error("no end cell has been placed")]
    MissingEnd,
}

/// Errors produced while parsing an ASCII grid layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout contains no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}
