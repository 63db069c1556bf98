//! # grid_dijkstra
//!
//! The search engine behind an interactive shortest-path visualizer. A [CellGrid] holds start,
//! end and barrier cells painted by the user; a [DijkstraSolver] then finds a shortest
//! 4-connected route with unit step costs and tags the route cell by cell, calling back into a
//! [SearchObserver] after each one so the caller can redraw.
//!
//! The frontier is a binary heap that is fully re-keyed after every extraction instead of
//! supporting decrease-key, see [rekey]. Windowing and drawing are left to the caller;
//! [Editor] implements the interaction rules (one start, one end, barriers elsewhere) on top of
//! pointer positions.
//!
//! ```
//! use grid_dijkstra::{find_path, CellGrid, CellTag};
//! use grid_util::point::Point;
//!
//! let mut grid: CellGrid = "
//!     S.#
//!     ..#
//!     #.E
//! "
//! .parse()
//! .unwrap();
//! let mut redraws = 0;
//! let outcome = find_path(&mut grid, Point::new(0, 0), Point::new(2, 2), &mut || redraws += 1).unwrap();
//! assert_eq!(outcome.summary().unwrap().edges(), 4);
//! assert_eq!(redraws, 3);
//! assert_eq!(grid.tag_count(CellTag::Path), 3);
//! ```
pub mod cell;
pub mod cell_grid;
pub mod editor;
pub mod error;
pub mod rekey;
pub mod solver;

use grid_util::point::Point;

pub use crate::cell::{Cell, CellTag};
pub use crate::cell_grid::CellGrid;
pub use crate::editor::{Editor, EditorConfig, Status};
pub use crate::error::{LayoutError, SearchError};
pub use crate::solver::{
    DijkstraSolver, NoopObserver, PathSummary, SearchObserver, SearchOutcome,
};

/// Rows (and columns) of the grid the visualizer edits.
pub const DEFAULT_ROWS: usize = 50;
/// Side length in pixels of the square surface the grid is drawn on.
pub const DEFAULT_EXTENT: u32 = 800;
/// Caption shown while no search result is on screen.
pub const WINDOW_TITLE: &str = "Dijkstra's Path Finding Algorithm";
/// A cell has at most four neighbours on a 4-connected grid.
pub(crate) const N_SMALLVEC_SIZE: usize = 4;

/// Maps a pointer position on a square surface of `extent` pixels showing `rows`×`rows` cells
/// to the address of the cell under it. Returns [None] for positions past the last cell or if
/// the cells would be less than a pixel wide.
pub fn address_from_point(pos: (u32, u32), rows: usize, extent: u32) -> Option<Point> {
    let gap = extent.checked_div(rows as u32).filter(|&gap| gap > 0)?;
    let (row, col) = ((pos.0 / gap) as usize, (pos.1 / gap) as usize);
    (row < rows && col < rows).then(|| Point::new(row as i32, col as i32))
}

/// Searches `grid` from `start` to `end` with a default [DijkstraSolver], tagging the interior
/// of the route and calling `on_path_step` once per tagged cell.
pub fn find_path<O: SearchObserver>(
    grid: &mut CellGrid,
    start: Point,
    end: Point,
    on_path_step: &mut O,
) -> Result<SearchOutcome, SearchError> {
    DijkstraSolver::new().solve(grid, start, end, on_path_step)
}
