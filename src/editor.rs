use core::fmt;
use grid_util::point::Point;
use log::info;

use crate::cell::CellTag;
use crate::cell_grid::CellGrid;
use crate::error::SearchError;
use crate::solver::{DijkstraSolver, SearchObserver, SearchOutcome};
use crate::{address_from_point, DEFAULT_EXTENT, DEFAULT_ROWS, WINDOW_TITLE};

/// Size of the edited grid and of the square surface it is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    pub rows: usize,
    pub extent: u32,
}

impl Default for EditorConfig {
    fn default() -> EditorConfig {
        EditorConfig {
            rows: DEFAULT_ROWS,
            extent: DEFAULT_EXTENT,
        }
    }
}

impl EditorConfig {
    pub fn cell_size(&self) -> u32 {
        self.extent / self.rows.max(1) as u32
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Done(SearchOutcome),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "{}", WINDOW_TITLE),
            Status::Done(outcome) => write!(f, "{}", outcome),
        }
    }
}

/// Applies pointer edits to a grid while keeping at most one start and one end, and runs
/// searches on the result. This is everything a window needs besides drawing.
#[derive(Clone, Debug)]
pub struct Editor {
    pub config: EditorConfig,
    pub solver: DijkstraSolver,
    grid: CellGrid,
    start: Option<Point>,
    end: Option<Point>,
    status: Status,
}

impl Default for Editor {
    fn default() -> Editor {
        Editor::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Editor {
        Editor {
            config,
            solver: DijkstraSolver::new(),
            grid: CellGrid::build(config.rows, config.cell_size()),
            start: None,
            end: None,
            status: Status::Idle,
        }
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }
    pub fn start(&self) -> Option<Point> {
        self.start
    }
    pub fn end(&self) -> Option<Point> {
        self.end
    }
    pub fn status(&self) -> &Status {
        &self.status
    }
    pub fn caption(&self) -> String {
        self.status.to_string()
    }

    fn address(&self, pos: (u32, u32)) -> Option<Point> {
        address_from_point(pos, self.config.rows, self.config.extent)
    }

    /// Primary-button edit: places the start first, then the end, then barriers. Clicking an
    /// endpoint does nothing.
    pub fn paint(&mut self, cell: Point) {
        if self.grid.tag(cell).is_none() || Some(cell) == self.start || Some(cell) == self.end {
            return;
        }
        if self.start.is_none() {
            self.start = Some(cell);
            self.grid.set_tag(cell, CellTag::Start);
        } else if self.end.is_none() {
            self.end = Some(cell);
            self.grid.set_tag(cell, CellTag::End);
        } else {
            self.grid.set_tag(cell, CellTag::Barrier);
        }
    }

    /// Secondary-button edit: clears the cell, forgetting it if it was an endpoint.
    pub fn erase(&mut self, cell: Point) {
        if self.grid.tag(cell).is_none() {
            return;
        }
        self.grid.reset(cell);
        if self.start == Some(cell) {
            self.start = None;
        }
        if self.end == Some(cell) {
            self.end = None;
        }
    }

    /// [paint](Self::paint) at a pointer position; positions off the grid are ignored.
    pub fn paint_at(&mut self, pos: (u32, u32)) -> Option<Point> {
        let cell = self.address(pos)?;
        self.paint(cell);
        Some(cell)
    }

    /// [erase](Self::erase) at a pointer position; positions off the grid are ignored.
    pub fn erase_at(&mut self, pos: (u32, u32)) -> Option<Point> {
        let cell = self.address(pos)?;
        self.erase(cell);
        Some(cell)
    }

    /// Starts over with an empty grid.
    pub fn clear(&mut self) {
        info!("Clearing {}x{} grid", self.config.rows, self.config.rows);
        self.grid = CellGrid::build(self.config.rows, self.config.cell_size());
        self.start = None;
        self.end = None;
        self.status = Status::Idle;
    }

    /// Removes the marks of the previous search, refreshes the neighbour lists and searches
    /// from the start to the end. The grid cannot be edited until this returns.
    pub fn run<O: SearchObserver>(&mut self, observer: &mut O) -> Result<&Status, SearchError> {
        let start = self.start.ok_or(SearchError::MissingStart)?;
        let end = self.end.ok_or(SearchError::MissingEnd)?;
        self.grid.clear_search_marks();
        self.grid.recompute_neighbours();
        let outcome = self.solver.solve(&mut self.grid, start, end, observer)?;
        info!("{}", outcome);
        self.status = Status::Done(outcome);
        Ok(&self.status)
    }
}
