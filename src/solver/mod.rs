use core::fmt;
use grid_util::point::Point;

use crate::cell_grid::CellGrid;

pub mod dijkstra;

pub use dijkstra::DijkstraSolver;

/// Receives progress from a running search, typically to redraw the grid. Every call is made
/// synchronously on the searching thread and the search resumes only once it returns.
///
/// Any `FnMut()` closure is an observer: it is called once per path step and ignores expansion.
pub trait SearchObserver {
    /// Called after each interior cell of the route has been tagged
    /// [Path](crate::cell::CellTag::Path), walking from the end towards the start.
    fn on_path_step(&mut self, grid: &CellGrid);

    /// Called after a cell was tagged [Frontier](crate::cell::CellTag::Frontier) or
    /// [Visited](crate::cell::CellTag::Visited), if the solver marks its expansion.
    fn on_expand(&mut self, _grid: &CellGrid, _point: Point) {}
}

impl<F: FnMut()> SearchObserver for F {
    fn on_path_step(&mut self, _grid: &CellGrid) {
        (self)()
    }
}

/// An observer that ignores all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_path_step(&mut self, _grid: &CellGrid) {}
}

/// A found route, including both endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSummary {
    route: Vec<Point>,
}

impl PathSummary {
    pub(crate) fn new(route: Vec<Point>) -> PathSummary {
        PathSummary { route }
    }
    pub fn route(&self) -> &[Point] {
        &self.route
    }
    /// Number of cells strictly between start and end, i.e. the cells tagged as path.
    pub fn interior(&self) -> usize {
        self.route.len().saturating_sub(2)
    }
    /// Length of the route in unit steps.
    pub fn edges(&self) -> usize {
        self.route.len().saturating_sub(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(PathSummary),
    NoPath,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
    pub fn summary(&self) -> Option<&PathSummary> {
        match self {
            SearchOutcome::Found(summary) => Some(summary),
            SearchOutcome::NoPath => None,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchOutcome::Found(summary) => {
                write!(f, "The shortest path is {} blocks", summary.interior())
            }
            SearchOutcome::NoPath => write!(f, "There is no path!"),
        }
    }
}
