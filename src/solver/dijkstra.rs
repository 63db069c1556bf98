use grid_util::point::Point;
use log::{info, warn};
use smallvec::SmallVec;

use crate::cell::CellTag;
use crate::cell_grid::CellGrid;
use crate::error::SearchError;
use crate::rekey::{dijkstra_rekey, SearchSpace};
use crate::solver::{PathSummary, SearchObserver, SearchOutcome};
use crate::N_SMALLVEC_SIZE;

/// Unit-weight shortest paths over the 4-connected open cells of a [CellGrid].
///
/// With `mark_expansion` set, cells are tagged [Frontier](CellTag::Frontier) when first reached
/// and [Visited](CellTag::Visited) when extracted, so a renderer can animate the expansion.
#[derive(Clone, Debug, Default)]
pub struct DijkstraSolver {
    pub mark_expansion: bool,
}

impl DijkstraSolver {
    pub fn new() -> DijkstraSolver {
        DijkstraSolver::default()
    }

    /// Checks everything [solve](Self::solve) relies on without touching the grid.
    pub fn validate(&self, grid: &CellGrid, start: Point, end: Point) -> Result<(), SearchError> {
        for point in [start, end] {
            match grid.tag(point) {
                None => return Err(SearchError::OutOfBounds(point)),
                Some(CellTag::Barrier) => return Err(SearchError::BlockedEndpoint(point)),
                Some(_) => {}
            }
        }
        if !grid.neighbours_fresh() {
            return Err(SearchError::StaleNeighbours);
        }
        for tag in [CellTag::Start, CellTag::End] {
            let count = grid.tag_count(tag);
            if count > 1 {
                return Err(SearchError::DuplicateMarker { tag, count });
            }
        }
        Ok(())
    }

    /// Searches for a shortest route from `start` to `end`. When one exists, its interior cells
    /// are tagged [Path](CellTag::Path) one at a time starting next to `end`, and the observer
    /// is notified after each of them. The tags of `start` and `end` are left as they are.
    ///
    /// An unreachable `end` is reported as [SearchOutcome::NoPath]; a
    /// [SearchError] means the search did not run at all.
    pub fn solve<O: SearchObserver>(
        &self,
        grid: &mut CellGrid,
        start: Point,
        end: Point,
        observer: &mut O,
    ) -> Result<SearchOutcome, SearchError> {
        if let Err(e) = self.validate(grid, start, end) {
            warn!("Refusing to search from {} to {}: {}", start, end, e);
            return Err(e);
        }
        info!("Searching for a path from {} to {}", start, end);
        let nodes = grid
            .cells()
            .filter(|cell| !cell.tag.is_barrier())
            .map(|cell| cell.pos)
            .collect::<Vec<_>>();
        let mut space = GridSpace {
            grid: &mut *grid,
            observer: &mut *observer,
            end,
            mark_expansion: self.mark_expansion,
        };
        let Some((route, cost)) = dijkstra_rekey(&mut space, nodes, &start) else {
            info!("{} is not reachable from {}", end, start);
            return Ok(SearchOutcome::NoPath);
        };
        debug_assert_eq!(cost as usize + 1, route.len());

        let interior = route.len().saturating_sub(2);
        for &point in route.iter().rev().skip(1).take(interior) {
            grid.set_tag(point, CellTag::Path);
            observer.on_path_step(grid);
        }
        info!("Found a path of {} steps from {} to {}", cost, start, end);
        Ok(SearchOutcome::Found(PathSummary::new(route)))
    }
}

/// The open cells of a grid seen as a graph with unit edge costs.
struct GridSpace<'a, O> {
    grid: &'a mut CellGrid,
    observer: &'a mut O,
    end: Point,
    mark_expansion: bool,
}

impl<O: SearchObserver> GridSpace<'_, O> {
    fn mark(&mut self, point: Point, tag: CellTag) {
        let current = self.grid.tag(point);
        let markable = match tag {
            CellTag::Frontier => current == Some(CellTag::Empty),
            _ => matches!(current, Some(CellTag::Empty | CellTag::Frontier)),
        };
        if self.mark_expansion && markable {
            self.grid.set_tag(point, tag);
            self.observer.on_expand(&*self.grid, point);
        }
    }
}

impl<O: SearchObserver> SearchSpace for GridSpace<'_, O> {
    type Node = Point;
    type Cost = u32;
    type Successors = SmallVec<[(Point, u32); N_SMALLVEC_SIZE]>;

    fn successors(&self, node: &Point) -> Self::Successors {
        self.grid
            .neighbours(*node)
            .iter()
            .map(|&p| (p, 1))
            .collect()
    }
    fn is_goal(&self, node: &Point) -> bool {
        *node == self.end
    }
    fn on_extract(&mut self, node: &Point, _cost: u32) {
        self.mark(*node, CellTag::Visited);
    }
    fn on_relax(&mut self, node: &Point, _cost: u32) {
        self.mark(*node, CellTag::Frontier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::NoopObserver;

    /// Records the order in which cells are tagged as path.
    #[derive(Default)]
    struct Recorder {
        marked: Vec<Point>,
        expansions: usize,
    }

    impl SearchObserver for Recorder {
        fn on_path_step(&mut self, grid: &CellGrid) {
            let new = grid
                .find_tag(CellTag::Path)
                .filter(|p| !self.marked.contains(p))
                .collect::<Vec<_>>();
            assert_eq!(new.len(), 1);
            self.marked.extend(new);
        }
        fn on_expand(&mut self, _grid: &CellGrid, _point: Point) {
            self.expansions += 1;
        }
    }

    fn endpoints(grid: &CellGrid) -> (Point, Point) {
        (
            grid.find_tag(CellTag::Start).next().unwrap(),
            grid.find_tag(CellTag::End).next().unwrap(),
        )
    }

    fn is_adjacent(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() + (a.y - b.y).abs() == 1
    }

    /// 3x3 without barriers from corner to corner.
    #[test]
    fn open_grid_corner_to_corner() {
        let mut grid: CellGrid = "
            S..
            ...
            ..E
        "
        .parse()
        .unwrap();
        let (start, end) = endpoints(&grid);
        let mut recorder = Recorder::default();
        let outcome = DijkstraSolver::new()
            .solve(&mut grid, start, end, &mut recorder)
            .unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.edges(), 4);
        assert_eq!(summary.interior(), 3);
        assert_eq!(recorder.marked.len(), 3);
        assert_eq!(grid.tag_count(CellTag::Path), 3);
        assert_eq!(grid.tag(start), Some(CellTag::Start));
        assert_eq!(grid.tag(end), Some(CellTag::End));
        let route = summary.route();
        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&end));
        assert!(route.windows(2).all(|w| is_adjacent(w[0], w[1])));
        // Path steps walk from the end back to the start
        let interior = route[1..route.len() - 1].iter().rev().copied().collect::<Vec<_>>();
        assert_eq!(recorder.marked, interior);
        assert_eq!(recorder.expansions, 0);
    }

    /// The bottom row is cut off by a wall of barriers.
    #[test]
    fn walled_off_end_has_no_path() {
        let mut grid: CellGrid = "
            S#.
            ###
            ..E
        "
        .parse()
        .unwrap();
        let (start, end) = endpoints(&grid);
        let mut steps = 0;
        let outcome = DijkstraSolver::new()
            .solve(&mut grid, start, end, &mut || steps += 1)
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NoPath);
        assert_eq!(steps, 0);
        assert_eq!(grid.tag_count(CellTag::Path), 0);
    }

    #[test]
    fn start_equals_end() {
        let mut grid = CellGrid::build(3, 1);
        grid.recompute_neighbours();
        let p = Point::new(1, 1);
        let mut steps = 0;
        let outcome = DijkstraSolver::new()
            .solve(&mut grid, p, p, &mut || steps += 1)
            .unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.edges(), 0);
        assert_eq!(summary.interior(), 0);
        assert_eq!(steps, 0);
    }

    #[test]
    fn adjacent_endpoints_mark_nothing() {
        let mut grid: CellGrid = "SE".parse().unwrap();
        let (start, end) = endpoints(&grid);
        let outcome = DijkstraSolver::new()
            .solve(&mut grid, start, end, &mut NoopObserver)
            .unwrap();
        assert_eq!(outcome.summary().unwrap().edges(), 1);
        assert_eq!(grid.to_string(), "SE\n");
    }

    #[test]
    fn detour_around_wall() {
        let mut grid: CellGrid = "
            S#...
            .#.#.
            .#.#.
            ...#E
        "
        .parse()
        .unwrap();
        let (start, end) = endpoints(&grid);
        let outcome = DijkstraSolver::new()
            .solve(&mut grid, start, end, &mut NoopObserver)
            .unwrap();
        assert_eq!(outcome.summary().unwrap().edges(), 13);
        assert_eq!(
            grid.to_string(),
            "S#***\n*#*#*\n*#*#*\n***#E\n"
        );
    }

    #[test]
    fn expansion_marks() {
        let mut grid: CellGrid = "
            S....
            .###.
            ....E
        "
        .parse()
        .unwrap();
        let (start, end) = endpoints(&grid);
        let solver = DijkstraSolver {
            mark_expansion: true,
        };
        let mut recorder = Recorder::default();
        let outcome = solver.solve(&mut grid, start, end, &mut recorder).unwrap();
        assert_eq!(outcome.summary().unwrap().edges(), 6);
        assert!(recorder.expansions > 0);
        assert!(grid.tag_count(CellTag::Visited) > 0);
        assert_eq!(grid.tag_count(CellTag::Path), 5);
        assert_eq!(grid.tag(start), Some(CellTag::Start));
        assert_eq!(grid.tag(end), Some(CellTag::End));
        assert_eq!(grid.tag_count(CellTag::Barrier), 3);
    }

    #[test]
    fn rejects_precondition_violations() {
        let solver = DijkstraSolver::new();
        let mut grid: CellGrid = "S.#\n..E".parse().unwrap();
        let (start, end) = endpoints(&grid);

        let outside = Point::new(5, 0);
        assert_eq!(
            solver.solve(&mut grid, outside, end, &mut NoopObserver),
            Err(SearchError::OutOfBounds(outside))
        );
        let barrier = Point::new(0, 2);
        assert_eq!(
            solver.solve(&mut grid, start, barrier, &mut NoopObserver),
            Err(SearchError::BlockedEndpoint(barrier))
        );

        grid.set_tag(Point::new(1, 0), CellTag::Barrier);
        assert_eq!(
            solver.solve(&mut grid, start, end, &mut NoopObserver),
            Err(SearchError::StaleNeighbours)
        );
        grid.recompute_neighbours();

        grid.set_tag(Point::new(1, 1), CellTag::End);
        assert_eq!(
            solver.solve(&mut grid, start, end, &mut NoopObserver),
            Err(SearchError::DuplicateMarker {
                tag: CellTag::End,
                count: 2
            })
        );
        assert_eq!(grid.tag_count(CellTag::Path), 0);
    }
}
