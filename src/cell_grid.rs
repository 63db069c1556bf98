use core::fmt;
use std::str::FromStr;

use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use itertools::{iproduct, Itertools};
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::cell::{Cell, CellTag};
use crate::error::LayoutError;
use crate::{DEFAULT_EXTENT, N_SMALLVEC_SIZE};

/// Neighbour offsets in the order they are cached: down, up, right, left.
const NEUMANN_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// [CellGrid] is the editable grid a search runs on. Besides the [CellTag] of every cell it
/// caches each cell's traversable neighbours, which are only valid after
/// [recompute_neighbours](Self::recompute_neighbours), and maintains connected components in a
/// [UnionFind] structure for quick reachability queries.
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
    pub cell_size: u32,
    neighbours_dirty: bool,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for CellGrid {
    fn default() -> CellGrid {
        CellGrid::build(0, 0)
    }
}

impl CellGrid {
    /// Allocates an `n`×`n` grid of empty cells, each `cell_size` pixels wide.
    pub fn build(n: usize, cell_size: u32) -> CellGrid {
        let mut grid = CellGrid::new(n, n, CellTag::Empty);
        grid.cell_size = cell_size;
        grid
    }

    pub fn rows(&self) -> usize {
        self.width
    }
    pub fn cols(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.width
            && (point.y as usize) < self.height
    }

    /// Row-major index of an in-bounds point.
    pub fn index(&self, point: Point) -> Option<usize> {
        self.in_bounds(point)
            .then(|| point.x as usize * self.height + point.y as usize)
    }

    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.index(point).map(|ix| &self.cells[ix])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn tag(&self, point: Point) -> Option<CellTag> {
        self.cell(point).map(|cell| cell.tag)
    }

    pub fn neighbours(&self, point: Point) -> &[Point] {
        self.cell(point).map(Cell::neighbours).unwrap_or(&[])
    }

    /// Overwrites the tag of a cell. No check is made that the grid keeps a single start or end;
    /// that is up to the caller. Out-of-bounds points are ignored.
    ///
    /// Changing whether the cell is a barrier marks the neighbour lists stale. Removing a
    /// barrier joins the newly connected components, placing one flags the components as dirty
    /// since they may have been split.
    pub fn set_tag(&mut self, point: Point, tag: CellTag) {
        let Some(ix) = self.index(point) else {
            return;
        };
        let was_barrier = self.cells[ix].tag.is_barrier();
        self.cells[ix].tag = tag;
        if was_barrier == tag.is_barrier() {
            return;
        }
        self.neighbours_dirty = true;
        if tag.is_barrier() {
            self.components_dirty = true;
        } else {
            for n in self.open_neighbours(point) {
                if let Some(n_ix) = self.index(n) {
                    self.components.union(ix, n_ix);
                }
            }
        }
    }

    pub fn reset(&mut self, point: Point) {
        self.set_tag(point, CellTag::Empty);
    }

    /// Resets every [Frontier](CellTag::Frontier), [Visited](CellTag::Visited) and
    /// [Path](CellTag::Path) cell left behind by a previous search.
    pub fn clear_search_marks(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.tag.is_search_mark()) {
            cell.tag = CellTag::Empty;
        }
    }

    pub fn find_tag(&self, tag: CellTag) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .filter(move |c| c.tag == tag)
            .map(|c| c.pos)
    }

    pub fn tag_count(&self, tag: CellTag) -> usize {
        self.find_tag(tag).count()
    }

    fn open_neighbours(&self, point: Point) -> SmallVec<[Point; N_SMALLVEC_SIZE]> {
        NEUMANN_OFFSETS
            .iter()
            .map(|(dx, dy)| Point::new(point.x + dx, point.y + dy))
            .filter(|&p| self.tag(p).is_some_and(|tag| !tag.is_barrier()))
            .collect()
    }

    /// Rebuilds the cached neighbour list of every cell from its in-bounds, non-barrier
    /// axis-aligned neighbours. Barrier cells end up with no neighbours. Has to run after the
    /// barrier layout is final and before a search.
    pub fn recompute_neighbours(&mut self) {
        debug!(
            "Recomputing neighbours of {}x{} grid",
            self.width, self.height
        );
        for ix in 0..self.cells.len() {
            let cell = &self.cells[ix];
            let neighbours = if cell.tag.is_barrier() {
                SmallVec::new()
            } else {
                self.open_neighbours(cell.pos)
            };
            self.cells[ix].neighbours = neighbours;
        }
        self.neighbours_dirty = false;
    }

    /// Whether the cached neighbour lists match the current barrier layout.
    pub fn neighbours_fresh(&self) -> bool {
        !self.neighbours_dirty
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, point: &Point) -> Option<usize> {
        self.index(*point).map(|ix| self.components.find(ix))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component. Barriers are never reachable.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        match (self.index(*start), self.index(*goal)) {
            (Some(start_ix), Some(goal_ix)) => {
                self.cells[start_ix].tag.is_barrier()
                    || self.cells[goal_ix].tag.is_barrier()
                    || !self.components.equiv(start_ix, goal_ix)
            }
            _ => true,
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up 4-connected open cells to the same
    /// components.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.cells.len());
        self.components_dirty = false;
        for (x, y) in iproduct!(0..self.width as i32, 0..self.height as i32) {
            let point = Point::new(x, y);
            if self.tag(point).is_some_and(|tag| tag.is_barrier()) {
                continue;
            }
            let Some(parent_ix) = self.index(point) else {
                continue;
            };
            // Down and right suffice, the other two directions are covered by the neighbour.
            for p in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                if let Some(ix) = self.index(p) {
                    if !self.cells[ix].tag.is_barrier() {
                        self.components.union(parent_ix, ix);
                    }
                }
            }
        }
    }
}

impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.height.max(1)) {
            writeln!(f, "{}", row.iter().map(|c| c.tag.glyph()).join(""))?;
        }
        Ok(())
    }
}

impl FromStr for CellGrid {
    type Err = LayoutError;

    /// Parses one line per row using the glyphs of [CellTag::glyph]. Blank lines and
    /// surrounding whitespace are skipped. Neighbours and components are computed, so the
    /// result can be searched right away.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let width = rows.len();
        let height = rows.first().ok_or(LayoutError::Empty)?.chars().count();
        let mut grid = CellGrid::new(width, height, CellTag::Empty);
        grid.cell_size = DEFAULT_EXTENT / width.max(height) as u32;
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != height {
                return Err(LayoutError::Ragged {
                    row,
                    expected: height,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let tag = CellTag::from_glyph(glyph)
                    .ok_or(LayoutError::UnknownGlyph { glyph, row, col })?;
                grid.cells[row * height + col].tag = tag;
            }
        }
        grid.recompute_neighbours();
        grid.generate_components();
        Ok(grid)
    }
}

impl ValueGrid<CellTag> for CellGrid {
    fn new(width: usize, height: usize, default_value: CellTag) -> Self {
        let cells = iproduct!(0..width, 0..height)
            .map(|(row, col)| Cell::new(row, col, default_value))
            .collect::<Vec<_>>();
        let mut grid = CellGrid {
            cells,
            width,
            height,
            cell_size: 1,
            neighbours_dirty: true,
            components: UnionFind::new(width * height),
            components_dirty: false,
        };
        if default_value.is_barrier() {
            grid.components_dirty = true;
        } else {
            grid.generate_components();
        }
        grid
    }
    fn get(&self, x: i32, y: i32) -> CellTag {
        self.tag(Point::new(x, y)).unwrap_or(CellTag::Barrier)
    }
    fn set(&mut self, x: i32, y: i32, value: CellTag) {
        self.set_tag(Point::new(x, y), value);
    }
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // |.#.|
        // |.#.|
        let mut grid = CellGrid::new(2, 3, CellTag::Empty);
        grid.set(0, 1, CellTag::Barrier);
        grid.set(1, 1, CellTag::Barrier);
        grid.generate_components();
        let p1 = Point::new(0, 0);
        let p2 = Point::new(1, 0);
        let p3 = Point::new(0, 2);
        let p4 = Point::new(0, 1);
        assert!(grid.reachable(&p1, &p2));
        assert!(grid.unreachable(&p1, &p3));
        assert!(grid.unreachable(&p1, &p4));
        assert_ne!(grid.get_component(&p1), grid.get_component(&p3));
    }

    #[test]
    fn removing_barrier_joins_components() {
        let mut grid: CellGrid = ".#.".parse().unwrap();
        let left = Point::new(0, 0);
        let right = Point::new(0, 2);
        assert!(grid.unreachable(&left, &right));
        grid.reset(Point::new(0, 1));
        assert!(!grid.components_dirty);
        assert!(grid.reachable(&left, &right));
        grid.set_tag(Point::new(0, 1), CellTag::Barrier);
        assert!(grid.components_dirty);
        grid.update();
        assert!(grid.unreachable(&left, &right));
    }

    #[test]
    fn neighbours_follow_down_up_right_left_order() {
        let mut grid = CellGrid::build(3, 10);
        grid.recompute_neighbours();
        let centre = Point::new(1, 1);
        assert_eq!(
            grid.neighbours(centre),
            &[
                Point::new(2, 1),
                Point::new(0, 1),
                Point::new(1, 2),
                Point::new(1, 0)
            ]
        );
        assert_eq!(
            grid.neighbours(Point::new(0, 0)),
            &[Point::new(1, 0), Point::new(0, 1)]
        );
    }

    #[test]
    fn barriers_are_excluded_and_have_no_neighbours() {
        let mut grid = CellGrid::build(3, 10);
        grid.set_tag(Point::new(1, 1), CellTag::Barrier);
        grid.set_tag(Point::new(0, 1), CellTag::Barrier);
        grid.recompute_neighbours();
        assert!(grid.neighbours(Point::new(1, 1)).is_empty());
        assert_eq!(grid.neighbours(Point::new(0, 0)), &[Point::new(1, 0)]);
        assert_eq!(
            grid.neighbours(Point::new(1, 2)),
            &[Point::new(2, 2), Point::new(0, 2)]
        );
    }

    #[test]
    fn neighbour_freshness_tracks_barrier_changes() {
        let mut grid = CellGrid::build(4, 10);
        assert!(!grid.neighbours_fresh());
        grid.recompute_neighbours();
        assert!(grid.neighbours_fresh());
        // Non-barrier retagging keeps the lists valid
        grid.set_tag(Point::new(0, 0), CellTag::Start);
        grid.set_tag(Point::new(2, 2), CellTag::Path);
        assert!(grid.neighbours_fresh());
        grid.set_tag(Point::new(1, 1), CellTag::Barrier);
        assert!(!grid.neighbours_fresh());
        grid.recompute_neighbours();
        grid.reset(Point::new(1, 1));
        assert!(!grid.neighbours_fresh());
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut grid: CellGrid = "
            S..#
            .#..
            ..#E
        "
        .parse()
        .unwrap();
        let first = grid.cells().map(|c| c.neighbours().to_vec()).collect_vec();
        grid.recompute_neighbours();
        let second = grid.cells().map(|c| c.neighbours().to_vec()).collect_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn layout_round_trips_through_display() {
        let layout = "S.#\n.*x\no.E\n";
        let grid: CellGrid = layout.parse().unwrap();
        assert_eq!(grid.to_string(), layout);
        assert_eq!(grid.tag(Point::new(0, 0)), Some(CellTag::Start));
        assert_eq!(grid.tag(Point::new(2, 2)), Some(CellTag::End));
        assert_eq!(grid.tag_count(CellTag::Barrier), 1);
    }

    #[test]
    fn layout_errors() {
        assert_eq!("".parse::<CellGrid>().unwrap_err(), LayoutError::Empty);
        assert_eq!(
            "...\n..".parse::<CellGrid>().unwrap_err(),
            LayoutError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            "..?".parse::<CellGrid>().unwrap_err(),
            LayoutError::UnknownGlyph {
                glyph: '?',
                row: 0,
                col: 2
            }
        );
    }

    #[test]
    fn clear_search_marks_keeps_layout() {
        let mut grid: CellGrid = "S*x\no#E".parse().unwrap();
        grid.clear_search_marks();
        assert_eq!(grid.to_string(), "S..\n.#E\n");
    }

    #[test]
    fn out_of_bounds_points() {
        let mut grid = CellGrid::build(2, 1);
        let outside = Point::new(2, 0);
        assert_eq!(grid.tag(outside), None);
        assert_eq!(grid.get(-1, 0), CellTag::Barrier);
        grid.set_tag(outside, CellTag::Barrier);
        assert_eq!(grid.tag_count(CellTag::Barrier), 0);
        assert!(grid.neighbours(outside).is_empty());
    }
}
