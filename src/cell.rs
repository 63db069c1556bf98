use grid_util::point::Point;
use smallvec::SmallVec;

use crate::N_SMALLVEC_SIZE;

/// The role a cell plays in the current layout or search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellTag {
    #[default]
    Empty,
    Barrier,
    Start,
    End,
    /// Reached by relaxation but not yet extracted.
    Frontier,
    /// Extracted with a finite distance.
    Visited,
    /// Interior cell of a reconstructed route.
    Path,
}

impl CellTag {
    pub fn is_barrier(self) -> bool {
        self == CellTag::Barrier
    }

    /// Endpoints and barriers describe the layout itself; everything else can be
    /// overwritten by a search.
    pub fn is_layout(self) -> bool {
        matches!(self, CellTag::Barrier | CellTag::Start | CellTag::End)
    }

    /// Tags written by a search run, removed by
    /// [clear_search_marks](crate::cell_grid::CellGrid::clear_search_marks).
    pub fn is_search_mark(self) -> bool {
        matches!(self, CellTag::Frontier | CellTag::Visited | CellTag::Path)
    }

    pub fn glyph(self) -> char {
        match self {
            CellTag::Empty => '.',
            CellTag::Barrier => '#',
            CellTag::Start => 'S',
            CellTag::End => 'E',
            CellTag::Frontier => 'o',
            CellTag::Visited => 'x',
            CellTag::Path => '*',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<CellTag> {
        Some(match glyph {
            '.' => CellTag::Empty,
            '#' => CellTag::Barrier,
            'S' => CellTag::Start,
            'E' => CellTag::End,
            'o' => CellTag::Frontier,
            'x' => CellTag::Visited,
            '*' => CellTag::Path,
            _ => return None,
        })
    }
}

/// One grid position. `pos.x` is the row and `pos.y` the column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub pos: Point,
    pub tag: CellTag,
    pub(crate) neighbours: SmallVec<[Point; N_SMALLVEC_SIZE]>,
}

impl Cell {
    pub fn new(row: usize, col: usize, tag: CellTag) -> Cell {
        Cell {
            pos: Point::new(row as i32, col as i32),
            tag,
            neighbours: SmallVec::new(),
        }
    }
    pub fn row(&self) -> usize {
        self.pos.x as usize
    }
    pub fn col(&self) -> usize {
        self.pos.y as usize
    }
    /// Traversable neighbours as of the last
    /// [recompute_neighbours](crate::cell_grid::CellGrid::recompute_neighbours).
    pub fn neighbours(&self) -> &[Point] {
        &self.neighbours
    }
    /// Pixel placement of the cell's top-left corner for a renderer.
    pub fn origin(&self, cell_size: u32) -> (u32, u32) {
        (self.row() as u32 * cell_size, self.col() as u32 * cell_size)
    }
}
