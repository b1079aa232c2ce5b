//! `grid` — the rectangular cell matrix and the placement records that
//! populate it.
//!
//! Coordinates are 0-based with `(x = col, y = row)`. A cell stores one
//! grapheme plus the ids of every word covering it; intersections are
//! exactly the cells with two or more word ids.

use serde::{Deserialize, Serialize};

use crate::clue::ClueItem;

/// Word orientation on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    #[must_use]
    pub fn perpendicular(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    /// The `i`-th covered coordinate of a word starting at `(x, y)`.
    #[must_use]
    pub fn offset(self, x: i64, y: i64, i: i64) -> (i64, i64) {
        match self {
            Direction::Across => (x + i, y),
            Direction::Down => (x, y + i),
        }
    }
}

/// One grid cell: a grapheme (absent while empty) and the ids of the words
/// covering it, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub grapheme: Option<String>,
    pub word_ids: Vec<usize>,
}

impl Cell {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grapheme.is_none()
    }
}

/// Rectangular W×H matrix of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.width + x]
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        &mut self.cells[y * self.width + x]
    }

    /// Whether `(x, y)` lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// The grapheme at `(x, y)`, or `None` when out of bounds or empty.
    #[must_use]
    pub fn grapheme_at(&self, x: i64, y: i64) -> Option<&str> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cell(x as usize, y as usize).grapheme.as_deref()
    }

    /// True when `(x, y)` is outside the grid or holds no grapheme.
    ///
    /// Out-of-bounds counts as free so the adjacency and word-end rules
    /// read naturally at the grid edge.
    #[must_use]
    pub fn is_free(&self, x: i64, y: i64) -> bool {
        self.grapheme_at(x, y).is_none()
    }

    /// Count of occupied cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

/// A committed (or failed) placement of one clue item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// 1-based, monotonically assigned in placement order.
    pub word_id: usize,
    pub item: ClueItem,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    pub placed: bool,
}

impl Placement {
    /// Iterate the covered coordinates together with the grapheme each one
    /// must hold. Empty for an unplaced record.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        let placed = self.placed;
        self.item.graphemes.iter().enumerate().filter_map(move |(i, g)| {
            if !placed {
                return None;
            }
            let (cx, cy) = self
                .direction
                .offset(self.x as i64, self.y as i64, i as i64);
            Some((cx as usize, cy as usize, g.as_str()))
        })
    }

    /// Coordinate of the last covered cell.
    #[must_use]
    pub fn end(&self) -> (i64, i64) {
        self.direction
            .offset(self.x as i64, self.y as i64, self.item.len() as i64 - 1)
    }
}

/// Start cell of a successfully placed word, used to detect collisions:
/// two words may begin on the same cell only when they run in orthogonal
/// directions and agree on the first grapheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRecord {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    pub first_grapheme: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grapheme::Locale;

    fn item(answer: &str) -> ClueItem {
        ClueItem::new(answer, "", &Locale::default()).unwrap()
    }

    #[test]
    fn test_direction_offset() {
        assert_eq!(Direction::Across.offset(3, 4, 2), (5, 4));
        assert_eq!(Direction::Down.offset(3, 4, 2), (3, 6));
        assert_eq!(Direction::Across.perpendicular(), Direction::Down);
    }

    #[test]
    fn test_grid_bounds_and_free() {
        let mut grid = Grid::new(4, 3);
        assert!(grid.in_bounds(3, 2));
        assert!(!grid.in_bounds(4, 0));
        assert!(!grid.in_bounds(-1, 0));
        assert!(grid.is_free(-1, 0));

        grid.cell_mut(1, 1).grapheme = Some("A".into());
        assert!(!grid.is_free(1, 1));
        assert_eq!(grid.grapheme_at(1, 1), Some("A"));
        assert_eq!(grid.filled_count(), 1);
    }

    #[test]
    fn test_placement_cells_across() {
        let p = Placement {
            word_id: 1,
            item: item("CAT"),
            x: 2,
            y: 5,
            direction: Direction::Across,
            placed: true,
        };
        let cells: Vec<_> = p.cells().collect();
        assert_eq!(cells, vec![(2, 5, "C"), (3, 5, "A"), (4, 5, "T")]);
        assert_eq!(p.end(), (4, 5));
    }

    #[test]
    fn test_unplaced_has_no_cells() {
        let p = Placement {
            word_id: 2,
            item: item("CAT"),
            x: 0,
            y: 0,
            direction: Direction::Down,
            placed: false,
        };
        assert_eq!(p.cells().count(), 0);
    }
}
