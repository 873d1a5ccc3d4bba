//! Row-major rectangular grids and the tile vocabulary.

use serde::{Deserialize, Serialize};

/// Categorical terrain state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Ground,
    GrassFresh,
    GrassEaten,
    Water,
    Tree,
}

impl Tile {
    /// Water and trees block agent movement.
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Water | Tile::Tree)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Ground
    }
}

/// Fixed-size 2D field. Signed coordinates so callers can probe
/// neighborhoods without pre-checking bounds: out-of-bounds reads
/// yield the element default, writes outside the grid are refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn fill(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(&self.cells[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        if self.in_bounds(x, y) {
            Some(&mut self.cells[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub(crate) fn cells_len(&self) -> usize {
        self.cells.len()
    }
}

impl<T: Copy + Default> Grid<T> {
    /// Value at `(x, y)`, or the neutral default outside the grid.
    pub fn at(&self, x: i32, y: i32) -> T {
        self.get(x, y).copied().unwrap_or_default()
    }

    /// In-bounds write; returns whether the write landed.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_neutral() {
        let grid: Grid<f32> = Grid::fill(4, 3, 0.5);
        assert_eq!(grid.at(-1, 0), 0.0);
        assert_eq!(grid.at(0, 3), 0.0);
        assert_eq!(grid.at(4, 0), 0.0);
        assert_eq!(grid.at(2, 1), 0.5);
    }

    #[test]
    fn out_of_bounds_writes_are_refused() {
        let mut grid: Grid<u64> = Grid::fill(2, 2, 0);
        assert!(!grid.set(2, 0, 9));
        assert!(!grid.set(0, -1, 9));
        assert!(grid.set(1, 1, 9));
        assert_eq!(grid.at(1, 1), 9);
    }

    #[test]
    fn from_fn_is_row_major() {
        let grid = Grid::from_fn(3, 2, |x, y| (x, y));
        assert_eq!(grid.cells()[0], (0, 0));
        assert_eq!(grid.cells()[3], (0, 1));
        assert_eq!(grid.at(2, 1), (2, 1));
    }

    #[test]
    fn water_and_trees_block_movement() {
        assert!(Tile::Ground.is_passable());
        assert!(Tile::GrassFresh.is_passable());
        assert!(Tile::GrassEaten.is_passable());
        assert!(!Tile::Water.is_passable());
        assert!(!Tile::Tree.is_passable());
    }
}
