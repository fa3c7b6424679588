//! Playfield: fixed grid of locked cells, merge on lock, full-row sweep.

use crate::collision::Offset;
use crate::piece::Shape;
use std::collections::VecDeque;

/// Playfield width in cells.
pub const FIELD_WIDTH: usize = 10;
/// Playfield height in cells.
pub const FIELD_HEIGHT: usize = 20;

/// Cell value: `EMPTY` or `1..=7` for the piece type that filled it.
///
/// Gameplay only cares about zero / non-zero; the value picks the render colour.
pub type Cell = u8;

pub const EMPTY: Cell = 0;

/// Grid of cells. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    width: usize,
    /// rows[y][x] = cell. Every row has exactly `width` cells.
    rows: VecDeque<Vec<Cell>>,
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Field {
    pub fn new() -> Self {
        let rows = (0..FIELD_HEIGHT).map(|_| vec![EMPTY; FIELD_WIDTH]).collect();
        Self {
            width: FIELD_WIDTH,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Maps signed coordinates to indices, or `None` when off the grid.
    #[inline]
    fn index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let r = usize::try_from(row).ok()?;
        let c = usize::try_from(col).ok()?;
        (r < self.height() && c < self.width).then_some((r, c))
    }

    /// Cell at (row, col); `None` when the coordinates are outside the grid.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        let (r, c) = self.index(row, col)?;
        Some(self.rows[r][c])
    }

    /// Writes a cell. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, row: i32, col: i32, value: Cell) -> bool {
        match self.index(row, col) {
            Some((r, c)) => {
                self.rows[r][c] = value;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(EMPTY);
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|&c| c == EMPTY))
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows[row].iter().all(|&c| c != EMPTY)
    }

    /// Removes `row` and prepends an empty row, so the height never changes.
    pub fn remove_row(&mut self, row: usize) {
        if self.rows.remove(row).is_some() {
            self.rows.push_front(vec![EMPTY; self.width]);
        }
    }

    /// Copies the shape's non-zero cells into the grid at `offset`.
    ///
    /// Callers only merge positions that passed the collision check, so
    /// every written cell is in bounds.
    pub fn merge(&mut self, shape: &Shape, offset: Offset) {
        for (r, c, value) in shape.occupied() {
            self.set(offset.y + r as i32, offset.x + c as i32, value);
        }
    }

    /// Removes every full row and returns how many were removed.
    ///
    /// Scans bottom to top. After a removal the rows above have shifted down,
    /// so the same index is examined again before moving up.
    pub fn sweep(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = self.height();
        while row > 0 {
            if self.is_row_full(row - 1) {
                self.remove_row(row - 1);
                cleared += 1;
            } else {
                row -= 1;
            }
        }
        cleared
    }
}
