//! Grid module - manages the play area
//!
//! The grid is a small square of cells, each holding `0` (empty) or the value of
//! the piece that filled it (`1..=PIECE_COUNT`).
//! Uses a flat row-major vector; dimensions never change after construction.
//! Coordinates: (x, y) where x is the column (left to right) and y the row (top to bottom).
//! A piece is anchored on its centre cell, so its 3x3 mask starts at (x - 1, y - 1).

use arrayvec::ArrayVec;

use crate::pieces::Piece;
use crate::types::{GridCoord, GRID_SIZE, OUT_OF_BOUNDS};

/// Largest supported side length
pub const MAX_GRID_SIZE: u8 = 16;

/// Result of one line-clear pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClear {
    /// Indices of rows that were full
    pub rows: ArrayVec<u8, { MAX_GRID_SIZE as usize }>,
    /// Indices of columns that were full
    pub cols: ArrayVec<u8, { MAX_GRID_SIZE as usize }>,
    /// Every cell that was reset, row-major, each listed once
    pub cells: Vec<GridCoord>,
    /// Number of distinct non-zero cells that were reset
    pub blocks: u32,
}

impl LineClear {
    /// Full rows plus full columns; a row and a column crossing each count.
    pub fn lines(&self) -> u32 {
        (self.rows.len() + self.cols.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }
}

/// The play grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: u8,
    rows: u8,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<u8>,
}

impl Grid {
    /// Create an empty grid. Sides are clamped to `1..=MAX_GRID_SIZE`.
    pub fn new(cols: u8, rows: u8) -> Self {
        let cols = cols.clamp(1, MAX_GRID_SIZE);
        let rows = rows.clamp(1, MAX_GRID_SIZE);
        Self {
            cols,
            rows,
            cells: vec![0; cols as usize * rows as usize],
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        Some(y as usize * self.cols as usize + x as usize)
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Value at (x, y), or [`OUT_OF_BOUNDS`] (-1) outside the grid.
    pub fn get(&self, x: i32, y: i32) -> i32 {
        match self.index(x, y) {
            Some(idx) => self.cells[idx] as i32,
            None => OUT_OF_BOUNDS,
        }
    }

    /// Write a value. Returns false (and writes nothing) outside the grid.
    pub fn set(&mut self, x: i32, y: i32, value: u8) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// In bounds and empty
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == 0
    }

    /// Check whether `piece` fits with its centre on (x, y).
    ///
    /// Every filled mask cell must land inside the grid on an empty cell;
    /// empty mask cells may hang over the edge.
    pub fn can_place(&self, piece: &Piece, x: i32, y: i32) -> bool {
        piece
            .cells()
            .all(|(dx, dy)| self.is_free(x - 1 + dx, y - 1 + dy))
    }

    /// Write `piece` with its centre on (x, y).
    ///
    /// Re-validates first; an invalid placement leaves the grid untouched and
    /// returns false.
    pub fn place(&mut self, piece: &Piece, x: i32, y: i32) -> bool {
        if !self.can_place(piece, x, y) {
            return false;
        }

        let value = piece.value();
        for (dx, dy) in piece.cells() {
            self.set(x - 1 + dx, y - 1 + dy, value);
        }
        true
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: u8) -> bool {
        if y >= self.rows {
            return false;
        }
        let start = y as usize * self.cols as usize;
        self.cells[start..start + self.cols as usize]
            .iter()
            .all(|&cell| cell != 0)
    }

    /// Check if a column is completely filled
    pub fn is_col_full(&self, x: u8) -> bool {
        if x >= self.cols {
            return false;
        }
        (0..self.rows).all(|y| self.get(x as i32, y as i32) != 0)
    }

    /// Reset every full row and every full column.
    ///
    /// Rows and columns are detected on the grid as it was before any reset, so a
    /// row and a column crossing are both counted. Cells covered twice are reset
    /// (and counted in `blocks`) once. Nothing shifts: cleared cells just become empty.
    pub fn clear_full_lines(&mut self) -> LineClear {
        let mut result = LineClear::default();

        for y in 0..self.rows {
            if self.is_row_full(y) {
                result.rows.push(y);
            }
        }
        for x in 0..self.cols {
            if self.is_col_full(x) {
                result.cols.push(x);
            }
        }

        if result.is_empty() {
            return result;
        }

        let mut marked = vec![false; self.cells.len()];
        let cols = self.cols as usize;
        for &y in &result.rows {
            let start = y as usize * cols;
            marked[start..start + cols].fill(true);
        }
        for &x in &result.cols {
            for y in 0..self.rows as usize {
                marked[y * cols + x as usize] = true;
            }
        }

        for (idx, &hit) in marked.iter().enumerate() {
            if !hit {
                continue;
            }
            if self.cells[idx] != 0 {
                result.blocks += 1;
            }
            self.cells[idx] = 0;
            result
                .cells
                .push(GridCoord::new((idx % cols) as u8, (idx / cols) as u8));
        }

        result
    }

    /// Reset every cell to empty
    pub fn clear_all(&mut self) {
        self.cells.fill(0);
    }

    /// One row of cells (empty slice outside the grid)
    pub fn row(&self, y: u8) -> &[u8] {
        if y >= self.rows {
            return &[];
        }
        let start = y as usize * self.cols as usize;
        &self.cells[start..start + self.cols as usize]
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Number of non-empty cells
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_SIZE, GRID_SIZE)
    }
}
