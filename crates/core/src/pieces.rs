//! Pieces module - the fixed piece catalog and mask rotation
//!
//! Every piece is a polyomino drawn on a 3x3 mask. The catalog is a `static`
//! table built at compile time and never mutated; pieces are value copies of a
//! catalog entry, so rotating one never affects the catalog or other pieces.

use crate::rng::SimpleRng;
use crate::types::{Rotation, PIECE_COUNT, PIECE_SIZE};

/// 3x3 mask, indexed `[row][col]`
pub type Mask = [[u8; PIECE_SIZE as usize]; PIECE_SIZE as usize];

/// One catalog entry: display name and 0/1 shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub shape: Mask,
}

/// The piece catalog. Entry `i` has colour value `i + 1`.
pub static CATALOG: [CatalogEntry; PIECE_COUNT as usize] = [
    CatalogEntry {
        name: "Line",
        shape: [[0, 1, 0], [0, 1, 0], [0, 1, 0]],
    },
    CatalogEntry {
        name: "C",
        shape: [[0, 1, 1], [0, 1, 0], [0, 1, 1]],
    },
    CatalogEntry {
        name: "Plus",
        shape: [[0, 1, 0], [1, 1, 1], [0, 1, 0]],
    },
    CatalogEntry {
        name: "Dot",
        shape: [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
    },
    CatalogEntry {
        name: "Square",
        shape: [[1, 1, 0], [1, 1, 0], [0, 0, 0]],
    },
    CatalogEntry {
        name: "L",
        shape: [[0, 1, 0], [0, 1, 0], [0, 1, 1]],
    },
    CatalogEntry {
        name: "J",
        shape: [[0, 1, 0], [0, 1, 0], [1, 1, 0]],
    },
    CatalogEntry {
        name: "S",
        shape: [[0, 0, 1], [0, 1, 1], [0, 1, 0]],
    },
    CatalogEntry {
        name: "Z",
        shape: [[1, 0, 0], [1, 1, 0], [0, 1, 0]],
    },
    CatalogEntry {
        name: "T",
        shape: [[1, 1, 1], [0, 1, 0], [0, 0, 0]],
    },
    CatalogEntry {
        name: "X",
        shape: [[1, 0, 1], [0, 1, 0], [1, 0, 1]],
    },
    CatalogEntry {
        name: "Corner",
        shape: [[0, 1, 1], [0, 1, 0], [0, 0, 0]],
    },
    CatalogEntry {
        name: "Inverse Corner",
        shape: [[1, 1, 0], [0, 1, 0], [0, 0, 0]],
    },
    CatalogEntry {
        name: "Double",
        shape: [[0, 0, 0], [1, 1, 0], [0, 0, 0]],
    },
    CatalogEntry {
        name: "Triple",
        shape: [[0, 1, 0], [0, 1, 0], [0, 1, 0]],
    },
];

/// A piece instance: catalog identity plus its own (possibly rotated) mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    index: u8,
    blocks: Mask,
    rotation: Rotation,
}

impl Piece {
    /// Catalog index (`0..PIECE_COUNT`)
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Colour value written into the grid (`index + 1`)
    pub fn value(&self) -> u8 {
        self.index + 1
    }

    pub fn name(&self) -> &'static str {
        CATALOG[self.index as usize].name
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Mask cells hold `0` or [`Piece::value`]
    pub fn blocks(&self) -> &Mask {
        &self.blocks
    }

    /// Offsets (dx, dy) of the filled mask cells, relative to the mask's top-left
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.blocks.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(move |(dx, _)| (dx as i32, dy as i32))
        })
    }

    /// Number of filled mask cells
    pub fn block_count(&self) -> usize {
        self.cells().count()
    }

    /// A copy of this piece turned 90° clockwise
    pub fn rotated(&self) -> Self {
        rotate_clockwise(self)
    }
}

/// Create a fresh piece for catalog entry `index`.
///
/// Returns None for indices outside the catalog.
pub fn create_piece(index: u8) -> Option<Piece> {
    if index >= PIECE_COUNT {
        return None;
    }
    Some(from_catalog(index))
}

/// Pick a uniformly random catalog entry
pub fn random_piece(rng: &mut SimpleRng) -> Piece {
    from_catalog(rng.next_range(PIECE_COUNT as u32) as u8)
}

fn from_catalog(index: u8) -> Piece {
    let index = index % PIECE_COUNT;
    let value = index + 1;
    let mut blocks = CATALOG[index as usize].shape;
    for cell in blocks.iter_mut().flatten() {
        *cell *= value;
    }
    Piece {
        index,
        blocks,
        rotation: Rotation::North,
    }
}

/// Turn a piece 90° clockwise. Pure: the input is untouched.
pub fn rotate_clockwise(piece: &Piece) -> Piece {
    let n = PIECE_SIZE as usize;
    let mut blocks = [[0; PIECE_SIZE as usize]; PIECE_SIZE as usize];
    for (row, out) in blocks.iter_mut().enumerate() {
        for (col, cell) in out.iter_mut().enumerate() {
            *cell = piece.blocks[n - 1 - col][row];
        }
    }
    Piece {
        index: piece.index,
        blocks,
        rotation: piece.rotation.rotate_cw(),
    }
}
