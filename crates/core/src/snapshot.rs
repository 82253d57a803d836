use crate::pieces::{Mask, Piece};
use crate::types::{Difficulty, MatchPhase, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSnapshot {
    pub index: u8,
    pub name: &'static str,
    pub rotation: Rotation,
    pub blocks: Mask,
}

impl From<Piece> for PieceSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            index: value.index(),
            name: value.name(),
            rotation: value.rotation(),
            blocks: *value.blocks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub cols: u8,
    pub rows: u8,
    /// Row-major cell values (`0` empty)
    pub cells: Vec<u8>,
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub multiplier: u32,
    pub current: Option<PieceSnapshot>,
    pub next: Option<PieceSnapshot>,
    pub phase: MatchPhase,
    pub difficulty: Difficulty,
}

impl GameSnapshot {
    /// Cell value at (x, y), `None` outside the grid
    pub fn cell(&self, x: u8, y: u8) -> Option<u8> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.cells.get(y as usize * self.cols as usize + x as usize).copied()
    }

    pub fn playable(&self) -> bool {
        self.phase == MatchPhase::Running
    }
}
