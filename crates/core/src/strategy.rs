//! Match strategies - where pieces come from and who hears about score/lives
//!
//! A single [`GameState`](crate::GameState) implementation serves every mode; the
//! mode-specific parts are injected as a [`MatchStrategy`]:
//!
//! - [`SoloStrategy`]: uniformly random pieces, no outside reporting
//! - [`SequenceStrategy`]: a fixed, repeating list of catalog indices (practice, tests)
//! - the multiplayer strategy in the adapter crate: pieces from the server feed,
//!   score/lives/death reported back to the server

use crate::pieces::{create_piece, random_piece, Piece};
use crate::rng::SimpleRng;

/// Piece supply plus status hooks for one match.
///
/// Hooks are called while the game state is being mutated, so implementations
/// must not block (queue the work instead).
pub trait MatchStrategy: Send {
    /// Draw the next piece. `None` means "no piece available yet".
    fn next_piece(&mut self) -> Option<Piece>;

    /// Score changed to `score`
    fn score_changed(&mut self, _score: u32) {}

    /// A life was lost; `lives` remain
    fn lives_changed(&mut self, _lives: u32) {}

    /// The match is over
    fn died(&mut self) {}
}

/// Solo play: random pieces
#[derive(Debug, Clone)]
pub struct SoloStrategy {
    rng: SimpleRng,
}

impl SoloStrategy {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    pub fn from_clock() -> Self {
        Self {
            rng: SimpleRng::from_clock(),
        }
    }
}

impl MatchStrategy for SoloStrategy {
    fn next_piece(&mut self) -> Option<Piece> {
        Some(random_piece(&mut self.rng))
    }
}

/// Cycles through a fixed list of catalog indices. Invalid indices are skipped.
#[derive(Debug, Clone)]
pub struct SequenceStrategy {
    pieces: Vec<Piece>,
    cursor: usize,
}

impl SequenceStrategy {
    pub fn new(indices: &[u8]) -> Self {
        Self {
            pieces: indices.iter().filter_map(|&i| create_piece(i)).collect(),
            cursor: 0,
        }
    }
}

impl MatchStrategy for SequenceStrategy {
    fn next_piece(&mut self) -> Option<Piece> {
        if self.pieces.is_empty() {
            return None;
        }
        let piece = self.pieces[self.cursor % self.pieces.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Some(piece)
    }
}
