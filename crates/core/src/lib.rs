//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the puzzle rules and the per-player match state.
//! It has **no dependencies** on timers, networking, or rendering:
//!
//! - **Deterministic**: a seeded solo match or a fixed piece sequence replays exactly
//! - **Testable**: every rule is a plain method call
//! - **Headless**: observers learn about changes through drained [`GameEvent`]s
//!
//! # Module Structure
//!
//! - [`grid`]: the 5x5 play area, placement checks and row/column clearing
//! - [`pieces`]: the 15-entry piece catalog and clockwise rotation
//! - [`game_state`]: placement, score, multiplier, level, lives and game over
//! - [`strategy`]: where pieces come from (solo random, fixed sequence, multiplayer feed)
//! - [`scoring`]: score, multiplier, level and move-timer formulas
//! - [`events`]: change notifications
//! - [`rng`]: small seeded generator for solo draws
//!
//! # Rules
//!
//! - A piece is placed with its 3x3 mask centred on the chosen cell; every
//!   filled mask cell must land on an empty in-bounds cell.
//! - After each placement every full row and every full column is reset at once.
//!   Nothing falls.
//! - Clearing scores `lines * blocks * 10 * multiplier`; the multiplier grows
//!   with consecutive clearing placements.
//! - A move timer (driven by the engine crate) costs a life when it runs out;
//!   running out with no lives left ends the match.
//!
//! # Example
//!
//! ```
//! use tetrecs_core::{GameState, SequenceStrategy};
//! use tetrecs_core::types::Difficulty;
//!
//! // Dot pieces only
//! let mut game = GameState::new(Difficulty::Normal, Box::new(SequenceStrategy::new(&[3])));
//! game.start();
//!
//! for x in 0..5 {
//!     assert!(game.place_at(x, 0).is_placed());
//! }
//!
//! // Row 0 filled and cleared: 1 line * 5 blocks * 10
//! assert_eq!(game.score(), 50);
//! assert_eq!(game.multiplier(), 2);
//! ```

pub mod events;
pub mod game_state;
pub mod grid;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod strategy;

pub use tetrecs_types as types;

// Re-export commonly used types for convenience
pub use events::GameEvent;
pub use game_state::{GameState, PlaceOutcome, TickOutcome};
pub use grid::{Grid, LineClear};
pub use pieces::{create_piece, random_piece, rotate_clockwise, Piece};
pub use rng::SimpleRng;
pub use scoring::{level_for_score, line_clear_score, next_multiplier, timer_delay_ms};
pub use snapshot::{GameSnapshot, PieceSnapshot};
pub use strategy::{MatchStrategy, SequenceStrategy, SoloStrategy};
