//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core rules, timed engine, multiplayer protocol, text view).
//!
//! # Grid Dimensions
//!
//! The play area is a small square grid:
//!
//! - **Size**: 5 columns by 5 rows (indexed 0-4)
//! - **Pieces**: every piece fits a 3x3 mask and is anchored at its centre cell
//!
//! # Timer Constants
//!
//! The time budget for a move decays with the level:
//!
//! | Difficulty | Base | Step per level | Floor |
//! |------------|------|----------------|-------|
//! | easy | 20000ms | 500ms | 2500ms |
//! | normal | 12000ms | 500ms | 2500ms |
//! | challenge | 10000ms | 500ms | 2500ms |
//!
//! # Examples
//!
//! ```
//! use tetrecs_types::{Difficulty, PlayerAction, Rotation, GRID_SIZE};
//!
//! let difficulty = Difficulty::from_str("easy");
//! assert_eq!(difficulty, Difficulty::Easy);
//!
//! let rotation = Rotation::North.rotate_cw();
//! assert_eq!(rotation, Rotation::East);
//!
//! let action = PlayerAction::parse("place 2 3").unwrap();
//! assert_eq!(action, PlayerAction::Place { x: 2, y: 3 });
//!
//! assert_eq!(GRID_SIZE, 5);
//! ```

/// Side length of the square play grid (5 columns x 5 rows)
pub const GRID_SIZE: u8 = 5;

/// Side length of a piece mask (and of the preview boards)
pub const PIECE_SIZE: u8 = 3;

/// Number of shapes in the piece catalog
pub const PIECE_COUNT: u8 = 15;

/// Lives a player starts a match with
pub const STARTING_LIVES: u32 = 3;

/// Points needed per level (`level = score / POINTS_PER_LEVEL`)
pub const POINTS_PER_LEVEL: u32 = 1000;

/// Points per cleared block, before line count and multiplier
pub const POINTS_PER_BLOCK: u32 = 10;

/// Shortest time budget for a move, whatever the level (2500ms)
pub const MIN_TIMER_DELAY_MS: u32 = 2500;

/// Time budget removed per level (500ms)
pub const TIMER_STEP_MS: u32 = 500;

/// Out-of-range sentinel returned by grid reads
pub const OUT_OF_BOUNDS: i32 = -1;


/// Difficulty modes selectable before a match
///
/// The mode only changes the base of the move timer:
/// - **Easy**: 20s at level 0
/// - **Normal**: 12s at level 0 (also the default for unknown names)
/// - **Challenge**: 10s at level 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Challenge,
}

impl Difficulty {
    /// Parse difficulty from string (case-insensitive)
    ///
    /// Unknown names select [`Difficulty::Normal`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("easy"), Difficulty::Easy);
    /// assert_eq!(Difficulty::from_str("Challenge"), Difficulty::Challenge);
    /// assert_eq!(Difficulty::from_str("whatever"), Difficulty::Normal);
    /// ```
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "challenge" => Difficulty::Challenge,
            _ => Difficulty::Normal,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Challenge => "challenge",
        }
    }

    /// Move timer at level 0, in milliseconds
    pub fn base_delay_ms(&self) -> u32 {
        match self {
            Difficulty::Easy => 20_000,
            Difficulty::Normal => 12_000,
            Difficulty::Challenge => 10_000,
        }
    }
}

/// Lifecycle of a single match
///
/// `Ready → Running → GameOver`; `GameOver` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchPhase {
    #[default]
    Ready,
    Running,
    GameOver,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::Ready => "ready",
            MatchPhase::Running => "running",
            MatchPhase::GameOver => "game_over",
        }
    }
}

/// Rotation states of a piece mask
///
/// - **North**: Catalog orientation (0° rotation)
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 270° clockwise
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::East.rotate_cw(), Rotation::South);
    /// assert_eq!(Rotation::South.rotate_cw(), Rotation::West);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// A cell coordinate on the grid: `x` is the column, `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: u8,
    pub y: u8,
}

impl GridCoord {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Player actions accepted while a match is running
///
/// Used by the text front-end; the engine exposes one method per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Place the current piece with its centre on (x, y)
    Place { x: i32, y: i32 },
    /// Rotate the current piece 90° clockwise
    Rotate,
    /// Exchange current and next piece
    Swap,
    /// Leave the match
    Quit,
}

impl PlayerAction {
    /// Parse one input line (case-insensitive)
    ///
    /// Accepts `place <x> <y>` / `p <x> <y>`, `rotate` / `r`,
    /// `swap` / `s`, and `quit` / `q`.
    pub fn parse(line: &str) -> Option<Self> {
        let lowered = line.trim().to_lowercase();
        let mut parts = lowered.split_whitespace();
        let verb = parts.next()?;
        let action = match verb {
            "place" | "p" => {
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                PlayerAction::Place { x, y }
            }
            "rotate" | "r" => PlayerAction::Rotate,
            "swap" | "s" => PlayerAction::Swap,
            "quit" | "q" => PlayerAction::Quit,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(action)
    }
}
