//! Game events - explicit change notifications
//!
//! The game never calls into rendering or audio. Every observable change is
//! pushed as a [`GameEvent`]; the engine drains them after each operation and
//! hands them to whoever listens (view, sounds, event log).

use crate::pieces::Piece;
use crate::types::GridCoord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Match moved from Ready to Running
    Started,
    /// Current/next pieces changed after a draw. Either may be missing while the
    /// multiplayer feed is behind.
    NextPiece {
        current: Option<Piece>,
        next: Option<Piece>,
    },
    /// Current piece written into the grid centred on (x, y)
    PiecePlaced { x: i32, y: i32, piece: Piece },
    /// Placement attempt that did not fit (or had no piece to place)
    PlacementRejected { x: i32, y: i32 },
    /// Current piece turned clockwise
    PieceRotated(Piece),
    /// Current and next piece exchanged
    PiecesSwapped { current: Piece, next: Piece },
    /// Full rows/columns were reset
    LinesCleared {
        lines: u32,
        blocks: u32,
        cells: Vec<GridCoord>,
    },
    ScoreChanged(u32),
    MultiplierChanged(u32),
    /// Level increased to the given value
    LevelUp(u32),
    /// A timeout cost a life
    LifeLost { remaining: u32 },
    /// Terminal transition; no more ticks follow
    GameOver,
    /// Move timer (re)started with this budget; `0` means the timer stopped
    GameLoopArmed { delay_ms: u32 },
}

impl GameEvent {
    /// Short snake_case tag, used in logs and the JSON event log
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::Started => "started",
            GameEvent::NextPiece { .. } => "next_piece",
            GameEvent::PiecePlaced { .. } => "piece_placed",
            GameEvent::PlacementRejected { .. } => "placement_rejected",
            GameEvent::PieceRotated(_) => "piece_rotated",
            GameEvent::PiecesSwapped { .. } => "pieces_swapped",
            GameEvent::LinesCleared { .. } => "lines_cleared",
            GameEvent::ScoreChanged(_) => "score_changed",
            GameEvent::MultiplierChanged(_) => "multiplier_changed",
            GameEvent::LevelUp(_) => "level_up",
            GameEvent::LifeLost { .. } => "life_lost",
            GameEvent::GameOver => "game_over",
            GameEvent::GameLoopArmed { .. } => "game_loop_armed",
        }
    }
}
