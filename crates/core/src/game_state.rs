//! Game state module - manages the complete per-player match state
//!
//! This module ties together the grid, pieces, scoring and the injected
//! [`MatchStrategy`]. It handles placement, line clears, score/level/multiplier,
//! rotation, swapping, timeout penalties and the game-over transition.
//!
//! It knows nothing about time: the engine crate decides *when* a timeout
//! happens and calls [`GameState::handle_timeout`]; this module decides *what*
//! a timeout does. Every change is recorded as a [`GameEvent`] and drained with
//! [`GameState::take_events`].

use tracing::{debug, info};

use crate::events::GameEvent;
use crate::grid::{Grid, LineClear};
use crate::pieces::{rotate_clockwise, Piece};
use crate::scoring::{level_for_score, line_clear_score, next_multiplier, timer_delay_ms};
use crate::snapshot::{GameSnapshot, PieceSnapshot};
use crate::strategy::MatchStrategy;
use crate::types::{Difficulty, MatchPhase, GRID_SIZE, STARTING_LIVES};

/// Result of a placement attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Match is not running; nothing happened
    NotRunning,
    /// No current piece yet (multiplayer feed behind)
    NoPiece,
    /// Piece did not fit at the requested anchor
    Rejected,
    /// Piece placed; `cleared` describes the line-clear pass
    Placed { cleared: LineClear },
}

impl PlaceOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlaceOutcome::Placed { .. })
    }
}

/// Result of a timeout penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Match is not running; nothing happened
    NotRunning,
    /// A life was lost; the match goes on
    LifeLost { remaining: u32 },
    /// The timer ran out with no lives left: the match is over
    GameOver,
}

/// Complete match state
pub struct GameState {
    grid: Grid,
    current: Option<Piece>,
    next: Option<Piece>,
    strategy: Box<dyn MatchStrategy>,
    difficulty: Difficulty,
    phase: MatchPhase,
    score: u32,
    level: u32,
    lives: u32,
    multiplier: u32,
    /// Pending notifications (drained by the engine).
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase)
            .field("difficulty", &self.difficulty)
            .field("score", &self.score)
            .field("level", &self.level)
            .field("lives", &self.lives)
            .field("multiplier", &self.multiplier)
            .field("current", &self.current.map(|p| p.index()))
            .field("next", &self.next.map(|p| p.index()))
            .finish()
    }
}

impl GameState {
    /// Create a new match on the standard 5x5 grid
    pub fn new(difficulty: Difficulty, strategy: Box<dyn MatchStrategy>) -> Self {
        Self::with_grid(Grid::new(GRID_SIZE, GRID_SIZE), difficulty, strategy)
    }

    /// Create a new match on a custom grid
    pub fn with_grid(grid: Grid, difficulty: Difficulty, strategy: Box<dyn MatchStrategy>) -> Self {
        Self {
            grid,
            current: None,
            next: None,
            strategy,
            difficulty,
            phase: MatchPhase::Ready,
            score: 0,
            level: 0,
            lives: STARTING_LIVES,
            multiplier: 1,
            events: Vec::new(),
        }
    }

    /// Start the match: prime current/next pieces.
    ///
    /// Returns false if the match was already started.
    pub fn start(&mut self) -> bool {
        if self.phase != MatchPhase::Ready {
            return false;
        }
        info!(difficulty = self.difficulty.as_str(), "starting game");
        self.phase = MatchPhase::Running;
        self.events.push(GameEvent::Started);

        self.next = self.strategy.next_piece();
        self.advance();
        true
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == MatchPhase::GameOver
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current
    }

    pub fn next_piece(&self) -> Option<Piece> {
        self.next
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Move time budget for the current level (milliseconds)
    pub fn timer_delay_ms(&self) -> u32 {
        timer_delay_ms(self.difficulty, self.level)
    }

    /// Take all notifications recorded since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Place the current piece with its centre on (x, y).
    pub fn place_at(&mut self, x: i32, y: i32) -> PlaceOutcome {
        if !self.is_running() {
            return PlaceOutcome::NotRunning;
        }

        let Some(piece) = self.current else {
            self.events.push(GameEvent::PlacementRejected { x, y });
            return PlaceOutcome::NoPiece;
        };

        if !self.grid.place(&piece, x, y) {
            debug!(x, y, piece = piece.name(), "placement rejected");
            self.events.push(GameEvent::PlacementRejected { x, y });
            return PlaceOutcome::Rejected;
        }

        self.events.push(GameEvent::PiecePlaced { x, y, piece });
        let cleared = self.after_piece();
        self.advance();
        PlaceOutcome::Placed { cleared }
    }

    /// Line-clear pass plus score, multiplier and level updates.
    fn after_piece(&mut self) -> LineClear {
        let cleared = self.grid.clear_full_lines();
        let lines = cleared.lines();

        if lines > 0 {
            info!(lines, blocks = cleared.blocks, "lines cleared");
            self.events.push(GameEvent::LinesCleared {
                lines,
                blocks: cleared.blocks,
                cells: cleared.cells.clone(),
            });
        }

        self.add_score(lines, cleared.blocks);
        self.set_multiplier(next_multiplier(self.multiplier, lines));
        self.update_level();
        cleared
    }

    fn add_score(&mut self, lines: u32, blocks: u32) {
        let points = line_clear_score(lines, blocks, self.multiplier);
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged(self.score));
        self.strategy.score_changed(self.score);
    }

    fn set_multiplier(&mut self, multiplier: u32) {
        if multiplier == self.multiplier {
            return;
        }
        self.multiplier = multiplier;
        self.events.push(GameEvent::MultiplierChanged(multiplier));
    }

    fn update_level(&mut self) {
        let level = level_for_score(self.score);
        if level > self.level {
            info!(level, "level up");
            self.events.push(GameEvent::LevelUp(level));
        }
        self.level = level;
    }

    /// Current becomes next, next is drawn from the strategy.
    ///
    /// An empty next slot means the supply ran dry on the previous draw. Then
    /// only the current slot gets one more try and next stays empty for
    /// [`refill`](Self::refill), so a dry supply costs one draw per advance.
    fn advance(&mut self) {
        match self.next.take() {
            Some(next) => {
                self.current = Some(next);
                self.next = self.strategy.next_piece();
            }
            None => self.current = self.strategy.next_piece(),
        }

        debug!(
            current = ?self.current.map(|p| p.index()),
            next = ?self.next.map(|p| p.index()),
            "next piece"
        );
        self.events.push(GameEvent::NextPiece {
            current: self.current,
            next: self.next,
        });
    }

    /// Fill empty current/next slots from the strategy.
    ///
    /// Used when the multiplayer feed catches up after running dry. Returns true if
    /// any slot was filled.
    pub fn refill(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        let mut filled = false;
        if self.current.is_none() {
            self.current = self.strategy.next_piece();
            filled |= self.current.is_some();
        }
        if self.current.is_some() && self.next.is_none() {
            self.next = self.strategy.next_piece();
            filled |= self.next.is_some();
        }

        if filled {
            self.events.push(GameEvent::NextPiece {
                current: self.current,
                next: self.next,
            });
        }
        filled
    }

    /// Turn the current piece clockwise. No grid effect.
    pub fn rotate_current(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };
        let rotated = rotate_clockwise(&piece);
        self.current = Some(rotated);
        self.events.push(GameEvent::PieceRotated(rotated));
        true
    }

    /// Exchange current and next piece. No grid effect.
    pub fn swap_pieces(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let (Some(current), Some(next)) = (self.current, self.next) else {
            return false;
        };
        self.current = Some(next);
        self.next = Some(current);
        self.events.push(GameEvent::PiecesSwapped {
            current: next,
            next: current,
        });
        true
    }

    /// The move timer ran out.
    ///
    /// With lives left this costs one, resets the multiplier and draws the
    /// next piece without touching the grid. A timeout that finds no lives
    /// left ends the match.
    pub fn handle_timeout(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::NotRunning;
        }

        if self.lives == 0 {
            info!(score = self.score, "game over");
            self.phase = MatchPhase::GameOver;
            self.strategy.died();
            self.events.push(GameEvent::GameOver);
            return TickOutcome::GameOver;
        }

        self.lives -= 1;
        info!(remaining = self.lives, "life lost");
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        self.strategy.lives_changed(self.lives);

        self.set_multiplier(1);
        self.advance();
        TickOutcome::LifeLost {
            remaining: self.lives,
        }
    }

    /// Plain copy of everything a view needs
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            cells: self.grid.cells().to_vec(),
            score: self.score,
            level: self.level,
            lives: self.lives,
            multiplier: self.multiplier,
            current: self.current.map(PieceSnapshot::from),
            next: self.next.map(PieceSnapshot::from),
            phase: self.phase,
            difficulty: self.difficulty,
        }
    }
}
