//! Scoring module - points, multiplier streak, levels and the move timer
//!
//! Rules:
//! - A placement that clears lines scores `lines * blocks * 10 * multiplier`.
//! - The multiplier grows by one for every consecutive clearing placement and
//!   drops back to 1 after a placement (or a timeout) that clears nothing.
//! - The level is derived from the score: one level per 1000 points.
//! - The move timer shrinks by 500ms per level down to a 2500ms floor.

use crate::types::{
    Difficulty, MIN_TIMER_DELAY_MS, POINTS_PER_BLOCK, POINTS_PER_LEVEL, TIMER_STEP_MS,
};

/// Points for one placement.
/// lines: full rows + full columns cleared
/// blocks: distinct non-empty cells reset
pub fn line_clear_score(lines: u32, blocks: u32, multiplier: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    lines
        .saturating_mul(blocks)
        .saturating_mul(POINTS_PER_BLOCK)
        .saturating_mul(multiplier)
}

/// Multiplier after a placement that cleared `lines`
pub fn next_multiplier(current: u32, lines: u32) -> u32 {
    if lines > 0 {
        current.saturating_add(1)
    } else {
        1
    }
}

/// Level for a score
pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL
}

/// Time budget for one move (milliseconds)
pub fn timer_delay_ms(difficulty: Difficulty, level: u32) -> u32 {
    difficulty
        .base_delay_ms()
        .saturating_sub(TIMER_STEP_MS.saturating_mul(level))
        .max(MIN_TIMER_DELAY_MS)
}
