//! Timed match session
//!
//! [`GameEngine`] owns one [`GameState`] behind a mutex together with the
//! [`TimedLoop`] that penalises inaction. Player operations and the timer tick
//! both run inside that mutex, so they never interleave. Events drained from the
//! state after every operation go out on an unbounded channel and are never
//! awaited.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use tetrecs_core::types::{Difficulty, MatchPhase};
use tetrecs_core::{GameEvent, GameSnapshot, GameState, MatchStrategy, PlaceOutcome, TickOutcome};

use crate::timer::{Tick, TimedLoop};
use crate::EngineError;

struct Shared {
    state: Mutex<GameState>,
    timer: TimedLoop,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: GameEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn flush(&self, state: &mut GameState) {
        for event in state.take_events() {
            self.notify(event);
        }
    }
}

/// Handle to a running match. Cheap to clone; all clones drive the same match.
#[derive(Clone)]
pub struct GameEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("state", &*self.shared.lock_state())
            .field("timer_pending", &self.shared.timer.is_pending())
            .finish()
    }
}

impl GameEngine {
    /// Wrap a prepared state. Must be called inside a tokio runtime.
    pub fn new(state: GameState) -> Result<(Self, mpsc::UnboundedReceiver<GameEvent>), EngineError> {
        let timer = TimedLoop::new()?;
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            timer,
            events,
        });
        Ok((Self { shared }, rx))
    }

    /// New match on the standard grid with `strategy` as piece source
    pub fn with_strategy(
        difficulty: Difficulty,
        strategy: Box<dyn MatchStrategy>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<GameEvent>), EngineError> {
        Self::new(GameState::new(difficulty, strategy))
    }

    /// Ready -> Running: prime the pieces and arm the move timer.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut state = self.shared.lock_state();
        if !state.start() {
            return Err(EngineError::AlreadyStarted);
        }
        self.shared.flush(&mut state);
        arm(&self.shared, &state, false);
        Ok(())
    }

    /// Place the current piece centred on (x, y).
    ///
    /// A successful placement restarts the move timer from zero with the delay
    /// for the (possibly new) level.
    pub fn place_at(&self, x: i32, y: i32) -> PlaceOutcome {
        let mut state = self.shared.lock_state();
        let outcome = state.place_at(x, y);
        self.shared.flush(&mut state);
        if outcome.is_placed() {
            arm(&self.shared, &state, true);
        }
        outcome
    }

    /// Rotate the current piece. The timer keeps running.
    pub fn rotate_current(&self) -> bool {
        let mut state = self.shared.lock_state();
        let rotated = state.rotate_current();
        self.shared.flush(&mut state);
        rotated
    }

    /// Swap current and next piece. The timer keeps running.
    pub fn swap_pieces(&self) -> bool {
        let mut state = self.shared.lock_state();
        let swapped = state.swap_pieces();
        self.shared.flush(&mut state);
        swapped
    }

    /// Fill empty piece slots after the piece source caught up.
    pub fn refill(&self) -> bool {
        let mut state = self.shared.lock_state();
        let filled = state.refill();
        self.shared.flush(&mut state);
        filled
    }

    /// Stop the move timer for good.
    ///
    /// Safe to call any number of times; no tick runs after the first call.
    pub fn shutdown(&self) {
        if self.shared.timer.shutdown() {
            info!("game loop shut down");
            self.shared.notify(GameEvent::GameLoopArmed { delay_ms: 0 });
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.lock_state().snapshot()
    }

    pub fn phase(&self) -> MatchPhase {
        self.shared.lock_state().phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase() == MatchPhase::GameOver
    }

    pub fn score(&self) -> u32 {
        self.shared.lock_state().score()
    }

    pub fn level(&self) -> u32 {
        self.shared.lock_state().level()
    }

    pub fn lives(&self) -> u32 {
        self.shared.lock_state().lives()
    }

    pub fn multiplier(&self) -> u32 {
        self.shared.lock_state().multiplier()
    }

    /// Whether a timeout tick is currently armed
    pub fn timer_pending(&self) -> bool {
        self.shared.timer.is_pending()
    }

    /// Current move budget in milliseconds
    pub fn timer_delay_ms(&self) -> u32 {
        self.shared.lock_state().timer_delay_ms()
    }
}

/// Arm the move timer for the state's current level.
///
/// Called with the state lock held.
fn arm(shared: &Arc<Shared>, state: &GameState, replace: bool) {
    let delay_ms = state.timer_delay_ms();
    let weak = Arc::downgrade(shared);
    let task = move |tick| on_tick(&weak, tick);
    let delay = Duration::from_millis(u64::from(delay_ms));

    let armed = if replace {
        shared.timer.cancel_and_reschedule(delay, task)
    } else {
        shared.timer.schedule(delay, task)
    };
    if armed {
        shared.notify(GameEvent::GameLoopArmed { delay_ms });
    }
}

fn on_tick(weak: &Weak<Shared>, tick: Tick) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut state = shared.lock_state();
    if !shared.timer.claim(tick) {
        return;
    }

    debug!(generation = tick.generation(), "move timer expired");
    let outcome = state.handle_timeout();
    shared.flush(&mut state);

    match outcome {
        TickOutcome::LifeLost { .. } => arm(&shared, &state, false),
        TickOutcome::GameOver => {
            if shared.timer.shutdown() {
                shared.notify(GameEvent::GameLoopArmed { delay_ms: 0 });
            }
        }
        TickOutcome::NotRunning => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrecs_core::SequenceStrategy;

    const DOT: u8 = 3;

    fn engine(indices: &[u8]) -> (GameEngine, mpsc::UnboundedReceiver<GameEvent>) {
        GameEngine::with_strategy(
            Difficulty::Normal,
            Box::new(SequenceStrategy::new(indices)),
        )
        .unwrap()
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_arms_timer() {
        let (engine, mut rx) = engine(&[DOT]);
        engine.start().unwrap();
        assert_eq!(engine.start(), Err(EngineError::AlreadyStarted));

        assert!(engine.timer_pending());
        let events = drain(&mut rx);
        assert_eq!(events.first(), Some(&GameEvent::Started));
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameLoopArmed { delay_ms: 12000 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_costs_life_and_rearms() {
        let (engine, mut rx) = engine(&[DOT]);
        engine.start().unwrap();
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(12_001)).await;
        assert_eq!(engine.lives(), 2);
        assert!(engine.timer_pending());

        let events = drain(&mut rx);
        assert!(events.contains(&GameEvent::LifeLost { remaining: 2 }));
        assert!(events.contains(&GameEvent::GameLoopArmed { delay_ms: 12000 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_placement_resets_timer() {
        let (engine, _rx) = engine(&[DOT]);
        engine.start().unwrap();

        tokio::time::sleep(Duration::from_millis(11_000)).await;
        assert!(engine.place_at(2, 2).is_placed());

        // The original deadline passes without a penalty.
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(engine.lives(), 3);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(engine.lives(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_placement_keeps_timer() {
        let (engine, _rx) = engine(&[DOT]);
        engine.start().unwrap();
        assert!(engine.place_at(2, 2).is_placed());

        tokio::time::sleep(Duration::from_millis(6_000)).await;
        assert_eq!(engine.place_at(2, 2), PlaceOutcome::Rejected);

        tokio::time::sleep(Duration::from_millis(6_500)).await;
        assert_eq!(engine.lives(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_stops_ticks() {
        let (engine, mut rx) = engine(&[DOT]);
        engine.start().unwrap();

        // Three timeouts take every life; the match goes on until the next one.
        tokio::time::sleep(Duration::from_millis(3 * 12_000 + 1)).await;
        assert_eq!(engine.lives(), 0);
        assert!(!engine.is_game_over());
        assert!(engine.timer_pending());

        tokio::time::sleep(Duration::from_millis(12_000)).await;
        assert!(engine.is_game_over());
        assert_eq!(engine.lives(), 0);
        assert!(!engine.timer_pending());

        let events = drain(&mut rx);
        assert!(events.contains(&GameEvent::GameOver));
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameLoopArmed { delay_ms: 0 })
        );

        engine.shutdown();
        engine.shutdown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_running_match() {
        let (engine, mut rx) = engine(&[DOT]);
        engine.start().unwrap();
        drain(&mut rx);

        engine.shutdown();
        assert_eq!(drain(&mut rx), vec![GameEvent::GameLoopArmed { delay_ms: 0 }]);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(engine.lives(), 3);
        assert!(drain(&mut rx).is_empty());

        // Placement still works, but never re-arms the timer.
        assert!(engine.place_at(0, 0).is_placed());
        assert!(!engine.timer_pending());
    }
}
