//! Timed engine tests - move timer, penalties, cancellation and shutdown
//!
//! Every test runs on a paused clock, so multi-second delays finish instantly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tetrecs::core::{GameEvent, GameState, Grid, SequenceStrategy};
use tetrecs::engine::{EngineError, GameEngine, TimedLoop};
use tetrecs::types::Difficulty;

const DOT: u8 = 3;

fn drain(rx: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn armed_delays(events: &[GameEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::GameLoopArmed { delay_ms } => Some(*delay_ms),
            _ => None,
        })
        .collect()
}

#[test]
fn engine_requires_a_runtime() {
    let result = GameEngine::with_strategy(Difficulty::Normal, Box::new(SequenceStrategy::new(&[DOT])));
    assert_eq!(result.err(), Some(EngineError::NoRuntime));
}

#[tokio::test(start_paused = true)]
async fn timeout_costs_a_life_per_delay() {
    let (engine, mut rx) =
        GameEngine::with_strategy(Difficulty::Challenge, Box::new(SequenceStrategy::new(&[DOT])))
            .unwrap();
    engine.start().unwrap();
    assert_eq!(armed_delays(&drain(&mut rx)), vec![10000]);

    tokio::time::sleep(Duration::from_millis(9_999)).await;
    assert_eq!(engine.lives(), 3);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(engine.lives(), 2);

    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(engine.lives(), 1);
}

#[tokio::test(start_paused = true)]
async fn game_over_on_timeout_after_last_life() {
    let (engine, mut rx) =
        GameEngine::with_strategy(Difficulty::Normal, Box::new(SequenceStrategy::new(&[DOT])))
            .unwrap();
    engine.start().unwrap();

    tokio::time::sleep(Duration::from_millis(24_001)).await;
    assert_eq!(engine.lives(), 1);
    drain(&mut rx);

    // Losing the last life keeps the match running with a fresh timer.
    tokio::time::sleep(Duration::from_millis(12_000)).await;
    assert_eq!(engine.lives(), 0);
    assert!(!engine.is_game_over());
    let events = drain(&mut rx);
    assert!(events.contains(&GameEvent::LifeLost { remaining: 0 }));
    assert!(!events.contains(&GameEvent::GameOver));
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameLoopArmed { delay_ms: 12000 })
    );

    // The timeout that finds no lives ends it.
    tokio::time::sleep(Duration::from_millis(12_000)).await;
    assert!(engine.is_game_over());
    assert!(!engine.timer_pending());
    assert_eq!(
        drain(&mut rx),
        vec![GameEvent::GameOver, GameEvent::GameLoopArmed { delay_ms: 0 }]
    );

    // Shutdown stays idempotent and nothing fires later.
    engine.shutdown();
    engine.shutdown();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn placement_rearms_with_level_delay() {
    // Every dot on a 1x1 grid clears; ten clears reach level 1.
    let state = GameState::with_grid(
        Grid::new(1, 1),
        Difficulty::Normal,
        Box::new(SequenceStrategy::new(&[DOT])),
    );
    let (engine, mut rx) = GameEngine::new(state).unwrap();
    engine.start().unwrap();

    for _ in 0..10 {
        assert!(engine.place_at(0, 0).is_placed());
    }
    assert_eq!(engine.level(), 1);

    let delays = armed_delays(&drain(&mut rx));
    assert_eq!(delays.first(), Some(&12000));
    assert_eq!(delays.last(), Some(&11500));

    tokio::time::sleep(Duration::from_millis(11_499)).await;
    assert_eq!(engine.lives(), 3);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(engine.lives(), 2);
}

#[tokio::test(start_paused = true)]
async fn placement_just_before_deadline_wins() {
    let (engine, _rx) =
        GameEngine::with_strategy(Difficulty::Normal, Box::new(SequenceStrategy::new(&[DOT])))
            .unwrap();
    engine.start().unwrap();

    for x in 0..5 {
        tokio::time::sleep(Duration::from_millis(11_999)).await;
        assert!(engine.place_at(x, 4).is_placed());
    }
    assert_eq!(engine.lives(), 3);
}

#[tokio::test(start_paused = true)]
async fn rotate_and_swap_do_not_reset_timer() {
    let (engine, _rx) =
        GameEngine::with_strategy(Difficulty::Normal, Box::new(SequenceStrategy::new(&[5, 6])))
            .unwrap();
    engine.start().unwrap();

    tokio::time::sleep(Duration::from_millis(11_000)).await;
    assert!(engine.rotate_current());
    assert!(engine.swap_pieces());

    tokio::time::sleep(Duration::from_millis(1_001)).await;
    assert_eq!(engine.lives(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropped_engine_stops_ticking() {
    let (engine, mut rx) =
        GameEngine::with_strategy(Difficulty::Normal, Box::new(SequenceStrategy::new(&[DOT])))
            .unwrap();
    engine.start().unwrap();
    drain(&mut rx);
    drop(engine);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn timed_loop_replacement_never_double_fires() {
    let timer = Arc::new(TimedLoop::new().unwrap());
    let fired = Arc::new(AtomicU32::new(0));

    for _ in 0..10 {
        let t = Arc::clone(&timer);
        let f = Arc::clone(&fired);
        timer.cancel_and_reschedule(Duration::from_millis(100), move |tick| {
            if t.claim(tick) {
                f.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!timer.is_pending());

    assert!(timer.shutdown());
    assert!(!timer.shutdown());
}
