//! Timed match engine
//!
//! Wraps the pure [`tetrecs_core::GameState`] with the move timer that costs a
//! life whenever the player waits too long:
//!
//! - [`TimedLoop`]: single-slot cancellable delayed task on the tokio runtime
//! - [`GameEngine`]: shared, locked match session driving the state and the timer
//!
//! # Example
//!
//! ```no_run
//! use tetrecs_core::SoloStrategy;
//! use tetrecs_core::types::Difficulty;
//! use tetrecs_engine::GameEngine;
//!
//! # async fn run() -> Result<(), tetrecs_engine::EngineError> {
//! let (engine, mut events) =
//!     GameEngine::with_strategy(Difficulty::Easy, Box::new(SoloStrategy::new(7)))?;
//! engine.start()?;
//! engine.place_at(2, 2);
//!
//! while let Some(event) = events.recv().await {
//!     println!("{}", event.kind());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod session;
pub mod timer;

pub use error::EngineError;
pub use session::GameEngine;
pub use timer::{Tick, TimedLoop};
