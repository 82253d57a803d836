//! Adapter module - multiplayer matches over a line-based text protocol
//!
//! Every player in a multiplayer match must see the same piece sequence. The
//! server owns that sequence and hands it out one index at a time; this crate
//! connects a [`GameEngine`](engine::GameEngine) to it.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: the client connects over TCP (default: 127.0.0.1:9700)
//! 2. **Piece supply**: the client sends `PIECE`, the server answers `PIECE <index>`;
//!    one request goes out for every piece the match tries to draw
//! 3. **Status**: score changes, lost lives and game over go out as `SCORE <n>`,
//!    `LIVES <n>` and `DIE`
//! 4. **Leaderboard**: `SCORES` requests the leaderboard, the server answers
//!    `SCORES name:score:lives|DEAD ...`. Entries may also follow on their own
//!    lines; the client folds them into the same leaderboard.
//!
//! Unknown or malformed lines are logged and dropped.
//!
//! # Environment Variables
//!
//! - `TETRECS_HOST`: Server address (default: "127.0.0.1")
//! - `TETRECS_PORT`: Port number (default: 9700)
//! - `TETRECS_EVENT_LOG`: Append every game event as JSON to this file
//! - `TETRECS_PLAYER`: Our leaderboard name
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: PIECE
//! Server -> Client: PIECE 3
//! Client -> Server: PIECE
//! Server -> Client: PIECE 11
//! Client -> Server: SCORE 50
//! Client -> Server: LIVES 2
//! Client -> Server: SCORES
//! Server -> Client: SCORES alice:50:2
//! Server -> Client: bob:0:DEAD
//! ```
//!
//! # Testing
//!
//! Any line server works for manual testing:
//!
//! ```bash
//! nc -l 9700
//! ```

pub mod client;
pub mod config;
pub mod event_log;
pub mod protocol;
pub mod sync;

pub use tetrecs_core as core;
pub use tetrecs_engine as engine;
pub use tetrecs_types as types;

pub use client::{connect, start_session, MultiplayerSession};
pub use config::ClientConfig;
pub use event_log::{EventLog, EventRecord};
pub use protocol::{InboundMessage, OutboundMessage, PlayerLives, ProtocolError, ScoreEntry};
pub use sync::{MultiplayerSync, PieceFeed};
