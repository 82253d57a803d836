//! TetrECS (workspace facade crate).
//!
//! Re-exports the member crates under one name:
//! `tetrecs::{types, core, engine, adapter}`. The implementation lives in the
//! dedicated crates under `crates/`.

pub use tetrecs_adapter as adapter;
pub use tetrecs_core as core;
pub use tetrecs_engine as engine;
pub use tetrecs_types as types;
