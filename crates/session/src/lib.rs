//! Context assembly and the per-turn chat orchestrator for Chinwag.
//!
//! `ContextAssembler` is a pure function from (history, preamble, pending
//! message) to the exact ordered list sent to the model. `ChatSession`
//! owns the running exchange and drives each turn through
//! ingest → compose → assemble → invoke → commit.

pub mod assembler;
pub mod session;

pub use assembler::{ContextAssembler, WindowPolicy};
pub use session::{ChatSession, SessionId};
