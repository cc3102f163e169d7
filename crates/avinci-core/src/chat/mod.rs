//! Per-turn chat orchestration and session storage abstractions for Avinci.
//!
//! - `ContextAssembler`: bounded message list for the generation call
//! - `SessionStore`: TTL-bounded conversation storage port
//! - `ChatEngine`: validate, look up, ground, generate, humanize, record

pub mod context;
pub mod engine;
pub mod session_store;

pub use context::ContextAssembler;
pub use engine::ChatEngine;
pub use session_store::SessionStore;
