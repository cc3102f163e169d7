//! Infrastructure layer for Avinci.
//!
//! Contains implementations of the port traits defined in `avinci-core`:
//! the OpenAI-compatible generation and captioning provider, in-memory and
//! SQLite session stores, the SQLite agent lookup, and the config loader.

pub mod config;
pub mod llm;
pub mod session;
pub mod sqlite;
