//! Shared domain types for Avinci.
//!
//! This crate contains the core domain types used across the Avinci platform:
//! persona agent profiles, conversation turns, LLM request shapes, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
