//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (avinci-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod agent;

pub use agent::AgentRepository;
