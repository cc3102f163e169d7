//! Persona dialogue engine and port trait definitions for Avinci.
//!
//! This crate turns a persona profile into model instructions, assembles the
//! bounded conversational context, calls the generation and captioning
//! backends through injected providers, and humanizes the output. It defines
//! the "ports" (provider, session store, and agent lookup traits) that the
//! infrastructure layer implements, and depends only on `avinci-types` --
//! never on `avinci-infra` or any network/database crate.

pub mod chat;
pub mod llm;
pub mod persona;
pub mod repository;
pub mod vision;
