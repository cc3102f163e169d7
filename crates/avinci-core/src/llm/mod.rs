//! LLM provider abstractions for Avinci.
//!
//! This module defines the core traits and utilities for model backends:
//! - `LlmProvider` / `VisionProvider`: RPITIT traits for concrete providers
//! - `BoxLlmProvider` / `BoxVisionProvider`: object-safe wrappers for injection
//! - `ResponseSynthesizer`: fixed-parameter generation call with latency capture

pub mod box_provider;
pub mod provider;
pub mod synthesizer;
