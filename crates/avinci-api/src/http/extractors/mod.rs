//! Custom axum extractors.

pub mod caller;
