//! Persona conditioning: profile-to-instruction compilation and output humanization.
//!
//! - `ProfileCompiler`: pure mapping from an `AgentProfile` to system instruction text
//! - `Humanizer`: stochastic, profile-conditioned perturbation of generated text

pub mod compiler;
pub mod humanizer;

pub use compiler::ProfileCompiler;
pub use humanizer::Humanizer;
