//! Image grounding: turning an attached screenshot into text the persona can react to.

pub mod grounding;

pub use grounding::{ANALYSIS_INSTRUCTION, CAPTION_MAX_TOKENS, MAX_IMAGE_BYTES, VisionGrounding};
