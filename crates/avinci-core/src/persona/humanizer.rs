//! Stochastic post-processing that makes generated replies read less polished.
//!
//! Three transforms run in a fixed order on the evolving string, each drawing
//! from the caller's randomness source:
//! 1. filler word insertion (High hesitation only)
//! 2. emotional punctuation (Expressive and Highly Expressive only)
//! 3. a self-correction sentence (any profile)
//!
//! Pass a seeded or mock RNG to get exact, repeatable output.

use avinci_types::agent::{AgentProfile, EmotionalRange, HesitationLevel};
use rand::Rng;

pub const FILLERS: [&str; 5] = ["um", "uh", "well", "you know", "I mean"];

pub const EMOTIONAL_PUNCTUATION: [&str; 3] = ["!", "...", "?"];

pub const SELF_CORRECTIONS: [&str; 3] = [
    "Actually, let me correct that.",
    "Wait, I think I meant...",
    "Sorry, let me rephrase that.",
];

pub const PUNCTUATION_PROBABILITY: f64 = 0.3;

pub const CORRECTION_PROBABILITY: f64 = 0.1;

pub struct Humanizer;

impl Humanizer {
    pub fn humanize<R: Rng + ?Sized>(raw: &str, profile: &AgentProfile, rng: &mut R) -> String {
        let mut text = raw.to_string();

        if profile.hesitation_level == HesitationLevel::High {
            text = insert_filler(&text, rng);
        }

        if matches!(
            profile.emotional_range,
            EmotionalRange::Expressive | EmotionalRange::HighlyExpressive
        ) && rng.gen_bool(PUNCTUATION_PROBABILITY)
        {
            text.push_str(EMOTIONAL_PUNCTUATION[rng.gen_range(0..EMOTIONAL_PUNCTUATION.len())]);
        }

        if rng.gen_bool(CORRECTION_PROBABILITY) {
            text.push(' ');
            text.push_str(SELF_CORRECTIONS[rng.gen_range(0..SELF_CORRECTIONS.len())]);
        }

        text
    }
}

/// Insert one filler at a random word position, normalizing whitespace to single spaces.
fn insert_filler<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let filler = FILLERS[rng.gen_range(0..FILLERS.len())];
    let mut words: Vec<&str> = text.split_whitespace().collect();
    let position = rng.gen_range(0..words.len().max(1));
    words.insert(position, filler);
    words.join(" ")
}
