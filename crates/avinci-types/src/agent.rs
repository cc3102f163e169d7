//! Persona agent profile types for Avinci.
//!
//! An `AgentProfile` is the structured personality of a synthetic research
//! participant. It is owned by the persistence collaborator and read-only to
//! the dialogue engine.
//!
//! The four personality dimensions are closed vocabularies on paper, but stored
//! records may carry values outside them. Those values deserialize into an
//! `Unrecognized` variant instead of failing, so a stray value degrades to
//! "no clause" rather than breaking the conversation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a personality dimension enum backed by its display label.
///
/// Serializes to and from the plain label string. Labels outside the
/// recognized set round-trip verbatim through `Unrecognized`.
macro_rules! profile_dimension {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A stored value outside the recognized vocabulary, kept verbatim.
            Unrecognized(String),
        }

        impl $name {
            /// The label as stored and displayed.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unrecognized(raw) => raw.as_str(),
                }
            }

            pub fn is_recognized(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($label => $name::$variant,)+
                    _ => $name::Unrecognized(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unrecognized(raw) => raw,
                    other => other.as_str().to_string(),
                }
            }
        }
    };
}

profile_dimension! {
    /// Depth of domain knowledge the persona brings to the conversation.
    KnowledgeLevel {
        Novice => "Novice",
        Intermediate => "Intermediate",
        Advanced => "Advanced",
        Expert => "Expert",
    }
}

profile_dimension! {
    /// Vocabulary and register the persona speaks in.
    LanguageStyle {
        Formal => "Formal",
        Casual => "Casual",
        Technical => "Technical",
        Conversational => "Conversational",
    }
}

profile_dimension! {
    /// How strongly the persona reacts emotionally.
    EmotionalRange {
        Reserved => "Reserved",
        Moderate => "Moderate",
        Expressive => "Expressive",
        HighlyExpressive => "Highly Expressive",
    }
}

profile_dimension! {
    /// How much the persona hedges and hesitates.
    HesitationLevel {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

impl Default for EmotionalRange {
    fn default() -> Self {
        EmotionalRange::Moderate
    }
}

impl Default for HesitationLevel {
    fn default() -> Self {
        HesitationLevel::Medium
    }
}

/// A synthetic persona agent used to elicit simulated user-research feedback.
///
/// `emotional_range` and `hesitation_level` default to `Moderate` and `Medium`
/// when absent from the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    /// Free-text persona label (e.g. "first-time mobile banking user").
    pub persona: String,
    #[serde(default)]
    pub knowledge_level: Option<KnowledgeLevel>,
    #[serde(default)]
    pub language_style: Option<LanguageStyle>,
    #[serde(default)]
    pub emotional_range: EmotionalRange,
    #[serde(default)]
    pub hesitation_level: HesitationLevel,
    /// Ordered short trait descriptors.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Free-form persona background supplied with the record.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl AgentProfile {
    /// Create a profile with default dimensions and no traits.
    pub fn new(id: impl Into<String>, name: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            persona: persona.into(),
            knowledge_level: None,
            language_style: None,
            emotional_range: EmotionalRange::default(),
            hesitation_level: HesitationLevel::default(),
            traits: Vec::new(),
            prompt: None,
        }
    }

    /// Dimensions whose stored value is outside the recognized vocabulary,
    /// as `(dimension, raw value)` pairs.
    pub fn unrecognized_dimensions(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(level) = self.knowledge_level.as_ref().filter(|l| !l.is_recognized()) {
            out.push(("knowledgeLevel", level.as_str()));
        }
        if let Some(style) = self.language_style.as_ref().filter(|s| !s.is_recognized()) {
            out.push(("languageStyle", style.as_str()));
        }
        if !self.emotional_range.is_recognized() {
            out.push(("emotionalRange", self.emotional_range.as_str()));
        }
        if !self.hesitation_level.is_recognized() {
            out.push(("hesitationLevel", self.hesitation_level.as_str()));
        }
        out
    }
}
