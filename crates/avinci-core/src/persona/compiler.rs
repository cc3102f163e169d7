//! System instruction compiler for persona agents.
//!
//! Each personality dimension maps to one clause through a lookup table.
//! Values outside a table contribute nothing, so a stray stored label
//! silently drops its clause instead of failing the turn.

use avinci_types::agent::{
    AgentProfile, EmotionalRange, HesitationLevel, KnowledgeLevel, LanguageStyle,
};

static KNOWLEDGE_CLAUSES: [(KnowledgeLevel, &str); 4] = [
    (
        KnowledgeLevel::Novice,
        "You have basic knowledge and often ask clarifying questions. You use simple terms and need explanations for technical concepts. ",
    ),
    (
        KnowledgeLevel::Intermediate,
        "You have moderate knowledge and can understand most concepts but may need some clarification on advanced topics. ",
    ),
    (
        KnowledgeLevel::Advanced,
        "You have strong knowledge and can discuss complex topics with confidence. ",
    ),
    (
        KnowledgeLevel::Expert,
        "You are highly knowledgeable and can provide detailed, technical insights. ",
    ),
];

static LANGUAGE_CLAUSES: [(LanguageStyle, &str); 4] = [
    (LanguageStyle::Formal, "Use formal, professional language. "),
    (LanguageStyle::Casual, "Use casual, friendly language with contractions. "),
    (LanguageStyle::Technical, "Use technical terminology and precise language. "),
    (LanguageStyle::Conversational, "Use conversational, approachable language. "),
];

static EMOTIONAL_CLAUSES: [(EmotionalRange, &str); 4] = [
    (EmotionalRange::Reserved, "Keep emotions minimal and responses measured. "),
    (EmotionalRange::Moderate, "Show moderate emotional expression. "),
    (
        EmotionalRange::Expressive,
        "Be expressive and show enthusiasm or concern as appropriate. ",
    ),
    (
        EmotionalRange::HighlyExpressive,
        "Be very expressive with strong emotional reactions. ",
    ),
];

static HESITATION_CLAUSES: [(HesitationLevel, &str); 3] = [
    (HesitationLevel::Low, "Respond confidently without hesitation. "),
    (
        HesitationLevel::Medium,
        "Occasionally show uncertainty with phrases like \"I think\" or \"maybe\". ",
    ),
    (
        HesitationLevel::High,
        "Frequently show hesitation with phrases like \"um\", \"I'm not sure\", \"let me think\". ",
    ),
];

const CLOSING: &str = "Respond as this persona would in a UX research discussion. \
Be authentic to their character and provide realistic feedback on user interfaces, \
experiences, and design decisions.";

fn lookup<K: PartialEq>(table: &'static [(K, &'static str)], key: &K) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| candidate == key)
        .map(|(_, clause)| *clause)
}

/// Compiles an [`AgentProfile`] into the system instruction for every turn.
///
/// Layout (each part present only when it applies):
/// ```text
/// You are {name}, a {persona} in a UX research context.
/// {knowledge clause}{language clause}{emotional clause}{hesitation clause}
/// Your key traits include: {traits joined by ", "}.
/// Persona background: {prompt}
/// {closing instruction}
/// ```
pub struct ProfileCompiler;

impl ProfileCompiler {
    /// Build the instruction text. Deterministic: no randomness, no I/O.
    pub fn compile(profile: &AgentProfile) -> String {
        let mut out = format!(
            "You are {}, a {} in a UX research context. ",
            profile.name, profile.persona
        );

        let clauses = [
            profile
                .knowledge_level
                .as_ref()
                .and_then(|level| lookup(&KNOWLEDGE_CLAUSES, level)),
            profile
                .language_style
                .as_ref()
                .and_then(|style| lookup(&LANGUAGE_CLAUSES, style)),
            lookup(&EMOTIONAL_CLAUSES, &profile.emotional_range),
            lookup(&HESITATION_CLAUSES, &profile.hesitation_level),
        ];
        for clause in clauses.into_iter().flatten() {
            out.push_str(clause);
        }

        if !profile.traits.is_empty() {
            out.push_str("Your key traits include: ");
            out.push_str(&profile.traits.join(", "));
            out.push_str(". ");
        }

        if let Some(background) = profile.prompt.as_deref().map(str::trim)
            && !background.is_empty()
        {
            out.push_str("Persona background: ");
            out.push_str(background);
            out.push(' ');
        }

        out.push_str(CLOSING);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> AgentProfile {
        let mut profile = AgentProfile::new("a1", "Dana", "senior product designer");
        profile.knowledge_level = Some(KnowledgeLevel::Expert);
        profile.language_style = Some(LanguageStyle::Formal);
        profile.emotional_range = EmotionalRange::Reserved;
        profile.hesitation_level = HesitationLevel::Low;
        profile
    }

    #[test]
    fn test_compile_is_pure() {
        let mut profile = scenario_a();
        profile.traits = vec!["detail-oriented".to_string(), "skeptical".to_string()];
        assert_eq!(
            ProfileCompiler::compile(&profile),
            ProfileCompiler::compile(&profile)
        );
    }

    #[test]
    fn test_scenario_a_clauses() {
        let text = ProfileCompiler::compile(&scenario_a());

        assert!(text.starts_with("You are Dana, a senior product designer in a UX research context. "));
        assert!(text.contains("highly knowledgeable"));
        assert!(text.contains("formal, professional language"));
        assert!(text.contains("Keep emotions minimal"));
        assert!(text.contains("Respond confidently without hesitation"));
        assert!(!text.contains("I'm not sure"));
        assert!(text.ends_with(CLOSING));
    }

    #[test]
    fn test_clause_order_follows_dimensions() {
        let text = ProfileCompiler::compile(&scenario_a());
        let knowledge = text.find("highly knowledgeable").unwrap();
        let language = text.find("formal, professional").unwrap();
        let emotion = text.find("Keep emotions minimal").unwrap();
        let hesitation = text.find("Respond confidently").unwrap();
        assert!(knowledge < language && language < emotion && emotion < hesitation);
    }

    #[test]
    fn test_defaults_apply_when_dimensions_absent() {
        let profile = AgentProfile::new("a2", "Sam", "first-time shopper");
        let text = ProfileCompiler::compile(&profile);

        assert!(text.contains("Show moderate emotional expression. "));
        assert!(text.contains("Occasionally show uncertainty"));
        assert!(!text.contains("knowledge"));
        assert!(!text.contains("Your key traits include"));
    }

    #[test]
    fn test_traits_joined_with_commas() {
        let mut profile = AgentProfile::new("a3", "Lee", "retiree");
        profile.traits = vec!["patient".to_string(), "cautious".to_string(), "curious".to_string()];
        let text = ProfileCompiler::compile(&profile);
        assert!(text.contains("Your key traits include: patient, cautious, curious. "));
    }

    #[test]
    fn test_unrecognized_value_contributes_no_clause() {
        let mut baseline = AgentProfile::new("a4", "Kim", "nurse");
        baseline.knowledge_level = None;
        let mut odd = baseline.clone();
        odd.knowledge_level = Some(KnowledgeLevel::from("Wizard"));

        let text = ProfileCompiler::compile(&odd);
        assert_eq!(text, ProfileCompiler::compile(&baseline));
        assert!(!text.contains("Wizard"));
    }

    #[test]
    fn test_background_prompt_precedes_closing() {
        let mut profile = AgentProfile::new("a5", "Ana", "student");
        profile.prompt = Some("  Works night shifts and checks the app on breaks.  ".to_string());
        let text = ProfileCompiler::compile(&profile);

        let background = text
            .find("Persona background: Works night shifts and checks the app on breaks. ")
            .unwrap();
        assert!(background < text.find(CLOSING).unwrap());
    }

    #[test]
    fn test_blank_background_prompt_is_ignored() {
        let mut profile = AgentProfile::new("a6", "Ana", "student");
        profile.prompt = Some("   ".to_string());
        assert!(!ProfileCompiler::compile(&profile).contains("Persona background"));
    }
}
