//! Context assembly for the generation call.
//!
//! Builds the ordered message list: system instruction, a trailing window of
//! prior turns, then the current user turn with any image analysis folded in.

use avinci_types::agent::AgentProfile;
use avinci_types::chat::DialogueTurn;
use avinci_types::llm::Message;

use crate::persona::ProfileCompiler;

/// Maximum number of prior turns forwarded to the generation backend.
pub const HISTORY_WINDOW: usize = 10;

const GROUNDING_SEPARATOR: &str = "\n\nImage Analysis: ";

pub struct ContextAssembler;

impl ContextAssembler {
    /// Assemble the messages for one turn.
    ///
    /// `prior` is oldest-first and is never modified; only its last
    /// [`HISTORY_WINDOW`] entries are used, in their original order.
    pub fn assemble<T: DialogueTurn>(
        profile: &AgentProfile,
        prior: &[T],
        current_text: &str,
        grounding: Option<&str>,
    ) -> Vec<Message> {
        let window = &prior[prior.len().saturating_sub(HISTORY_WINDOW)..];

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(Message::system(ProfileCompiler::compile(profile)));
        messages.extend(window.iter().map(|turn| {
            if turn.is_user() {
                Message::user(turn.text())
            } else {
                Message::assistant(turn.text())
            }
        }));
        messages.push(Message::user(Self::ground_text(current_text, grounding)));
        messages
    }

    /// The current turn's text with the image analysis appended, if any.
    pub fn ground_text(current_text: &str, grounding: Option<&str>) -> String {
        match grounding {
            Some(caption) => format!("{current_text}{GROUNDING_SEPARATOR}{caption}"),
            None => current_text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avinci_types::chat::{ConversationTurn, HistoryEntry, TurnMetadata};
    use avinci_types::llm::MessageRole;

    fn profile() -> AgentProfile {
        AgentProfile::new("agent-1", "Rae", "small business owner")
    }

    fn history(n: usize) -> Vec<HistoryEntry> {
        (0..n)
            .map(|i| HistoryEntry {
                text: format!("turn {i}"),
                is_user: i % 2 == 0,
                timestamp: None,
            })
            .collect()
    }

    #[test]
    fn test_system_instruction_first() {
        let messages = ContextAssembler::assemble::<HistoryEntry>(&profile(), &[], "Hi", None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, ProfileCompiler::compile(&profile()));
        assert_eq!(messages[1], Message::user("Hi"));
    }

    #[test]
    fn test_window_keeps_last_ten_in_order() {
        for n in [10usize, 11, 25, 100] {
            let prior = history(n);
            let messages = ContextAssembler::assemble(&profile(), &prior, "now", None);

            let forwarded: Vec<&str> = messages[1..messages.len() - 1]
                .iter()
                .map(|m| m.content.as_str())
                .collect();
            let expected: Vec<String> = (n - 10..n).map(|i| format!("turn {i}")).collect();
            assert_eq!(forwarded, expected, "history of {n}");
        }
    }

    #[test]
    fn test_short_history_forwarded_whole() {
        let prior = history(3);
        let messages = ContextAssembler::assemble(&profile(), &prior, "now", None);
        assert_eq!(messages.len(), 5);
        assert_eq!(prior.len(), 3);
    }

    #[test]
    fn test_roles_follow_is_user_flag() {
        let prior = vec![
            ConversationTurn::user("agent-1", "How is the menu?"),
            ConversationTurn::agent(
                "agent-1",
                "A bit crowded.",
                TurnMetadata {
                    processing_time: 10,
                    tokens: 4,
                    model: "gpt-4o".to_string(),
                },
            ),
        ];
        let messages = ContextAssembler::assemble(&profile(), &prior, "Why?", None);
        assert_eq!(messages[1], Message::user("How is the menu?"));
        assert_eq!(messages[2], Message::assistant("A bit crowded."));
        assert_eq!(messages[3], Message::user("Why?"));
    }

    #[test]
    fn test_grounding_concatenated_to_current_turn() {
        let messages = ContextAssembler::assemble::<HistoryEntry>(
            &profile(),
            &[],
            "Rate this screen.",
            Some("A dashboard with six charts."),
        );
        assert_eq!(
            messages.last().unwrap().content,
            "Rate this screen.\n\nImage Analysis: A dashboard with six charts."
        );
    }
}
