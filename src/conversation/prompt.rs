//! Prompt assembly for the conversation engine.
//!
//! Pure functions of their arguments; prompt length bounding belongs to the
//! generation backend, not here.

use crate::conversation::context::DocumentContext;
use crate::conversation::history::ConversationHistory;
use crate::conversation::language::LanguageProfile;

/// Maximum number of recent exchanges folded into a prompt.
pub const HISTORY_CONTEXT_LIMIT: usize = 5;

/// Fixed closing line asking for an answer grounded in the document section.
const CLOSING_INSTRUCTION: &str =
    "Please provide a helpful response based on the business information:";

/// Assemble the full system prompt for one customer question.
///
/// Layout: language instructions over the document, an optional recent
/// conversation block (up to [`HISTORY_CONTEXT_LIMIT`] exchanges, oldest
/// first), the current question, and the fixed closing instruction. An empty
/// document section is rendered as-is; that degraded mode is supported.
#[must_use]
pub fn build_system_prompt(
    context: &DocumentContext,
    history: &ConversationHistory,
    profile: &LanguageProfile,
    utterance: &str,
    include_history: bool,
) -> String {
    let mut out = profile.instruction(context.business_name(), context.text());
    out.push('\n');

    if include_history && !history.is_empty() {
        out.push_str("RECENT CONVERSATION HISTORY:\n");
        for exchange in history.recent(HISTORY_CONTEXT_LIMIT) {
            out.push_str("Q: ");
            out.push_str(&exchange.question);
            out.push_str("\nA: ");
            out.push_str(&exchange.answer);
            out.push_str("\n\n");
        }
    }

    out.push_str("CURRENT CUSTOMER QUESTION: ");
    out.push_str(utterance);
    out.push_str("\n\n");
    out.push_str(CLOSING_INSTRUCTION);
    out
}

/// One-shot business summary prompt over the document context alone.
#[must_use]
pub fn build_summary_prompt(context: &DocumentContext) -> String {
    format!(
        "Based on the following business information, provide a brief summary covering:\n\
         1. What the business does\n\
         2. Key services or products\n\
         3. Contact information if available\n\
         4. Any important policies or information\n\n\
         Business Information:\n{}\n\n\
         Please provide a concise summary:",
        context.text()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::language::{LanguageTag, lookup};

    fn acme_context() -> DocumentContext {
        DocumentContext::new("We are open 9-5 Mon-Fri.", "Acme")
    }

    #[test]
    fn test_prompt_contains_document_and_question() {
        let history = ConversationHistory::default();
        let prompt = build_system_prompt(
            &acme_context(),
            &history,
            lookup(LanguageTag::En),
            "What are your hours?",
            true,
        );

        assert!(prompt.contains("We are open 9-5 Mon-Fri."));
        assert!(prompt.contains("What are your hours?"));
        assert!(prompt.contains("CURRENT CUSTOMER QUESTION:"));
    }

    #[test]
    fn test_prompt_skips_history_block_when_empty() {
        let history = ConversationHistory::default();
        let prompt = build_system_prompt(
            &acme_context(),
            &history,
            lookup(LanguageTag::En),
            "hello",
            true,
        );
        assert!(!prompt.contains("RECENT CONVERSATION HISTORY:"));
    }

    #[test]
    fn test_prompt_skips_history_block_when_disabled() {
        let mut history = ConversationHistory::default();
        history.append("earlier question", "earlier answer");
        let prompt = build_system_prompt(
            &acme_context(),
            &history,
            lookup(LanguageTag::En),
            "hello",
            false,
        );
        assert!(!prompt.contains("RECENT CONVERSATION HISTORY:"));
        assert!(!prompt.contains("earlier question"));
    }

    #[test]
    fn test_prompt_includes_recent_exchanges_oldest_first() {
        let mut history = ConversationHistory::default();
        history.append("q-old", "a-old");
        history.append("q-new", "a-new");
        let prompt = build_system_prompt(
            &acme_context(),
            &history,
            lookup(LanguageTag::En),
            "hello",
            true,
        );

        let old_pos = prompt.find("Q: q-old");
        let new_pos = prompt.find("Q: q-new");
        assert!(old_pos.is_some());
        assert!(new_pos.is_some());
        assert!(old_pos < new_pos);
    }

    #[test]
    fn test_prompt_limits_history_to_five_exchanges() {
        let mut history = ConversationHistory::default();
        for i in 0..8 {
            history.append(&format!("q{i}"), &format!("a{i}"));
        }
        let prompt = build_system_prompt(
            &acme_context(),
            &history,
            lookup(LanguageTag::En),
            "hello",
            true,
        );

        assert!(!prompt.contains("Q: q2"));
        assert!(prompt.contains("Q: q3"));
        assert!(prompt.contains("Q: q7"));
    }

    #[test]
    fn test_prompt_renders_with_empty_document() {
        let history = ConversationHistory::default();
        let context = DocumentContext::unloaded("Acme");
        let prompt =
            build_system_prompt(&context, &history, lookup(LanguageTag::En), "hi", true);
        assert!(prompt.contains("BUSINESS INFORMATION:"));
        assert!(prompt.contains("CURRENT CUSTOMER QUESTION: hi"));
    }

    #[test]
    fn test_summary_prompt_covers_fixed_sections() {
        let prompt = build_summary_prompt(&acme_context());
        assert!(prompt.contains("What the business does"));
        assert!(prompt.contains("Key services or products"));
        assert!(prompt.contains("Contact information if available"));
        assert!(prompt.contains("We are open 9-5 Mon-Fri."));
    }
}
