//! Business document context owned by a session.

/// Extracted business-document text paired with the business name.
///
/// Replaced wholesale via [`crate::conversation::session::ConversationSession::set_context`];
/// never partially mutated. Empty text is the valid "no context loaded" state.
#[derive(Clone, Debug, Default)]
pub struct DocumentContext {
    text: String,
    business_name: String,
}

impl DocumentContext {
    /// Build a context from extracted document text and a business name.
    #[must_use]
    pub fn new(text: impl Into<String>, business_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            business_name: business_name.into(),
        }
    }

    /// A context with no document loaded, keeping the business name for greetings.
    #[must_use]
    pub fn unloaded(business_name: impl Into<String>) -> Self {
        Self::new(String::new(), business_name)
    }

    /// Whether any document text has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.text.is_empty()
    }

    /// The extracted document text (may be empty).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the loaded text in characters.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The business name this context belongs to.
    #[must_use]
    pub fn business_name(&self) -> &str {
        &self.business_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_context() {
        let context = DocumentContext::unloaded("Acme");
        assert!(!context.is_loaded());
        assert_eq!(context.business_name(), "Acme");
        assert_eq!(context.text_len(), 0);
    }

    #[test]
    fn test_loaded_context() {
        let context = DocumentContext::new("We are open 9-5.", "Acme");
        assert!(context.is_loaded());
        assert_eq!(context.text(), "We are open 9-5.");
    }
}
