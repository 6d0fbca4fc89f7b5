//! Configuration for conversation sessions.

use serde::{Deserialize, Serialize};

use crate::conversation::errors::{ConversationError, ConversationResult};
use crate::conversation::history::DEFAULT_MAX_HISTORY;
use crate::conversation::language::LanguageTag;

/// Per-session conversation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum exchanges retained in the history ring.
    pub max_history: usize,
    /// Assistant language; drives template and greeting selection.
    pub language: LanguageTag,
    /// Whether assembled prompts carry recent conversation history.
    pub include_history: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            language: LanguageTag::En,
            include_history: true,
        }
    }
}

impl ConversationConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range.
    pub fn validate(&self) -> ConversationResult<()> {
        if self.max_history == 0 {
            return Err(ConversationError::InvalidConfig(
                "max_history must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
