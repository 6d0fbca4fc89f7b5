//! Conversation session façade tying history, templates, and generation together.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::conversation::config::ConversationConfig;
use crate::conversation::context::DocumentContext;
use crate::conversation::history::ConversationHistory;
use crate::conversation::language::{self, LanguageProfile};
use crate::conversation::prompt;
use crate::llm::{GenerationBackend, GenerationParams};

/// Reply used when the session was asked to respond before any context was set.
pub const NO_CONTEXT_FALLBACK: &str = "I'm sorry, but I don't have access to business \
    information yet. Please contact the business directly for assistance.";

/// Reply used when the generation backend fails for any reason.
pub const GENERATION_FALLBACK: &str = "I apologize, but I'm having trouble processing \
    your request right now. Please try again later or contact us directly.";

/// Summary reply when no document context is loaded.
pub const NO_CONTEXT_SUMMARY: &str = "No business information available.";

/// Greeting used when no business name is known yet.
const GENERIC_GREETING: &str = "Hello! How can I help you today?";

/// Health view of a single session.
#[derive(Clone, Debug, Serialize)]
pub struct HealthSnapshot {
    /// Whether document context has been loaded.
    pub context_loaded: bool,
    /// Length of the loaded document text in characters.
    pub context_length: usize,
    /// Number of retained exchanges.
    pub history_length: usize,
    /// Model identifier of the generation backend.
    pub model: String,
}

/// One caller's conversation: owns the history and document context, borrows
/// the generation backend.
///
/// Every public operation returns some user-safe text; backend failures are
/// absorbed into fixed fallback replies and logged, never propagated.
pub struct ConversationSession {
    backend: Arc<dyn GenerationBackend>,
    params: GenerationParams,
    config: ConversationConfig,
    profile: &'static LanguageProfile,
    context: DocumentContext,
    history: ConversationHistory,
}

impl ConversationSession {
    /// Create a session with no document context loaded.
    #[must_use]
    pub fn new(
        config: ConversationConfig,
        params: GenerationParams,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let profile = language::lookup(config.language);
        let history = ConversationHistory::new(config.max_history);
        Self {
            backend,
            params,
            config,
            profile,
            context: DocumentContext::default(),
            history,
        }
    }

    /// Load or wholesale-replace the business document context. Idempotent.
    pub fn set_context(&mut self, document_text: &str, business_name: &str) {
        self.context = DocumentContext::new(document_text, business_name);
        info!(
            chars = self.context.text_len(),
            business = business_name,
            "business context loaded"
        );
    }

    /// Answer one customer question.
    ///
    /// Without context this short-circuits to a fixed fallback and never calls
    /// the backend. On generation failure the history is left untouched; the
    /// failed turn is not recorded.
    pub async fn respond(&mut self, utterance: &str) -> String {
        if !self.context.is_loaded() {
            return NO_CONTEXT_FALLBACK.to_string();
        }

        let system_prompt = prompt::build_system_prompt(
            &self.context,
            &self.history,
            self.profile,
            utterance,
            self.config.include_history,
        );

        let generated = self.backend.generate(&system_prompt, &self.params).await;
        match generated {
            Ok(reply) => {
                self.history.append(utterance, &reply);
                reply
            }
            Err(err) => {
                warn!(kind = %err.kind(), detail = %err, "generation failed, returning fallback");
                GENERATION_FALLBACK.to_string()
            }
        }
    }

    /// One-shot business summary from the document context; history is ignored.
    pub async fn summarize(&self) -> String {
        if !self.context.is_loaded() {
            return NO_CONTEXT_SUMMARY.to_string();
        }

        let summary_prompt = prompt::build_summary_prompt(&self.context);
        match self.backend.generate(&summary_prompt, &self.params).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(kind = %err.kind(), detail = %err, "summary generation failed");
                format!("Unable to generate summary: {err}")
            }
        }
    }

    /// Forget the conversation history; context and language are untouched.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Welcome line for an empty inbound message.
    #[must_use]
    pub fn greeting(&self) -> String {
        if self.context.business_name().is_empty() {
            GENERIC_GREETING.to_string()
        } else {
            self.profile.greeting(self.context.business_name())
        }
    }

    /// Current health view of this session.
    #[must_use]
    pub fn health_snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            context_loaded: self.context.is_loaded(),
            context_length: self.context.text_len(),
            history_length: self.history.len(),
            model: self.backend.model().to_string(),
        }
    }

    /// Read access to the history, mainly for transports and tests.
    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }
}
