//! Application state shared across all request handlers.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::conversation::config::ConversationConfig;
use crate::conversation::context::DocumentContext;
use crate::conversation::errors::ConversationResult;
use crate::conversation::session::ConversationSession;
use crate::llm::{GenerationBackend, GenerationParams};
use crate::voice::VapiClient;
use crate::whatsapp::WhatsAppGateway;

/// Registry key for the shared session behind `/ask`.
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Shared application state.
///
/// Each caller gets a distinct session behind its own mutex; the generation
/// backend is shared and called unserialized across sessions.
pub struct AppState {
    sessions: DashMap<String, Arc<Mutex<ConversationSession>>>,
    backend: Arc<dyn GenerationBackend>,
    params: GenerationParams,
    config: ConversationConfig,
    context: DocumentContext,
    /// WhatsApp gateway, absent when credentials are not configured.
    pub whatsapp: Option<WhatsAppGateway>,
    /// Voice provisioning client, absent when no API key is configured.
    pub vapi: Option<VapiClient>,
}

impl AppState {
    /// Create the application state.
    ///
    /// # Errors
    /// Returns an error if the conversation configuration is invalid.
    pub fn new(
        config: ConversationConfig,
        params: GenerationParams,
        backend: Arc<dyn GenerationBackend>,
        context: DocumentContext,
        whatsapp: Option<WhatsAppGateway>,
        vapi: Option<VapiClient>,
    ) -> ConversationResult<Arc<Self>> {
        config.validate()?;

        Ok(Arc::new(Self {
            sessions: DashMap::new(),
            backend,
            params,
            config,
            context,
            whatsapp,
            vapi,
        }))
    }

    /// Fetch or create the session for one caller.
    #[must_use]
    pub fn session_for(&self, caller: &str) -> Arc<Mutex<ConversationSession>> {
        self.sessions
            .entry(caller.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(self.new_session())))
            .clone()
    }

    /// The shared session used by the plain HTTP channel.
    #[must_use]
    pub fn default_session(&self) -> Arc<Mutex<ConversationSession>> {
        self.session_for(DEFAULT_SESSION_KEY)
    }

    /// Clear every registered session's history; returns how many were cleared.
    pub async fn clear_all(&self) -> usize {
        let mut cleared = 0;
        for entry in &self.sessions {
            entry.value().lock().await.clear();
            cleared += 1;
        }
        cleared
    }

    fn new_session(&self) -> ConversationSession {
        let mut session = ConversationSession::new(
            self.config.clone(),
            self.params.clone(),
            Arc::clone(&self.backend),
        );
        if self.context.is_loaded() || !self.context.business_name().is_empty() {
            session.set_context(self.context.text(), self.context.business_name());
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use async_trait::async_trait;

    struct StubBackend;

    #[async_trait]
    impl GenerationBackend for StubBackend {
        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, GenerationError> {
            Ok("stub reply".to_string())
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn state() -> Arc<AppState> {
        AppState::new(
            ConversationConfig::default(),
            GenerationParams::default(),
            Arc::new(StubBackend),
            DocumentContext::new("Acme sells widgets.", "Acme"),
            None,
            None,
        )
        .ok()
        .unwrap()
    }

    #[tokio::test]
    async fn test_sessions_are_per_caller() {
        let state = state();
        let a = state.session_for("whatsapp:+1555000001");
        let b = state.session_for("whatsapp:+1555000002");

        let _ = a.lock().await.respond("q").await;
        assert_eq!(a.lock().await.history().len(), 1);
        assert_eq!(b.lock().await.history().len(), 0);
    }

    #[tokio::test]
    async fn test_session_for_is_stable_per_caller() {
        let state = state();
        let first = state.session_for("caller");
        let second = state.session_for("caller");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_clear_all_empties_every_session() {
        let state = state();
        let a = state.session_for("a");
        let b = state.session_for("b");
        let _ = a.lock().await.respond("q").await;
        let _ = b.lock().await.respond("q").await;

        let cleared = state.clear_all().await;
        assert_eq!(cleared, 2);
        assert!(a.lock().await.history().is_empty());
        assert!(b.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_new_sessions_inherit_document_context() {
        let state = state();
        let session = state.default_session();
        let snapshot = session.lock().await.health_snapshot();
        assert!(snapshot.context_loaded);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let result = AppState::new(
            ConversationConfig {
                max_history: 0,
                ..ConversationConfig::default()
            },
            GenerationParams::default(),
            Arc::new(StubBackend),
            DocumentContext::default(),
            None,
            None,
        );
        assert!(result.is_err());
    }
}
