//! Startup helpers for the Frontdesk agent server.
//!
//! The environment is read exactly once here and folded into explicit
//! configuration values; nothing below this module touches ambient state.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use crate::conversation::config::ConversationConfig;
use crate::conversation::context::DocumentContext;
use crate::conversation::language::LanguageTag;
use crate::document::{self, DocumentSource, TextDocumentSource};
use crate::llm::{GeminiClient, GeminiConfig, GenerationParams};
use crate::server::{self, AppState};
use crate::voice::VapiClient;
use crate::whatsapp::{self, WhatsAppConfig, WhatsAppGateway};

/// Default path of the business document text export.
const DEFAULT_DOCUMENT_PATH: &str = "business_info.txt";

/// Default business name when none is configured.
const DEFAULT_BUSINESS_NAME: &str = "TechSolutions Pro";

/// Everything the agent reads from the environment, captured once.
#[derive(Clone, Debug)]
pub struct AgentSettings {
    /// Gemini API key; empty means generation cannot be configured.
    pub gemini_api_key: String,
    /// Optional completion model override.
    pub model: Option<String>,
    /// Path of the business document text export.
    pub document_path: String,
    /// Business name used in templates and greetings.
    pub business_name: String,
    /// Assistant language.
    pub language: LanguageTag,
    /// HTTP port to serve on.
    pub port: u16,
    /// Twilio account SID, when the WhatsApp channel is configured.
    pub twilio_account_sid: Option<String>,
    /// Twilio auth token, when the WhatsApp channel is configured.
    pub twilio_auth_token: Option<String>,
    /// Sending WhatsApp number override.
    pub twilio_from_number: Option<String>,
    /// Voice platform API key, when the voice channel is configured.
    pub vapi_api_key: Option<String>,
}

impl AgentSettings {
    /// Capture settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("FRONTDESK_MODEL").ok(),
            document_path: std::env::var("FRONTDESK_DOCUMENT")
                .unwrap_or_else(|_| DEFAULT_DOCUMENT_PATH.to_string()),
            business_name: std::env::var("FRONTDESK_BUSINESS_NAME")
                .unwrap_or_else(|_| DEFAULT_BUSINESS_NAME.to_string()),
            language: LanguageTag::parse(
                &std::env::var("FRONTDESK_LANGUAGE").unwrap_or_default(),
            ),
            port: std::env::var("FRONTDESK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(server::DEFAULT_PORT),
            twilio_account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok(),
            twilio_auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok(),
            twilio_from_number: std::env::var("TWILIO_WHATSAPP_NUMBER").ok(),
            vapi_api_key: std::env::var("VAPI_API_KEY").ok(),
        }
    }
}

/// Run the server (used by the `frontdesk` and `frontdesk-server` binaries).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Frontdesk Agent v{}", env!("CARGO_PKG_VERSION"));

    let settings = AgentSettings::from_env();

    let state = match build_state(&settings) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server(state, settings.port)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Build application state from captured settings.
///
/// The generation backend is mandatory; a missing Gemini key is fatal. The
/// channel integrations degrade to "unavailable" when their credentials are
/// absent, and a missing business document leaves sessions in the supported
/// no-context state instead of failing startup.
///
/// # Errors
/// Returns an error if the backend or conversation configuration is invalid.
pub fn build_state(
    settings: &AgentSettings,
) -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    let mut gemini_config = GeminiConfig::new(settings.gemini_api_key.clone());
    if let Some(model) = &settings.model {
        gemini_config = gemini_config.with_model(model.clone());
    }
    let backend = Arc::new(GeminiClient::new(gemini_config)?);

    let context = load_document_context(settings);

    let conversation = ConversationConfig {
        language: settings.language,
        ..ConversationConfig::default()
    };

    let state = AppState::new(
        conversation,
        GenerationParams::default(),
        backend,
        context,
        build_whatsapp_gateway(settings),
        build_vapi_client(settings),
    )?;

    Ok(state)
}

fn load_document_context(settings: &AgentSettings) -> DocumentContext {
    let source = match TextDocumentSource::new(&settings.document_path) {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!("Document source unavailable: {err}");
            return DocumentContext::unloaded(settings.business_name.clone());
        }
    };

    match source.extract() {
        Ok(text) => {
            let stats = document::stats(&text);
            tracing::info!(
                chars = stats.chars,
                words = stats.words,
                "business document loaded from {}",
                settings.document_path
            );
            DocumentContext::new(text, settings.business_name.clone())
        }
        Err(err) => {
            tracing::warn!("Continuing without business context: {err}");
            DocumentContext::unloaded(settings.business_name.clone())
        }
    }
}

fn build_whatsapp_gateway(settings: &AgentSettings) -> Option<WhatsAppGateway> {
    let (Some(account_sid), Some(auth_token)) = (
        settings.twilio_account_sid.clone(),
        settings.twilio_auth_token.clone(),
    ) else {
        tracing::warn!("Twilio credentials not set; WhatsApp channel disabled");
        return None;
    };

    let config = WhatsAppConfig {
        account_sid,
        auth_token,
        from_number: settings
            .twilio_from_number
            .clone()
            .unwrap_or_else(|| whatsapp::DEFAULT_FROM_NUMBER.to_string()),
    };

    match WhatsAppGateway::new(config) {
        Ok(gateway) => Some(gateway),
        Err(err) => {
            tracing::warn!("WhatsApp gateway failed to initialize: {err}");
            None
        }
    }
}

fn build_vapi_client(settings: &AgentSettings) -> Option<VapiClient> {
    let api_key = settings.vapi_api_key.clone()?;
    match VapiClient::new(api_key) {
        Ok(client) => Some(client),
        Err(err) => {
            tracing::warn!("Voice integration failed to initialize: {err}");
            None
        }
    }
}

/// Run server with graceful shutdown.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    server::run_server_with_shutdown(state, port, shutdown_signal).await
}
