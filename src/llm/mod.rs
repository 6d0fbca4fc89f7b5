//! Generation backends and the contract the conversation engine consumes.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Sampling and length parameters applied to every generation call.
///
/// Constructed fresh per call; never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    /// Creativity versus determinism trade-off.
    pub temperature: f64,
    /// Nucleus (top-p) sampling breadth.
    pub top_p: f64,
    /// Top-k sampling breadth.
    pub top_k: u32,
    /// Hard cap on reply length in tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

/// Failure classes for a single generation call.
///
/// Callers treat every kind identically for fallback purposes; the kind and
/// detail exist for logging. The client never retries internally.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend rejected the API credentials.
    #[error("authentication rejected: {0}")]
    Auth(String),
    /// Quota exhausted or requests arriving too fast.
    #[error("quota or rate limit exceeded: {0}")]
    QuotaOrRateLimit(String),
    /// The request never completed: connect failure, timeout, or server error.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a body this client cannot interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Discriminant of a [`GenerationError`], for structured logging.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GenerationErrorKind {
    /// Authentication rejected.
    Auth,
    /// Quota exceeded or rate limited.
    QuotaOrRateLimit,
    /// Transport-level failure.
    Transport,
    /// Malformed response body.
    Malformed,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Auth => "auth",
            Self::QuotaOrRateLimit => "quota_or_rate_limit",
            Self::Transport => "transport",
            Self::Malformed => "malformed",
        };
        f.write_str(label)
    }
}

impl GenerationError {
    /// The failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::Auth(_) => GenerationErrorKind::Auth,
            Self::QuotaOrRateLimit(_) => GenerationErrorKind::QuotaOrRateLimit,
            Self::Transport(_) => GenerationErrorKind::Transport,
            Self::Malformed(_) => GenerationErrorKind::Malformed,
        }
    }

    /// The backend-supplied detail string.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Auth(detail)
            | Self::QuotaOrRateLimit(detail)
            | Self::Transport(detail)
            | Self::Malformed(detail) => detail,
        }
    }
}

/// Errors raised while constructing a generation backend.
///
/// These are fatal at startup; there is no per-call recovery from them.
#[derive(Debug, Error)]
pub enum BackendConfigError {
    /// A required credential is missing.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    /// The configured endpoint URL does not parse.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// A text-completion backend.
///
/// Implementations send one prompt with explicit parameters and return the
/// backend's text unmodified, or a classified error. No internal retries.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// # Errors
    /// Returns a [`GenerationError`] classified by cause; timeouts surface as
    /// [`GenerationError::Transport`].
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;

    /// Identifier of the underlying model, for health reporting.
    fn model(&self) -> &str;
}
