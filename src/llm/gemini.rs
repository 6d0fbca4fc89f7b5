//! Gemini generation backend over the REST `generateContent` endpoint.
//!
//! Failures are classified into the four [`GenerationError`] kinds; the
//! client performs no retries and applies the configured timeout, so a hung
//! backend surfaces as a transport error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::{BackendConfigError, GenerationBackend, GenerationError, GenerationParams};

/// Default completion model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connect timeout for the HTTP client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default end-to-end request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest error-body excerpt carried into an error detail.
const DETAIL_SNIPPET_LEN: usize = 200;

/// Configuration for the Gemini client, built once at startup.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key; required.
    pub api_key: String,
    /// Completion model name.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// End-to-end request timeout.
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Configuration with defaults for everything but the API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Override the completion model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Async Gemini client implementing [`GenerationBackend`].
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns an error if the API key is empty, the base URL does not parse,
    /// or the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, BackendConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(BackendConfigError::MissingCredential("GEMINI_API_KEY"));
        }
        Url::parse(&config.base_url)?;

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let request = build_request(prompt, params);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Malformed(format!("invalid JSON body: {err}")))?;
        extract_text(decoded)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Build the `generateContent` request body.
fn build_request<'a>(prompt: &'a str, params: &GenerationParams) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            max_output_tokens: params.max_output_tokens,
        },
    }
}

/// Classify a non-success HTTP status into a generation error.
fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let detail = format!("status {}: {}", status.as_u16(), snippet(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::QuotaOrRateLimit(detail),
        _ => GenerationError::Transport(detail),
    }
}

/// Classify a reqwest failure that prevented a response from arriving.
fn classify_request_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Transport(format!("request timed out: {err}"))
    } else {
        GenerationError::Transport(err.to_string())
    }
}

/// Pull the first candidate's text out of a decoded response.
fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
    response
        .candidates
        .into_iter()
        .flatten()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .into_iter()
        .flatten()
        .find_map(|part| part.text)
        .ok_or_else(|| GenerationError::Malformed("response carries no text part".to_string()))
}

fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(DETAIL_SNIPPET_LEN)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

// Wire structures for the generateContent endpoint.

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationErrorKind;

    #[test]
    fn test_build_request_wire_shape() {
        let params = GenerationParams::default();
        let request = build_request("What are your hours?", &params);
        let value = serde_json::to_value(&request).unwrap_or_default();

        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            "What are your hours?"
        );
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1024);
        assert!(value["generationConfig"]["topP"].is_number());
    }

    #[test]
    fn test_classify_status_auth() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = classify_status(status, "denied");
            assert_eq!(err.kind(), GenerationErrorKind::Auth);
        }
    }

    #[test]
    fn test_classify_status_quota() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "quota exceeded");
        assert_eq!(err.kind(), GenerationErrorKind::QuotaOrRateLimit);
        assert!(err.detail().contains("quota exceeded"));
    }

    #[test]
    fn test_classify_status_other_is_transport() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::BAD_REQUEST,
        ] {
            let err = classify_status(status, "boom");
            assert_eq!(err.kind(), GenerationErrorKind::Transport);
        }
    }

    #[test]
    fn test_extract_text_happy_path() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"We sell widgets"}]}}]}"#,
        )
        .unwrap_or(GenerateResponse { candidates: None });

        let text = extract_text(response);
        assert_eq!(text.ok().as_deref(), Some("We sell widgets"));
    }

    #[test]
    fn test_extract_text_missing_candidates_is_malformed() {
        let response = GenerateResponse { candidates: None };
        let err = extract_text(response);
        assert!(matches!(err, Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn test_extract_text_empty_parts_is_malformed() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#)
                .unwrap_or(GenerateResponse { candidates: None });
        assert!(extract_text(response).is_err());
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let body = "x".repeat(1000);
        assert_eq!(snippet(&body).len(), DETAIL_SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = GeminiConfig::new("");
        assert!(matches!(
            GeminiClient::new(config),
            Err(BackendConfigError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let config = GeminiConfig::new("key").with_base_url("not a url");
        assert!(matches!(
            GeminiClient::new(config),
            Err(BackendConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_shape() {
        let config = GeminiConfig::new("key").with_base_url("https://example.test/");
        let client = GeminiClient::new(config).ok();
        let endpoint = client.map(|c| c.endpoint()).unwrap_or_default();
        assert_eq!(
            endpoint,
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
