//! REST client for the voice platform's assistant API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::voice::assistant::{AssistantDefinition, AssistantUpdate};

/// Voice platform API base URL.
const VAPI_BASE_URL: &str = "https://api.vapi.ai";

/// Connect timeout for the client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// End-to-end request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the voice provisioning client.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The API key is missing at construction.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    /// The platform rejected the request.
    #[error("vapi returned status {status}: {detail}")]
    Rejected {
        /// HTTP status the platform answered with.
        status: u16,
        /// Error-body excerpt.
        detail: String,
    },
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// An assistant as the platform reports it.
#[derive(Clone, Debug, Deserialize)]
pub struct AssistantRecord {
    /// Platform-assigned assistant id.
    pub id: String,
    /// Display name, when set.
    #[serde(default)]
    pub name: Option<String>,
}

/// Health view of the voice integration.
#[derive(Clone, Debug, Serialize)]
pub struct VoiceHealth {
    /// `healthy` or `unhealthy`.
    pub status: &'static str,
    /// Whether an API key is configured.
    pub api_key_set: bool,
    /// Status code of the probe, when one completed.
    pub response_code: Option<u16>,
}

/// Bearer-auth client for assistant CRUD.
pub struct VapiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VapiClient {
    /// Build a client from an API key.
    ///
    /// # Errors
    /// Returns an error when the key is empty or the HTTP client cannot be
    /// built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, VoiceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(VoiceError::MissingCredential("VAPI_API_KEY"));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: VAPI_BASE_URL.to_string(),
        })
    }

    /// Override the base URL; used by tests against a local stub.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a new assistant.
    ///
    /// # Errors
    /// Returns an error when the platform rejects the payload.
    pub async fn create_assistant(
        &self,
        definition: &AssistantDefinition,
    ) -> Result<AssistantRecord, VoiceError> {
        let response = self
            .client
            .post(format!("{}/assistant", self.base_url))
            .bearer_auth(&self.api_key)
            .json(definition)
            .send()
            .await?;

        let record: AssistantRecord = expect_success(response).await?.json().await?;
        info!(id = %record.id, "voice assistant created");
        Ok(record)
    }

    /// Update an existing assistant's prompt and greeting.
    ///
    /// # Errors
    /// Returns an error when the platform rejects the update.
    pub async fn update_assistant(
        &self,
        assistant_id: &str,
        update: &AssistantUpdate,
    ) -> Result<AssistantRecord, VoiceError> {
        let response = self
            .client
            .patch(format!("{}/assistant/{assistant_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(update)
            .send()
            .await?;

        let record: AssistantRecord = expect_success(response).await?.json().await?;
        info!(id = %record.id, "voice assistant updated");
        Ok(record)
    }

    /// List all assistants.
    ///
    /// # Errors
    /// Returns an error when the platform rejects the request.
    pub async fn get_assistants(&self) -> Result<Vec<AssistantRecord>, VoiceError> {
        let response = self
            .client
            .get(format!("{}/assistant", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Ok(expect_success(response).await?.json().await?)
    }

    /// Delete an assistant.
    ///
    /// # Errors
    /// Returns an error when the platform rejects the delete.
    pub async fn delete_assistant(&self, assistant_id: &str) -> Result<(), VoiceError> {
        let response = self
            .client
            .delete(format!("{}/assistant/{assistant_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        expect_success(response).await?;
        info!(id = %assistant_id, "voice assistant deleted");
        Ok(())
    }

    /// Probe the platform; never fails, reports status instead.
    pub async fn health_check(&self) -> VoiceHealth {
        let probe = self
            .client
            .get(format!("{}/assistant", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match probe {
            Ok(response) => VoiceHealth {
                status: if response.status().is_success() {
                    "healthy"
                } else {
                    "unhealthy"
                },
                api_key_set: true,
                response_code: Some(response.status().as_u16()),
            },
            Err(_) => VoiceHealth {
                status: "unhealthy",
                api_key_set: true,
                response_code: None,
            },
        }
    }
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, VoiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    Err(VoiceError::Rejected {
        status: status.as_u16(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            VapiClient::new(""),
            Err(VoiceError::MissingCredential("VAPI_API_KEY"))
        ));
        assert!(matches!(
            VapiClient::new("   "),
            Err(VoiceError::MissingCredential("VAPI_API_KEY"))
        ));
    }

    #[test]
    fn test_base_url_override() {
        let client = VapiClient::new("key").map(|c| c.with_base_url("http://127.0.0.1:9"));
        assert!(client.is_ok());
        assert_eq!(
            client.map(|c| c.base_url).unwrap_or_default(),
            "http://127.0.0.1:9"
        );
    }

    #[test]
    fn test_assistant_record_decoding() {
        let record: Result<AssistantRecord, _> =
            serde_json::from_str(r#"{"id":"as_123","name":"Acme Voice Assistant"}"#);
        let record = record.ok();
        assert!(record.is_some());
        let record = record.unwrap();
        assert_eq!(record.id, "as_123");
        assert_eq!(record.name.as_deref(), Some("Acme Voice Assistant"));
    }
}
