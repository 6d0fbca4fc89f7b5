//! HTTP route handlers for the Frontdesk agent API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::conversation::session::HealthSnapshot;
use crate::whatsapp::{self, InboundMessage};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/whatsapp", post(whatsapp_webhook))
        .route("/ask", post(ask_question))
        .route("/clear", post(clear_conversations))
        .route("/context", get(business_summary))
        .route("/send-whatsapp", post(send_whatsapp))
        .with_state(state)
}

fn xml_reply(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/xml")], body)
}

/// Twilio webhook for inbound WhatsApp messages.
///
/// Always answers 200 with TwiML once the webhook validates; the caller must
/// receive some reply text even when generation fails upstream.
async fn whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Some(message) = InboundMessage::from_form(&form) else {
        return Err((StatusCode::BAD_REQUEST, "Invalid webhook".to_string()));
    };

    info!(from = %message.from_number, sid = %message.message_sid, "whatsapp message received");

    let session = state.session_for(&message.from_number);
    let mut session = session.lock().await;

    let reply = if message.body.is_empty() {
        session.greeting()
    } else {
        session.respond(&message.body).await
    };

    Ok(xml_reply(whatsapp::twiml_reply(&reply)))
}

/// Question for the plain HTTP channel.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The customer's question.
    pub question: String,
}

/// Reply for the plain HTTP channel.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// The assistant's reply.
    pub response: String,
}

/// Handle direct questions against the shared session.
async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Json<AskResponse> {
    let session = state.default_session();
    let response = session.lock().await.respond(&request.question).await;
    Json(AskResponse { response })
}

/// Health report across the agent and its channel integrations.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Conversation engine health (shared session view).
    pub agent: AgentHealth,
    /// WhatsApp gateway availability.
    pub whatsapp: IntegrationHealth,
    /// Voice platform availability.
    pub voice: serde_json::Value,
}

/// Conversation engine health fields.
#[derive(Debug, Serialize)]
pub struct AgentHealth {
    /// `healthy` when context is loaded, `no_context` otherwise.
    pub status: &'static str,
    /// Snapshot of the shared session.
    #[serde(flatten)]
    pub snapshot: HealthSnapshot,
}

/// Minimal availability view of an optional integration.
#[derive(Debug, Serialize)]
pub struct IntegrationHealth {
    /// `configured` or `unavailable`.
    pub status: &'static str,
    /// Sending number, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_number: Option<String>,
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let session = state.default_session();
    let snapshot = session.lock().await.health_snapshot();

    let agent = AgentHealth {
        status: if snapshot.context_loaded {
            "healthy"
        } else {
            "no_context"
        },
        snapshot,
    };

    let whatsapp_health = state.whatsapp.as_ref().map_or(
        IntegrationHealth {
            status: "unavailable",
            from_number: None,
        },
        |gateway| IntegrationHealth {
            status: "configured",
            from_number: Some(gateway.from_number().to_string()),
        },
    );

    let voice = match state.vapi.as_ref() {
        Some(client) => serde_json::to_value(client.health_check().await)
            .unwrap_or_else(|_| serde_json::json!({ "status": "unhealthy" })),
        None => serde_json::json!({ "status": "unavailable" }),
    };

    Json(HealthResponse {
        agent,
        whatsapp: whatsapp_health,
        voice,
    })
}

/// Confirmation for history-clearing requests.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Number of sessions cleared.
    pub sessions_cleared: usize,
}

/// Clear every session's conversation history.
async fn clear_conversations(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    let sessions_cleared = state.clear_all().await;
    Json(ClearResponse {
        message: "Conversation history cleared.".to_string(),
        sessions_cleared,
    })
}

/// Business summary payload.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Generated summary or a fixed failure message.
    pub summary: String,
}

/// Summarize the loaded business document.
async fn business_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    let session = state.default_session();
    let summary = session.lock().await.summarize().await;
    Json(SummaryResponse { summary })
}

/// Outbound WhatsApp send request.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Destination number, any reasonable form.
    pub to_number: String,
    /// Message body.
    pub message: String,
}

/// Outbound WhatsApp send confirmation.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// Twilio message SID.
    pub message_sid: String,
    /// Fixed `sent` marker.
    pub status: &'static str,
    /// Normalized destination number.
    pub to: String,
}

/// Send a WhatsApp message manually.
async fn send_whatsapp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>, (StatusCode, String)> {
    let Some(gateway) = state.whatsapp.as_ref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "WhatsApp gateway is not configured".to_string(),
        ));
    };

    if request.to_number.trim().is_empty() || request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Missing to_number or message".to_string(),
        ));
    }

    let to = whatsapp::format_whatsapp_number(&request.to_number);
    match gateway.send_message(&to, &request.message).await {
        Ok(message_sid) => Ok(Json(SendResponse {
            message_sid,
            status: "sent",
            to,
        })),
        Err(err) => {
            error!(detail = %err, "whatsapp send failed");
            Err((StatusCode::BAD_GATEWAY, format!("Send failed: {err}")))
        }
    }
}
