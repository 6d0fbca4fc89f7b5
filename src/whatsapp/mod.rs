//! WhatsApp channel adapter over the Twilio REST and TwiML surfaces.
//!
//! Thin transport code: the conversation engine never sees any of this.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Twilio REST API base.
const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio's WhatsApp sandbox sender, used when no number is configured.
pub const DEFAULT_FROM_NUMBER: &str = "whatsapp:+14155238886";

/// Connect timeout for the Twilio client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// End-to-end send timeout.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the WhatsApp gateway.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A required credential is missing at construction.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    /// Twilio rejected the send.
    #[error("twilio returned status {status}: {detail}")]
    Rejected {
        /// HTTP status Twilio answered with.
        status: u16,
        /// Error-body excerpt.
        detail: String,
    },
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Twilio answered with a body this client cannot interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Credentials and sender identity for the gateway.
#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    /// Twilio account SID.
    pub account_sid: String,
    /// Twilio auth token.
    pub auth_token: String,
    /// Sending WhatsApp number in `whatsapp:+E.164` form.
    pub from_number: String,
}

/// Inbound webhook fields Twilio posts for a WhatsApp message.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Sender's WhatsApp number.
    pub from_number: String,
    /// Receiving WhatsApp number.
    pub to_number: String,
    /// Message text, trimmed.
    pub body: String,
    /// Twilio message SID.
    pub message_sid: String,
    /// Sender's profile name, when Twilio supplies one.
    pub profile_name: Option<String>,
}

impl InboundMessage {
    /// Parse a Twilio webhook form. Returns `None` when required fields are
    /// missing, which callers should answer with a 400.
    #[must_use]
    pub fn from_form(form: &HashMap<String, String>) -> Option<Self> {
        Some(Self {
            from_number: form.get("From")?.clone(),
            to_number: form.get("To")?.clone(),
            body: form.get("Body")?.trim().to_string(),
            message_sid: form.get("MessageSid")?.clone(),
            profile_name: form.get("ProfileName").cloned(),
        })
    }
}

/// Render a one-message TwiML reply document.
#[must_use]
pub fn twiml_reply(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Ensure a number is in `whatsapp:+E.164` form.
#[must_use]
pub fn format_whatsapp_number(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        return number.to_string();
    }
    if number.starts_with('+') {
        format!("whatsapp:{number}")
    } else {
        format!("whatsapp:+{number}")
    }
}

/// Outbound WhatsApp sender over the Twilio Messages API.
pub struct WhatsAppGateway {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppGateway {
    /// Build a gateway from credentials.
    ///
    /// # Errors
    /// Returns an error when a credential is empty or the HTTP client cannot
    /// be built.
    pub fn new(config: WhatsAppConfig) -> Result<Self, ChannelError> {
        if config.account_sid.trim().is_empty() {
            return Err(ChannelError::MissingCredential("TWILIO_ACCOUNT_SID"));
        }
        if config.auth_token.trim().is_empty() {
            return Err(ChannelError::MissingCredential("TWILIO_AUTH_TOKEN"));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(SEND_TIMEOUT)
            .build()?;

        Ok(Self { client, config })
    }

    /// Sending number this gateway is configured with.
    #[must_use]
    pub fn from_number(&self) -> &str {
        &self.config.from_number
    }

    /// Send a WhatsApp message; returns the Twilio message SID.
    ///
    /// # Errors
    /// Returns an error if Twilio rejects the send or the response is
    /// unusable.
    pub async fn send_message(&self, to_number: &str, body: &str) -> Result<String, ChannelError> {
        let url = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        let form = [
            ("From", self.config.from_number.as_str()),
            ("To", to_number),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let decoded: MessageResponse = response
            .json()
            .await
            .map_err(|err| ChannelError::Malformed(err.to_string()))?;
        let sid = decoded
            .sid
            .ok_or_else(|| ChannelError::Malformed("missing message sid".to_string()))?;

        info!(%sid, "whatsapp message sent");
        Ok(sid)
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twiml_reply_wraps_message() {
        let xml = twiml_reply("We are open 9-5.");
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<Response><Message>We are open 9-5.</Message></Response>"));
    }

    #[test]
    fn test_twiml_reply_escapes_markup() {
        let xml = twiml_reply("Deals on <widgets> & \"gadgets\"");
        assert!(xml.contains("&lt;widgets&gt;"));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&quot;gadgets&quot;"));
        assert!(!xml.contains("<widgets>"));
    }

    #[test]
    fn test_format_whatsapp_number() {
        assert_eq!(format_whatsapp_number("+15551234"), "whatsapp:+15551234");
        assert_eq!(format_whatsapp_number("15551234"), "whatsapp:+15551234");
        assert_eq!(
            format_whatsapp_number("whatsapp:+15551234"),
            "whatsapp:+15551234"
        );
    }

    #[test]
    fn test_inbound_message_requires_all_fields() {
        let mut form = HashMap::new();
        form.insert("From".to_string(), "whatsapp:+15550001".to_string());
        form.insert("To".to_string(), "whatsapp:+15550002".to_string());
        form.insert("Body".to_string(), "  hello  ".to_string());
        assert!(InboundMessage::from_form(&form).is_none());

        form.insert("MessageSid".to_string(), "SM123".to_string());
        let message = InboundMessage::from_form(&form);
        assert!(message.is_some());
        let message = message.unwrap();
        assert_eq!(message.body, "hello");
        assert!(message.profile_name.is_none());
    }

    #[test]
    fn test_gateway_requires_credentials() {
        let config = WhatsAppConfig {
            account_sid: String::new(),
            auth_token: "token".to_string(),
            from_number: DEFAULT_FROM_NUMBER.to_string(),
        };
        assert!(matches!(
            WhatsAppGateway::new(config),
            Err(ChannelError::MissingCredential("TWILIO_ACCOUNT_SID"))
        ));
    }
}
