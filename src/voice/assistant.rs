//! Assistant payloads sent to the voice platform.

use serde::Serialize;

use crate::conversation::context::DocumentContext;
use crate::conversation::language::{LanguageProfile, LanguageTag};

/// Model the voice platform runs behind the call.
const VOICE_MODEL_PROVIDER: &str = "openai";
/// Completion model for the phone channel.
const VOICE_MODEL: &str = "gpt-4";
/// Temperature for the phone channel model.
const VOICE_TEMPERATURE: f64 = 0.7;
/// Seconds of silence before the call is considered abandoned.
const SILENCE_TIMEOUT_SECONDS: u32 = 30;
/// Hard cap on call duration.
const MAX_CALL_SECONDS: u32 = 600;
/// Ambient sound played behind the assistant.
const BACKGROUND_SOUND: &str = "office";
/// Transcriber model for non-English calls.
const TRANSCRIBER_MODEL: &str = "nova-2";
/// Transcriber provider for non-English calls.
const TRANSCRIBER_PROVIDER: &str = "deepgram";

/// Voice backend selection, resolved once at configuration time.
///
/// A closed set instead of free-form provider strings; each variant
/// serializes to the exact JSON shape its provider expects.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "provider")]
pub enum VoiceSelection {
    /// ElevenLabs voice with stability tuning.
    #[serde(rename = "11labs")]
    ElevenLabs {
        /// Provider voice identifier.
        #[serde(rename = "voiceId")]
        voice_id: String,
        /// Voice stability in `0.0..=1.0`.
        stability: f64,
        /// Similarity boost in `0.0..=1.0`.
        #[serde(rename = "similarityBoost")]
        similarity_boost: f64,
    },
    /// OpenAI text-to-speech voice.
    #[serde(rename = "openai")]
    OpenAi {
        /// Provider voice identifier.
        #[serde(rename = "voiceId")]
        voice_id: String,
    },
    /// Azure neural voice.
    #[serde(rename = "azure")]
    Azure {
        /// Provider voice identifier.
        voice: String,
    },
    /// PlayHT voice.
    #[serde(rename = "playht")]
    PlayHt {
        /// Provider voice identifier.
        voice: String,
    },
}

impl Default for VoiceSelection {
    // ElevenLabs "Rachel", the stock professional voice.
    fn default() -> Self {
        Self::ElevenLabs {
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            stability: 0.5,
            similarity_boost: 0.8,
        }
    }
}

/// Full assistant payload for create/update calls.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantDefinition {
    /// Model section with the grounded system prompt.
    pub model: ModelSection,
    /// Selected voice backend.
    pub voice: VoiceSelection,
    /// Opening line spoken when the call connects.
    pub first_message: String,
    /// Whether the platform records calls.
    pub recording_enabled: bool,
    /// Seconds of silence before hang-up.
    pub silence_timeout_seconds: u32,
    /// Maximum call duration in seconds.
    pub max_duration_seconds: u32,
    /// Ambient sound profile.
    pub background_sound: String,
    /// Whether the assistant backchannels ("mm-hmm") while listening.
    pub backchanneling_enabled: bool,
    /// Display name of the assistant.
    pub name: String,
    /// Transcriber override; only set for non-English profiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcriber: Option<TranscriberSection>,
}

/// Model block of an assistant payload.
#[derive(Clone, Debug, Serialize)]
pub struct ModelSection {
    /// Model provider identifier.
    pub provider: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// System prompt messages.
    pub messages: Vec<SystemMessage>,
}

/// One message in the model block.
#[derive(Clone, Debug, Serialize)]
pub struct SystemMessage {
    /// Message role, always `system` here.
    pub role: String,
    /// Prompt content.
    pub content: String,
}

/// Transcriber block for non-English calls.
#[derive(Clone, Debug, Serialize)]
pub struct TranscriberSection {
    /// Transcription model.
    pub model: String,
    /// Spoken-language code.
    pub language: String,
    /// Transcription provider.
    pub provider: String,
}

impl AssistantDefinition {
    /// Build the assistant payload for a business document and language.
    #[must_use]
    pub fn new(
        context: &DocumentContext,
        profile: &LanguageProfile,
        voice: VoiceSelection,
    ) -> Self {
        let mut system_prompt = profile.instruction(context.business_name(), context.text());
        system_prompt.push('\n');
        system_prompt.push_str(profile.closing());

        let transcriber = if profile.tag() == LanguageTag::En {
            None
        } else {
            Some(TranscriberSection {
                model: TRANSCRIBER_MODEL.to_string(),
                language: profile.tag().as_str().to_string(),
                provider: TRANSCRIBER_PROVIDER.to_string(),
            })
        };

        Self {
            model: ModelSection {
                provider: VOICE_MODEL_PROVIDER.to_string(),
                model: VOICE_MODEL.to_string(),
                temperature: VOICE_TEMPERATURE,
                messages: vec![SystemMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                }],
            },
            voice,
            first_message: profile.greeting(context.business_name()),
            recording_enabled: false,
            silence_timeout_seconds: SILENCE_TIMEOUT_SECONDS,
            max_duration_seconds: MAX_CALL_SECONDS,
            background_sound: BACKGROUND_SOUND.to_string(),
            backchanneling_enabled: true,
            name: format!("{} Voice Assistant", context.business_name()),
            transcriber,
        }
    }
}

/// Partial payload for updating an existing assistant's prompt and greeting.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantUpdate {
    /// Replacement model section.
    pub model: ModelSection,
    /// Replacement opening line.
    pub first_message: String,
}

impl From<&AssistantDefinition> for AssistantUpdate {
    fn from(definition: &AssistantDefinition) -> Self {
        Self {
            model: definition.model.clone(),
            first_message: definition.first_message.clone(),
        }
    }
}
