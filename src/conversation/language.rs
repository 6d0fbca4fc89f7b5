//! Language profiles and instruction templates for the assistant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported assistant languages.
///
/// The set is closed; anything else resolves to English at parse time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    /// English.
    #[default]
    En,
    /// Spanish.
    Es,
    /// Mandarin Chinese.
    Zh,
}

impl LanguageTag {
    /// Parse a free-form tag. Unknown or empty tags fall back to English.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "es" => Self::Es,
            "zh" => Self::Zh,
            _ => Self::En,
        }
    }

    /// Short IETF-style code for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Zh => "zh",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instruction and greeting templates for one supported language.
pub struct LanguageProfile {
    tag: LanguageTag,
    instruction_template: fn(&str, &str) -> String,
    greeting_template: fn(&str) -> String,
    closing_line: &'static str,
}

impl LanguageProfile {
    /// Language this profile renders.
    #[must_use]
    pub const fn tag(&self) -> LanguageTag {
        self.tag
    }

    /// Render the grounding instructions over the business document.
    ///
    /// Rendering with empty `document_text` is valid: the section is simply
    /// empty, which the session treats as a degraded-but-working state.
    #[must_use]
    pub fn instruction(&self, business_name: &str, document_text: &str) -> String {
        (self.instruction_template)(business_name, document_text)
    }

    /// One-line welcome referencing the business name.
    #[must_use]
    pub fn greeting(&self, business_name: &str) -> String {
        (self.greeting_template)(business_name)
    }

    /// Closing line used by one-shot prompts (voice assistant provisioning).
    #[must_use]
    pub const fn closing(&self) -> &'static str {
        self.closing_line
    }
}

static PROFILES: [LanguageProfile; 3] = [
    LanguageProfile {
        tag: LanguageTag::En,
        instruction_template: english_instruction,
        greeting_template: english_greeting,
        closing_line: "Please provide helpful responses to customer inquiries about the business.",
    },
    LanguageProfile {
        tag: LanguageTag::Es,
        instruction_template: spanish_instruction,
        greeting_template: spanish_greeting,
        closing_line: "Por favor, proporciona respuestas útiles a las consultas de clientes sobre la empresa.",
    },
    LanguageProfile {
        tag: LanguageTag::Zh,
        instruction_template: chinese_instruction,
        greeting_template: chinese_greeting,
        closing_line: "请为客户关于企业的咨询提供有用的回答。",
    },
];

/// Resolve the profile for a language tag. Total function; never fails.
#[must_use]
pub fn lookup(tag: LanguageTag) -> &'static LanguageProfile {
    PROFILES
        .iter()
        .find(|profile| profile.tag == tag)
        .unwrap_or(&PROFILES[0])
}

fn english_instruction(business_name: &str, document_text: &str) -> String {
    format!(
        "You are a helpful business assistant for {business_name}.\n\n\
         Your role is to answer customer inquiries accurately and professionally based on the business information provided.\n\n\
         IMPORTANT GUIDELINES:\n\
         1. Always base your answers on the business information provided\n\
         2. If you don't know something or it's not in the business information, say so honestly\n\
         3. Be professional, friendly, and helpful\n\
         4. Keep responses concise but complete\n\
         5. Speak naturally, as if you're having a phone or chat conversation\n\
         6. If asked about services, prices, or policies not mentioned in the business info, direct them to contact the business directly\n\n\
         BUSINESS INFORMATION:\n{document_text}\n"
    )
}

fn english_greeting(business_name: &str) -> String {
    format!("Hello! I'm your {business_name} assistant. How can I help you today?")
}

fn spanish_instruction(business_name: &str, document_text: &str) -> String {
    format!(
        "Eres un asistente empresarial útil para {business_name}.\n\n\
         Tu función es responder consultas de clientes de manera precisa y profesional basándote en la información empresarial proporcionada.\n\n\
         PAUTAS IMPORTANTES:\n\
         1. Siempre basa tus respuestas en la información empresarial proporcionada\n\
         2. Si no sabes algo o no está en la información empresarial, dilo honestamente\n\
         3. Sé profesional, amigable y útil\n\
         4. Mantén las respuestas concisas pero completas\n\
         5. Habla con naturalidad, como si estuvieras en una conversación telefónica o de chat\n\
         6. Si te preguntan sobre servicios, precios o políticas no mencionadas en la información empresarial, dirige al cliente a contactar directamente con la empresa\n\n\
         INFORMACIÓN EMPRESARIAL:\n{document_text}\n"
    )
}

fn spanish_greeting(business_name: &str) -> String {
    format!("¡Hola! Soy tu asistente de {business_name}. ¿Cómo puedo ayudarte hoy?")
}

fn chinese_instruction(business_name: &str, document_text: &str) -> String {
    format!(
        "您是{business_name}的商务助理。\n\n\
         您的职责是根据提供的商务信息准确、专业地回答客户咨询。\n\n\
         重要准则：\n\
         1. 始终根据提供的商务信息回答\n\
         2. 如果不知道某事或商务信息中没有，请诚实说明\n\
         3. 保持专业、友好和有帮助的态度\n\
         4. 保持回答简洁但完整\n\
         5. 像电话或聊天交谈一样自然地表达\n\
         6. 如果询问商务信息中未提及的服务、价格或政策，请引导客户直接联系企业\n\n\
         商务信息：\n{document_text}\n"
    )
}

fn chinese_greeting(business_name: &str) -> String {
    format!("您好！我是您的{business_name}助理。今天我可以为您做些什么？")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!(LanguageTag::parse("en"), LanguageTag::En);
        assert_eq!(LanguageTag::parse("es"), LanguageTag::Es);
        assert_eq!(LanguageTag::parse("zh"), LanguageTag::Zh);
        assert_eq!(LanguageTag::parse(" ES "), LanguageTag::Es);
    }

    #[test]
    fn test_parse_unknown_tag_falls_back_to_english() {
        assert_eq!(LanguageTag::parse("fr"), LanguageTag::En);
        assert_eq!(LanguageTag::parse(""), LanguageTag::En);
        assert_eq!(LanguageTag::parse("klingon"), LanguageTag::En);
    }

    #[test]
    fn test_lookup_returns_matching_profile() {
        assert_eq!(lookup(LanguageTag::Es).tag(), LanguageTag::Es);
        assert_eq!(lookup(LanguageTag::Zh).tag(), LanguageTag::Zh);
        assert_eq!(lookup(LanguageTag::En).tag(), LanguageTag::En);
    }

    #[test]
    fn test_english_greeting_contains_business_name() {
        let greeting = lookup(LanguageTag::En).greeting("Acme");
        assert!(greeting.contains("Acme"));
    }

    #[test]
    fn test_greetings_are_localized() {
        assert!(lookup(LanguageTag::Es).greeting("Acme").contains("¡Hola!"));
        assert!(lookup(LanguageTag::Zh).greeting("Acme").contains("您好"));
    }

    #[test]
    fn test_instruction_embeds_document_and_name() {
        for tag in [LanguageTag::En, LanguageTag::Es, LanguageTag::Zh] {
            let rendered = lookup(tag).instruction("Acme", "We sell widgets.");
            assert!(rendered.contains("Acme"));
            assert!(rendered.contains("We sell widgets."));
        }
    }

    #[test]
    fn test_instruction_renders_with_empty_document() {
        let rendered = lookup(LanguageTag::En).instruction("Acme", "");
        assert!(rendered.contains("BUSINESS INFORMATION:"));
    }

    #[test]
    fn test_instruction_lists_six_guidelines() {
        let rendered = lookup(LanguageTag::En).instruction("Acme", "doc");
        for marker in ["1.", "2.", "3.", "4.", "5.", "6."] {
            assert!(rendered.contains(marker));
        }
    }
}
