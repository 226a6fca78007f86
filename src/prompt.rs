//! Prompt assembly for detection and both translation directions.

use crate::i18n::{LanguageTag, Tone};

/// A system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub fn detection_system_prompt() -> &'static str {
    r#"You identify the language of short messages exchanged between a vacation-rental host and a guest.
Reply with the BCP-47 language tag of the message and nothing else (e.g., "en", "ja", "pt-BR", "zh-Hant").
If the message mixes languages, answer with the language most of it is written in.
If you cannot tell, reply "und"."#
}

pub fn detection_user_prompt(text: &str) -> String {
    format!("Message:\n{}", text)
}

/// Guest message into the host's language.
pub fn build_to_host_prompt(text: &str, host_lang: &LanguageTag) -> Prompt {
    let language = host_lang.display_name();
    Prompt {
        system: format!(
            "You are the multilingual front desk of a hotel or vacation rental. \
Translate the guest's message into natural {}, keeping the guest's level of politeness and respect. \
Do not add explanations, notes or quotation marks.",
            language
        ),
        user: format!("Original:\n{}\n\nOutput: {} only.", text, language),
    }
}

/// Host reply into the guest's language, with tone and locale guidance.
pub fn build_to_guest_prompt(
    text: &str,
    host_lang: &LanguageTag,
    target: &LanguageTag,
    tone: Tone,
    source_locale: Option<&LanguageTag>,
) -> Prompt {
    let locale_guide = match target.locale() {
        Some(locale) => {
            let guidance = locale.guidance();
            if guidance.is_empty() {
                format!("Write in {}.", locale.name)
            } else {
                format!("Write in {}. {}", locale.name, guidance)
            }
        }
        None => format!("Write in {}.", target.display_name()),
    };

    let lines = [
        format!("Style guide: {}", tone.guide()),
        format!("Language/region guide: {}", locale_guide),
        source_locale
            .map(|s| format!("Reference: the guest originally wrote in {}.", s))
            .unwrap_or_default(),
        format!("Host's original ({}):\n{}", host_lang.display_name(), text),
    ];

    Prompt {
        system: "You are the multilingual concierge of a vacation-rental host. \
Return a natural translation of the host's reply without changing its meaning. \
Output only the translated message."
            .to_string(),
        user: lines
            .iter()
            .filter(|line| !line.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Stricter variant used for the single retry after a language mismatch.
pub fn build_retry_prompt(previous: &Prompt, target: &LanguageTag) -> Prompt {
    let language = target.display_name();
    Prompt {
        system: previous.system.clone(),
        user: format!(
            "{}\n\nYour previous answer was not written in {}. Answer again, in {} only, with no other language mixed in.",
            previous.user, language, language
        ),
    }
}
