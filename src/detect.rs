use crate::error::ApiError;
use crate::i18n::LanguageTag;
use crate::openai::ChatClient;
use crate::prompt::{detection_system_prompt, detection_user_prompt};
use tracing::{debug, warn};

/// Token budget for the detection reply (a tag, occasionally with noise)
const DETECTION_MAX_TOKENS: u32 = 16;

/// Detect the language of `text` with one LLM call.
///
/// The reply is reduced to its first word and validated; anything that is not
/// a language tag becomes `und`.
pub async fn detect_language(
    client: &ChatClient<'_>,
    text: &str,
) -> Result<LanguageTag, ApiError> {
    let reply = client
        .complete(
            detection_system_prompt(),
            &detection_user_prompt(text),
            DETECTION_MAX_TOKENS,
        )
        .await?;

    // Only the first word matters, so a cut-off reply is still usable
    let tag = parse_detection_reply(&reply.text);
    if tag.is_undetermined() {
        warn!(
            "Language detection was inconclusive ({} chars of input)",
            text.chars().count()
        );
    } else {
        debug!("Detected language: {}", tag);
    }
    Ok(tag)
}

fn parse_detection_reply(reply: &str) -> LanguageTag {
    let first = reply
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_ascii_alphanumeric());
    LanguageTag::parse_or_undetermined(first)
}
