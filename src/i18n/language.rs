//! Language tags: validated, normalized BCP-47 style identifiers.
//!
//! Tags arrive from request bodies, cookies and LLM replies, so every one of
//! them goes through `LanguageTag::parse` before it is used in a prompt or
//! written back to a cookie.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

const MAX_TAG_LEN: usize = 35;

/// A validated language tag (e.g., "en", "pt-BR", "zh-Hant", "en-US-west").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parse and normalize a tag.
    ///
    /// Registered locale codes keep their registry spelling. Other tags are
    /// normalized to the usual casing: lowercase language, Titlecase script,
    /// uppercase region.
    pub fn parse(raw: &str) -> Result<LanguageTag> {
        let raw = raw.trim();
        let regex = TAG_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{1,8})*$").unwrap());

        if raw.len() > MAX_TAG_LEN || !regex.is_match(raw) {
            bail!("Invalid language tag: '{}'", raw);
        }

        let raw = raw.replace('_', "-");
        if let Some(locale) = LocaleRegistry::get().get_by_code(&raw) {
            return Ok(LanguageTag(locale.code.to_string()));
        }

        let normalized = raw
            .split('-')
            .enumerate()
            .map(|(i, part)| match (i, part.len()) {
                (0, _) => part.to_ascii_lowercase(),
                (_, 4) if part.chars().all(|c| c.is_ascii_alphabetic()) => {
                    let mut chars = part.chars();
                    let first = chars.next().map(|c| c.to_ascii_uppercase());
                    first
                        .into_iter()
                        .chain(chars.map(|c| c.to_ascii_lowercase()))
                        .collect()
                }
                (_, 2) => part.to_ascii_uppercase(),
                _ => part.to_ascii_lowercase(),
            })
            .collect::<Vec<_>>()
            .join("-");

        Ok(LanguageTag(normalized))
    }

    /// Parse, falling back to `und` for anything that is not a tag.
    pub fn parse_or_undetermined(raw: &str) -> LanguageTag {
        LanguageTag::parse(raw).unwrap_or_else(|_| LanguageTag::undetermined())
    }

    /// The "undetermined" tag.
    pub fn undetermined() -> LanguageTag {
        LanguageTag("und".to_string())
    }

    pub fn is_undetermined(&self) -> bool {
        self.0 == "und"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag, lowercase (e.g., "zh" for "zh-Hant").
    ///
    /// Registered locales answer with their configured language.
    pub fn primary(&self) -> &str {
        match self.locale() {
            Some(locale) => locale.language,
            None => self.0.split('-').next().unwrap_or(&self.0),
        }
    }

    /// Whether both tags name the same language, ignoring script and region.
    pub fn same_language(&self, other: &LanguageTag) -> bool {
        !self.is_undetermined() && self.primary() == other.primary()
    }

    /// The registered reply locale for this tag, if any.
    pub fn locale(&self) -> Option<&'static LocaleConfig> {
        LocaleRegistry::get().get_by_code(&self.0)
    }

    /// English name for prompts: the registry name when registered, otherwise
    /// the name of the primary language, otherwise the tag itself.
    pub fn display_name(&self) -> String {
        if let Some(locale) = self.locale() {
            return locale.name.to_string();
        }
        match language_name(self.primary()) {
            Some(name) if self.primary() == self.0 => name.to_string(),
            Some(name) => format!("{} ({})", name, self.0),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// English name of a primary language subtag.
pub fn language_name(primary: &str) -> Option<&'static str> {
    let name = match primary {
        "ar" => "Arabic",
        "bg" => "Bulgarian",
        "cs" => "Czech",
        "da" => "Danish",
        "de" => "German",
        "el" => "Greek",
        "en" => "English",
        "es" => "Spanish",
        "fi" => "Finnish",
        "fr" => "French",
        "he" => "Hebrew",
        "hi" => "Hindi",
        "hu" => "Hungarian",
        "id" => "Indonesian",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ms" => "Malay",
        "nl" => "Dutch",
        "no" | "nb" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sv" => "Swedish",
        "th" => "Thai",
        "tl" | "fil" => "Filipino",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "vi" => "Vietnamese",
        "zh" => "Chinese",
        _ => return None,
    };
    Some(name)
}
