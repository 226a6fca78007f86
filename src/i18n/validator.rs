//! Output language validation.
//!
//! A crude script-based check that a model reply is written in the language
//! that was asked for. It can only judge languages with a distinctive script;
//! for most Latin-script targets it answers "don't know" unless the reply is
//! plainly in another script.

use crate::i18n::LanguageTag;
use regex::Regex;
use std::sync::OnceLock;

static KANA_REGEX: OnceLock<Regex> = OnceLock::new();
static HAN_REGEX: OnceLock<Regex> = OnceLock::new();
static HANGUL_REGEX: OnceLock<Regex> = OnceLock::new();
static LATIN_REGEX: OnceLock<Regex> = OnceLock::new();
static CYRILLIC_REGEX: OnceLock<Regex> = OnceLock::new();
static GREEK_REGEX: OnceLock<Regex> = OnceLock::new();
static ARABIC_REGEX: OnceLock<Regex> = OnceLock::new();
static HEBREW_REGEX: OnceLock<Regex> = OnceLock::new();
static THAI_REGEX: OnceLock<Regex> = OnceLock::new();

/// Letter counts per script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptCounts {
    pub kana: usize,
    pub han: usize,
    pub hangul: usize,
    pub latin: usize,
    pub cyrillic: usize,
    pub greek: usize,
    pub arabic: usize,
    pub hebrew: usize,
    pub thai: usize,
}

impl ScriptCounts {
    pub fn of(text: &str) -> ScriptCounts {
        ScriptCounts {
            kana: count(&KANA_REGEX, r"[\p{Hiragana}\p{Katakana}]", text),
            han: count(&HAN_REGEX, r"\p{Han}", text),
            hangul: count(&HANGUL_REGEX, r"\p{Hangul}", text),
            latin: count(&LATIN_REGEX, r"\p{Latin}", text),
            cyrillic: count(&CYRILLIC_REGEX, r"\p{Cyrillic}", text),
            greek: count(&GREEK_REGEX, r"\p{Greek}", text),
            arabic: count(&ARABIC_REGEX, r"\p{Arabic}", text),
            hebrew: count(&HEBREW_REGEX, r"\p{Hebrew}", text),
            thai: count(&THAI_REGEX, r"\p{Thai}", text),
        }
    }

    pub fn total(&self) -> usize {
        self.kana
            + self.han
            + self.hangul
            + self.latin
            + self.cyrillic
            + self.greek
            + self.arabic
            + self.hebrew
            + self.thai
    }
}

fn count(cell: &OnceLock<Regex>, pattern: &str, text: &str) -> usize {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
        .find_iter(text)
        .count()
}

/// At least half of the letters belong to the script.
fn dominant(script: usize, total: usize) -> bool {
    script * 2 >= total
}

pub struct TranslationValidator;

impl TranslationValidator {
    /// Check whether `text` looks like it is written in `target`.
    ///
    /// # Returns
    /// * `Some(true)` if the script fits the language
    /// * `Some(false)` if it clearly does not
    /// * `None` if the check cannot tell (no letters, or a language whose
    ///   script is shared with many others)
    pub fn matches_language(text: &str, target: &LanguageTag) -> Option<bool> {
        let counts = ScriptCounts::of(text);
        let total = counts.total();
        if total == 0 {
            return None;
        }

        let language = target.primary();
        let verdict = match language {
            "ja" => {
                counts.kana > 0
                    || (counts.hangul == 0 && counts.han > 0 && dominant(counts.han, total))
            }
            "zh" => counts.han > 0 && counts.kana == 0 && counts.hangul == 0,
            "ko" => counts.hangul > 0,
            "ru" | "uk" | "bg" | "sr" | "be" | "kk" | "mk" => {
                // Serbian is also written in Latin
                if language == "sr" && dominant(counts.latin, total) {
                    return None;
                }
                dominant(counts.cyrillic, total)
            }
            "el" => dominant(counts.greek, total),
            "ar" | "fa" | "ur" => dominant(counts.arabic, total),
            "he" | "yi" => dominant(counts.hebrew, total),
            "th" => dominant(counts.thai, total),
            primary if uses_latin_script(primary) => {
                if dominant(counts.latin, total) {
                    return None;
                }
                false
            }
            _ => return None,
        };

        Some(verdict)
    }
}

fn uses_latin_script(primary: &str) -> bool {
    matches!(
        primary,
        "en" | "de"
            | "fr"
            | "it"
            | "es"
            | "pt"
            | "nl"
            | "sv"
            | "da"
            | "no"
            | "nb"
            | "fi"
            | "pl"
            | "cs"
            | "hu"
            | "ro"
            | "tr"
            | "vi"
            | "id"
            | "ms"
            | "tl"
            | "fil"
    )
}
