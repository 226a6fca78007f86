//! Locale registry: the reply locales a host can choose from.
//!
//! Some codes are not plain BCP-47 (`en-US-west`, `en-US-east`); they carry a
//! regional phrasing preference on top of the language and are only meaningful
//! inside this service.

use serde::Serialize;
use std::sync::OnceLock;

/// Configuration for a selectable reply locale.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleConfig {
    /// Locale code as sent by clients (e.g., "en-AU", "zh-Hant")
    pub code: &'static str,

    /// Label shown to the host, in the locale's own language
    pub label: &'static str,

    /// English name used inside prompts
    #[serde(skip)]
    pub name: &'static str,

    /// Primary language subtag (e.g., "en", "zh")
    #[serde(skip)]
    pub language: &'static str,

    /// Extra guidance on which variety of the language to write
    #[serde(skip)]
    pub hint: &'static str,

    /// Regional phrasing preference (only the US coast variants have one)
    #[serde(skip)]
    pub region_guide: &'static str,
}

impl LocaleConfig {
    /// Combined language/region guidance for the prompt; empty when there is none.
    pub fn guidance(&self) -> String {
        [self.hint, self.region_guide]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Look up a locale by code, ignoring ASCII case.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales
            .iter()
            .find(|locale| locale.code.eq_ignore_ascii_case(code))
    }

    /// All locales, in the order they should be offered to the host.
    pub fn list_all(&self) -> &[LocaleConfig] {
        &self.locales
    }
}

fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en-US-west",
            label: "English — US West Coast",
            name: "American English",
            language: "en",
            hint: "",
            region_guide: "Prefer natural US West Coast phrasing: relaxed and friendly, never stiff.",
        },
        LocaleConfig {
            code: "en-US-east",
            label: "English — US East Coast",
            name: "American English",
            language: "en",
            hint: "",
            region_guide: "Prefer natural US East Coast phrasing: a little more buttoned-up and precise.",
        },
        LocaleConfig {
            code: "en-AU",
            label: "English — Australia",
            name: "Australian English",
            language: "en",
            hint: "Use natural Australian English expressions and spelling.",
            region_guide: "",
        },
        LocaleConfig {
            code: "en-NZ",
            label: "English — New Zealand",
            name: "New Zealand English",
            language: "en",
            hint: "Use natural New Zealand English expressions and spelling.",
            region_guide: "",
        },
        LocaleConfig {
            code: "de-DE",
            label: "Deutsch (DE)",
            name: "German",
            language: "de",
            hint: "",
            region_guide: "",
        },
        LocaleConfig {
            code: "de-CH",
            label: "Schweizer Hochdeutsch (CH)",
            name: "Swiss Standard German",
            language: "de",
            hint: "Write Swiss Standard German (Schweizer Hochdeutsch): use ss instead of ß.",
            region_guide: "",
        },
        LocaleConfig {
            code: "fr-FR",
            label: "Français",
            name: "French",
            language: "fr",
            hint: "",
            region_guide: "",
        },
        LocaleConfig {
            code: "it-IT",
            label: "Italiano",
            name: "Italian",
            language: "it",
            hint: "",
            region_guide: "",
        },
        LocaleConfig {
            code: "es-ES",
            label: "Español",
            name: "Spanish",
            language: "es",
            hint: "",
            region_guide: "",
        },
        LocaleConfig {
            code: "zh-Hant",
            label: "繁體中文",
            name: "Traditional Chinese",
            language: "zh",
            hint: "Write Traditional Chinese that reads naturally in Taiwan and Hong Kong.",
            region_guide: "",
        },
        LocaleConfig {
            code: "zh-Hans",
            label: "简体中文",
            name: "Simplified Chinese",
            language: "zh",
            hint: "Write Simplified Chinese that reads naturally in mainland China.",
            region_guide: "",
        },
        LocaleConfig {
            code: "ko-KR",
            label: "한국어",
            name: "Korean",
            language: "ko",
            hint: "",
            region_guide: "",
        },
    ]
}
