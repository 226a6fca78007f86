use anyhow::{Context, Result};

use crate::i18n::LanguageTag;

#[derive(Debug, Clone)]
pub struct Config {
    // Deployment
    pub environment: Option<String>,
    pub commit: Option<String>,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
    pub openai_temperature: f32,

    // Languages
    pub host_lang: LanguageTag,
    pub default_guest_locale: LanguageTag,

    // Access control (optional; POST /api/translate requires it when set)
    pub api_key: Option<String>,

    // Session cookie
    pub cookie_secure: bool,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host_lang = std::env::var("HOST_LANG").unwrap_or_else(|_| "ja".to_string());
        let default_guest_locale =
            std::env::var("DEFAULT_GUEST_LOCALE").unwrap_or_else(|_| "en-US-west".to_string());

        Ok(Self {
            environment: non_empty_var("APP_ENV").or_else(|| non_empty_var("VERCEL_ENV")),
            commit: non_empty_var("GIT_COMMIT_SHA")
                .or_else(|| non_empty_var("VERCEL_GIT_COMMIT_SHA")),

            // OpenAI - the key may be absent at startup; requests then fail with 500
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            openai_temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.3),

            host_lang: LanguageTag::parse(&host_lang)
                .with_context(|| format!("HOST_LANG is not a language tag: {}", host_lang))?,
            default_guest_locale: LanguageTag::parse(&default_guest_locale).with_context(|| {
                format!(
                    "DEFAULT_GUEST_LOCALE is not a language tag: {}",
                    default_guest_locale
                )
            })?,

            api_key: non_empty_var("API_KEY"),

            cookie_secure: std::env::var("COOKIE_SECURE")
                .ok()
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
