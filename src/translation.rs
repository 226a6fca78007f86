use crate::config::Config;
use crate::detect::detect_language;
use crate::error::ApiError;
use crate::i18n::{LanguageTag, Tone, TranslationValidator};
use crate::openai::ChatClient;
use crate::prompt::{build_retry_prompt, build_to_guest_prompt, build_to_host_prompt, Prompt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Token budget for a translated message; replies cut off at it are rejected
const TRANSLATION_MAX_TOKENS: u32 = 4000;

/// Body of `POST /api/translate`.
///
/// Every field is optional at the serde level so that a missing `text` is
/// reported as such instead of as a JSON error.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub role: Option<String>,
    pub tone: Option<String>,
    pub guest_lang: Option<String>,
    /// Legacy direction switch: `to_ja` / `from_ja`
    pub mode: Option<String>,
    pub target_locale: Option<String>,
    /// Language the guest writes in, when the client already knows it
    pub source_locale: Option<String>,
}

/// Who wrote the message being translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Inbound message, translated into the host language
    Guest,
    /// Outbound reply, translated into the guest language
    Host,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(Role::Guest),
            "host" => Ok(Role::Host),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Guest => f.write_str("guest"),
            Role::Host => f.write_str("host"),
        }
    }
}

/// Map the legacy `mode` field to a role.
fn role_from_mode(mode: &str) -> Option<Role> {
    match mode.trim() {
        "to_ja" => Some(Role::Guest),
        "from_ja" => Some(Role::Host),
        _ => None,
    }
}

/// Result of one translation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    pub text: String,
    pub role: Role,
    pub source_lang: LanguageTag,
    pub target_lang: LanguageTag,
    pub tone: Tone,
    /// The first output failed the language check and was translated again
    pub retried: bool,
    /// Guest language to store in the session cookie
    pub remember_guest_lang: Option<LanguageTag>,
}

/// Request fields after validation.
#[derive(Debug)]
struct ValidatedRequest {
    text: String,
    role_hint: Option<Role>,
    tone: Tone,
    target_locale: Option<LanguageTag>,
    guest_lang: Option<LanguageTag>,
    source_locale: Option<LanguageTag>,
}

/// Parse a language field from the body. `und` names no language and is
/// rejected like any other bad value.
fn parse_optional_tag(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<LanguageTag>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => LanguageTag::parse(raw)
            .ok()
            .filter(|tag| !tag.is_undetermined())
            .map(Some)
            .ok_or_else(|| ApiError::invalid_field(field, raw)),
        None => Ok(None),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate(request: &TranslateRequest) -> Result<ValidatedRequest, ApiError> {
    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingText)?
        .to_string();

    let role_from_field = match non_blank(request.role.as_deref()) {
        Some(raw) => Some(raw.parse::<Role>().map_err(|v| ApiError::invalid_field("role", v))?),
        None => None,
    };
    let role_from_legacy_mode = match non_blank(request.mode.as_deref()) {
        Some(raw) => Some(role_from_mode(raw).ok_or_else(|| ApiError::invalid_field("mode", raw))?),
        None => None,
    };

    let tone = match request.tone.as_deref() {
        Some(raw) => raw.parse::<Tone>().map_err(|v| ApiError::invalid_field("tone", v))?,
        None => Tone::default(),
    };

    Ok(ValidatedRequest {
        text,
        role_hint: role_from_field.or(role_from_legacy_mode),
        tone,
        target_locale: parse_optional_tag("targetLocale", request.target_locale.as_deref())?,
        guest_lang: parse_optional_tag("guestLang", request.guest_lang.as_deref())?,
        source_locale: parse_optional_tag("sourceLocale", request.source_locale.as_deref())?,
    })
}

/// Pick the reply target for the host role.
///
/// Explicit target, then the body's `guestLang`, then the session cookie,
/// then the configured default.
fn resolve_guest_target(
    config: &Config,
    target_locale: Option<LanguageTag>,
    guest_lang: Option<LanguageTag>,
    cookie_lang: Option<LanguageTag>,
) -> LanguageTag {
    target_locale
        .or(guest_lang)
        .or(cookie_lang)
        .unwrap_or_else(|| config.default_guest_locale.clone())
}

/// Run one translation cycle: detect, pick direction, prompt, check, retry once.
pub async fn translate(
    http: &reqwest::Client,
    config: &Config,
    request: &TranslateRequest,
    cookie_lang: Option<LanguageTag>,
) -> Result<TranslationOutcome, ApiError> {
    let client = ChatClient::new(http, config)?;
    let request = validate(request)?;
    let host_lang = &config.host_lang;

    // A host reply is written in the host language; everything else may need detection
    let source_lang = match (&request.source_locale, request.role_hint) {
        (Some(tag), Some(Role::Guest)) | (Some(tag), None) => tag.clone(),
        (_, Some(Role::Host)) => host_lang.clone(),
        (None, _) => detect_language(&client, &request.text).await?,
    };

    let role = request.role_hint.unwrap_or(if source_lang.same_language(host_lang) {
        Role::Host
    } else {
        Role::Guest
    });

    let (target_lang, prompt) = match role {
        Role::Guest => (
            host_lang.clone(),
            build_to_host_prompt(&request.text, host_lang),
        ),
        Role::Host => {
            let target = resolve_guest_target(
                config,
                request.target_locale.clone(),
                request.guest_lang.clone(),
                cookie_lang,
            );
            let reference = request
                .source_locale
                .as_ref()
                .filter(|tag| !tag.same_language(host_lang));
            let prompt =
                build_to_guest_prompt(&request.text, host_lang, &target, request.tone, reference);
            (target, prompt)
        }
    };

    info!(
        "Translating {} chars as {} ({} -> {}, tone {})",
        request.text.chars().count(),
        role,
        source_lang,
        target_lang,
        request.tone
    );

    let (text, retried) = translate_with_check(&client, &prompt, &target_lang).await?;

    let remember_guest_lang = match role {
        Role::Guest if !source_lang.is_undetermined() && !source_lang.same_language(host_lang) => {
            Some(source_lang.clone())
        }
        _ => None,
    };

    Ok(TranslationOutcome {
        text,
        role,
        source_lang,
        target_lang,
        tone: request.tone,
        retried,
        remember_guest_lang,
    })
}

/// Translate, and translate once more if the output is clearly in the wrong language.
async fn translate_with_check(
    client: &ChatClient<'_>,
    prompt: &Prompt,
    target: &LanguageTag,
) -> Result<(String, bool), ApiError> {
    let first = complete_translation(client, prompt).await?;

    if TranslationValidator::matches_language(&first, target) != Some(false) {
        return Ok((first, false));
    }

    warn!("Translation output does not look like {}, retrying once", target);
    let retry_prompt = build_retry_prompt(prompt, target);
    let second = complete_translation(client, &retry_prompt).await?;

    if TranslationValidator::matches_language(&second, target) == Some(false) {
        warn!("Retried translation still does not look like {}", target);
    }

    Ok((second, true))
}

/// One translation call. A reply that ran into the token budget is incomplete
/// and never returned as a translation.
async fn complete_translation(
    client: &ChatClient<'_>,
    prompt: &Prompt,
) -> Result<String, ApiError> {
    let completion = client
        .complete(&prompt.system, &prompt.user, TRANSLATION_MAX_TOKENS)
        .await?;

    if completion.truncated {
        warn!(
            "Translation stopped at the {} token limit ({} chars returned)",
            TRANSLATION_MAX_TOKENS,
            completion.text.chars().count()
        );
        return Err(ApiError::Upstream {
            status: 502,
            message: "Translation was cut off at the token limit".to_string(),
        });
    }

    Ok(completion.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::tests::{create_openai_response, create_test_config};
    use wiremock::{
        matchers::{body_partial_json, body_string_contains, method},
        Mock, MockServer, ResponseTemplate,
    };

    fn tag(s: &str) -> LanguageTag {
        LanguageTag::parse(s).unwrap()
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(create_openai_response(content))
    }

    fn request(text: &str) -> TranslateRequest {
        TranslateRequest {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    // ==================== Role Tests ====================

    #[test]
    fn test_role_from_str() {
        assert_eq!("guest".parse::<Role>(), Ok(Role::Guest));
        assert_eq!(" HOST ".parse::<Role>(), Ok(Role::Host));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_from_legacy_mode() {
        assert_eq!(role_from_mode("to_ja"), Some(Role::Guest));
        assert_eq!(role_from_mode("from_ja"), Some(Role::Host));
        assert_eq!(role_from_mode(" from_ja "), Some(Role::Host));
        assert_eq!(role_from_mode("to_guest"), None);
        assert_eq!(role_from_mode("to_host"), None);
        assert_eq!(role_from_mode("sideways"), None);
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: TranslateRequest = serde_json::from_value(serde_json::json!({
            "text": "hi",
            "guestLang": "fr",
            "targetLocale": "de-CH",
            "sourceLocale": "en",
            "mode": "from_ja"
        }))
        .expect("Should deserialize");

        assert_eq!(req.guest_lang.as_deref(), Some("fr"));
        assert_eq!(req.target_locale.as_deref(), Some("de-CH"));
        assert_eq!(req.source_locale.as_deref(), Some("en"));
        assert_eq!(req.mode.as_deref(), Some("from_ja"));
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_requires_text() {
        assert!(matches!(validate(&TranslateRequest::default()), Err(ApiError::MissingText)));
        assert!(matches!(validate(&request("   \n")), Err(ApiError::MissingText)));
    }

    #[test]
    fn test_validate_rejects_unknown_role_tone_mode() {
        let mut req = request("hi");
        req.role = Some("admin".into());
        assert!(matches!(validate(&req), Err(ApiError::InvalidField { field: "role", .. })));

        let mut req = request("hi");
        req.tone = Some("sarcastic".into());
        assert!(matches!(validate(&req), Err(ApiError::InvalidField { field: "tone", .. })));

        let mut req = request("hi");
        req.mode = Some("sideways".into());
        assert!(matches!(validate(&req), Err(ApiError::InvalidField { field: "mode", .. })));
    }

    #[test]
    fn test_validate_rejects_bad_locale() {
        let mut req = request("hi");
        req.target_locale = Some("French please".into());
        assert!(matches!(
            validate(&req),
            Err(ApiError::InvalidField { field: "targetLocale", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_undetermined_locale() {
        let mut req = request("hi");
        req.target_locale = Some("und".into());
        let err = validate(&req).unwrap_err();
        assert!(matches!(err, ApiError::InvalidField { field: "targetLocale", .. }));
        assert_eq!(err.to_string(), "invalid targetLocale: und");

        let mut req = request("hi");
        req.guest_lang = Some("UND".into());
        assert!(matches!(
            validate(&req),
            Err(ApiError::InvalidField { field: "guestLang", .. })
        ));
    }

    #[test]
    fn test_validate_role_field_wins_over_mode() {
        let mut req = request("hi");
        req.role = Some("guest".into());
        req.mode = Some("from_ja".into());

        assert_eq!(validate(&req).unwrap().role_hint, Some(Role::Guest));
    }

    #[test]
    fn test_validate_blank_optionals_are_ignored() {
        let mut req = request("hi");
        req.role = Some("".into());
        req.target_locale = Some("  ".into());
        req.tone = Some("".into());

        let validated = validate(&req).unwrap();
        assert_eq!(validated.role_hint, None);
        assert_eq!(validated.target_locale, None);
        assert_eq!(validated.tone, Tone::Neutral);
    }

    // ==================== Target Resolution Tests ====================

    #[test]
    fn test_resolve_guest_target_precedence() {
        let config = create_test_config("http://unused");

        assert_eq!(
            resolve_guest_target(&config, Some(tag("ko-KR")), Some(tag("fr")), Some(tag("de"))),
            tag("ko-KR")
        );
        assert_eq!(
            resolve_guest_target(&config, None, Some(tag("fr")), Some(tag("de"))),
            tag("fr")
        );
        assert_eq!(resolve_guest_target(&config, None, None, Some(tag("de"))), tag("de"));
        assert_eq!(resolve_guest_target(&config, None, None, None), tag("en-US-west"));
    }

    // ==================== Translation Cycle Tests ====================

    async fn setup(mock_server: &MockServer) -> (reqwest::Client, Config) {
        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        (reqwest::Client::new(), config)
    }

    #[tokio::test]
    async fn test_guest_message_detects_and_translates_to_host() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("BCP-47"))
            .respond_with(reply("en"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("front desk"))
            .respond_with(reply("明日ランドリーサービスをお願いできますか？"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let outcome = translate(&http, &config, &request("Can I request laundry tomorrow?"), None)
            .await
            .expect("Should succeed");

        assert_eq!(outcome.role, Role::Guest);
        assert_eq!(outcome.source_lang, tag("en"));
        assert_eq!(outcome.target_lang, tag("ja"));
        assert!(!outcome.retried);
        assert_eq!(outcome.remember_guest_lang, Some(tag("en")));
    }

    #[tokio::test]
    async fn test_host_language_input_is_inferred_as_host_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("BCP-47"))
            .respond_with(reply("ja"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("concierge"))
            .and(body_string_contains("Write in French."))
            .respond_with(reply("Bien sûr !"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let outcome = translate(&http, &config, &request("もちろんです。"), Some(tag("fr")))
            .await
            .expect("Should succeed");

        assert_eq!(outcome.role, Role::Host);
        assert_eq!(outcome.target_lang, tag("fr"));
        assert_eq!(outcome.text, "Bien sûr !");
        assert_eq!(outcome.remember_guest_lang, None);
    }

    #[tokio::test]
    async fn test_explicit_host_role_skips_detection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("concierge"))
            .respond_with(reply("Of course!"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("もちろんです。");
        req.mode = Some("from_ja".into());
        req.tone = Some("casual".into());

        let outcome = translate(&http, &config, &req, None).await.expect("Should succeed");

        assert_eq!(outcome.role, Role::Host);
        assert_eq!(outcome.source_lang, tag("ja"));
        assert_eq!(outcome.target_lang, tag("en-US-west"));
        assert_eq!(outcome.tone, Tone::Casual);
    }

    #[tokio::test]
    async fn test_source_locale_skips_detection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("front desk"))
            .respond_with(reply("こんにちは"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("Hallo!");
        req.source_locale = Some("de".into());

        let outcome = translate(&http, &config, &req, None).await.expect("Should succeed");

        assert_eq!(outcome.role, Role::Guest);
        assert_eq!(outcome.remember_guest_lang, Some(tag("de")));
    }

    #[tokio::test]
    async fn test_wrong_script_output_is_retried_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("previous answer"))
            .respond_with(reply("チェックインは何時ですか？"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("front desk"))
            .and(|req: &wiremock::Request| {
                !String::from_utf8_lossy(&req.body).contains("previous answer")
            })
            .respond_with(reply("What time is check-in?"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("What time is check-in?");
        req.role = Some("guest".into());
        req.source_locale = Some("en".into());

        let outcome = translate(&http, &config, &req, None).await.expect("Should succeed");

        assert!(outcome.retried);
        assert_eq!(outcome.text, "チェックインは何時ですか？");
    }

    #[tokio::test]
    async fn test_retry_happens_at_most_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(reply("Still English"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("Hello");
        req.role = Some("guest".into());
        req.source_locale = Some("en".into());

        let outcome = translate(&http, &config, &req, None).await.expect("Should succeed");

        assert!(outcome.retried);
        assert_eq!(outcome.text, "Still English");
    }

    #[tokio::test]
    async fn test_undetermined_source_is_not_remembered() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("BCP-47"))
            .respond_with(reply("I am not sure"))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("front desk"))
            .respond_with(reply("はい"))
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let outcome = translate(&http, &config, &request("ok"), None)
            .await
            .expect("Should succeed");

        assert_eq!(outcome.role, Role::Guest);
        assert!(outcome.source_lang.is_undetermined());
        assert_eq!(outcome.remember_guest_lang, None);
    }

    #[tokio::test]
    async fn test_guest_writing_in_host_language_is_not_remembered() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("front desk"))
            .respond_with(reply("タオルを追加でお願いします。"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("タオルを追加でお願いします。");
        req.role = Some("guest".into());
        req.source_locale = Some("ja-JP".into());

        let outcome = translate(&http, &config, &req, None).await.expect("Should succeed");

        assert_eq!(outcome.role, Role::Guest);
        assert_eq!(outcome.remember_guest_lang, None);
    }

    #[tokio::test]
    async fn test_reply_cut_off_at_token_limit_is_an_error() {
        let mock_server = MockServer::start().await;

        let mut body = create_openai_response("Check-in starts at 3pm and");
        body["choices"][0]["finish_reason"] = serde_json::json!("length");
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "max_completion_tokens": TRANSLATION_MAX_TOKENS
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("チェックインは15時からです。");
        req.role = Some("host".into());

        let err = translate(&http, &config, &req, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Translation was cut off at the token limit");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(reply("x"))
            .expect(0)
            .mount(&mock_server)
            .await;

        let (http, mut config) = setup(&mock_server).await;
        config.openai_api_key = None;

        let err = translate(&http, &config, &request("Hello"), None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_upstream_error_is_propagated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let (http, config) = setup(&mock_server).await;
        let mut req = request("もちろんです。");
        req.role = Some("host".into());

        let err = translate(&http, &config, &req, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "overloaded");
    }
}
