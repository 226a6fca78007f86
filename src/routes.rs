use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::ApiError;
use crate::i18n::LocaleRegistry;
use crate::security::is_authorized;
use crate::session::{guest_lang_cookie, read_guest_lang};
use crate::translation::{translate, TranslateRequest};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Diagnostics
        .route("/api/ping", get(ping))
        .route("/api/translate", get(translate_info).post(translate_handler))
        // Locale picker data
        .route("/api/locales", get(list_locales))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "route": "/api/ping",
        "env": state.config.environment,
        "commit": state.config.commit,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn translate_info() -> Json<Value> {
    Json(json!({
        "ok": true,
        "endpoint": "/api/translate",
    }))
}

async fn list_locales(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "hostLang": state.config.host_lang,
        "locales": LocaleRegistry::get().list_all(),
    }))
}

/// `POST /api/translate`
///
/// The body is read raw and parsed here so that malformed JSON gets the same
/// `{ ok: false, error }` shape as every other failure.
async fn translate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !is_authorized(&headers, state.config.api_key.as_deref()) {
        return Err(ApiError::Unauthorized);
    }

    let request: TranslateRequest = serde_json::from_slice(&body)?;
    let cookie_lang = read_guest_lang(&headers);

    let outcome = translate(&state.http, &state.config, &request, cookie_lang).await?;

    let body = Json(json!({
        "ok": true,
        "text": outcome.text,
        "role": outcome.role,
        "sourceLang": outcome.source_lang,
        "targetLang": outcome.target_lang,
        "tone": outcome.tone,
        "retried": outcome.retried,
    }));

    match &outcome.remember_guest_lang {
        Some(tag) => Ok((
            [(header::SET_COOKIE, guest_lang_cookie(tag, state.config.cookie_secure))],
            body,
        )
            .into_response()),
        None => Ok(body.into_response()),
    }
}
