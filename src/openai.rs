use crate::config::Config;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// First choice of a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// The model stopped at `max_completion_tokens` (`finish_reason: "length"`)
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// Extract a readable message from an upstream error body.
///
/// OpenAI errors look like `{"error": {"message": "..."}}`; anything else is
/// returned as-is, or replaced by the status line when empty.
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.trim().is_empty() {
            return envelope.error.message;
        }
    }
    let body = body.trim();
    if body.is_empty() {
        format!("OpenAI API error ({})", status)
    } else {
        body.to_string()
    }
}

/// Thin client for the chat completions endpoint.
///
/// Borrows the shared `reqwest::Client` and config; one is built per request.
pub struct ChatClient<'a> {
    http: &'a reqwest::Client,
    config: &'a Config,
    api_key: &'a str,
}

impl<'a> ChatClient<'a> {
    /// Fails with `MissingApiKey` when the server has no OpenAI key.
    pub fn new(http: &'a reqwest::Client, config: &'a Config) -> Result<Self, ApiError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or(ApiError::MissingApiKey)?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Run one system/user exchange and return the trimmed first choice.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<Completion, ApiError> {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.config.openai_model);

        let request = ChatRequest {
            model: self.config.openai_model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { max_tokens },
            temperature: if is_reasoning {
                None
            } else {
                Some(self.config.openai_temperature)
            },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        };

        debug!(
            "Calling {} (model {}, {} prompt chars)",
            self.config.openai_api_url,
            self.config.openai_model,
            system_prompt.len() + user_prompt.len()
        );

        let response = self
            .http
            .post(&self.config.openai_api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(status, &body),
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to parse OpenAI response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| Completion {
                text: c.message.content.trim().to_string(),
                truncated: c.finish_reason.as_deref() == Some("length"),
            })
            .ok_or_else(|| ApiError::Upstream {
                status: 502,
                message: "OpenAI response contained no choices".to_string(),
            })
    }
}
