//! OpenRouter chat-completions client.
//!
//! One remote call per [`GenerationClient::generate`] invocation. Failures map
//! onto the distinct [`GenerationError`] kinds; the caller decides whether to
//! abort or continue a batch.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

use inkpress_shared::{
    GenerationError, OpenRouterConfig, PromptSpec, RawCompletion, Result, resolve_env_secret,
};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("Inkpress/", env!("CARGO_PKG_VERSION"));

/// Sampling temperature for blog generation.
const TEMPERATURE: f64 = 0.7;

/// Completion token cap per call.
const MAX_TOKENS: u32 = 2000;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

// ---------------------------------------------------------------------------
// GenerationClient
// ---------------------------------------------------------------------------

/// Client for the OpenRouter text-generation endpoint.
pub struct GenerationClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GenerationClient {
    /// Create a new generation client from config. Resolves the API key from
    /// the configured env var and fails early when it is missing.
    pub fn new(config: &OpenRouterConfig) -> Result<Self> {
        let api_key = resolve_env_secret(&config.api_key_env)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Run one generation call for the given prompt.
    ///
    /// Single attempt: a failed call is a terminal failure for this unit of
    /// work.
    #[instrument(skip_all, fields(model = %prompt.model))]
    pub async fn generate(&self, prompt: &PromptSpec) -> Result<RawCompletion> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": prompt.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        debug!(url = %url, "sending generation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Auth(format!(
                "HTTP {status}: {}",
                text.chars().take(200).collect::<String>()
            ))
            .into());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Network(format!(
                "HTTP {status}: {}",
                text.chars().take(200).collect::<String>()
            ))
            .into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|_| GenerationError::EmptyResponse)?;

        let text = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(GenerationError::EmptyResponse)?
            .to_string();

        let (tokens_in, tokens_out) = match &parsed.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => (None, None),
        };

        info!(
            chars = text.len(),
            tokens_in = tokens_in.unwrap_or(0),
            tokens_out = tokens_out.unwrap_or(0),
            "generation complete"
        );

        Ok(RawCompletion {
            text,
            model: parsed.model.unwrap_or_else(|| prompt.model.clone()),
            tokens_in,
            tokens_out,
        })
    }
}
