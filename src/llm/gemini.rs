//! Google Gemini API client
//!
//! Issues `generateContent` calls with fixed generation parameters. The
//! account's proxy is threaded into the HTTP client for each call; nothing
//! here touches process-wide state, so concurrent flows with different
//! proxies cannot clobber each other.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use super::LlmError;
use crate::account::Proxy;
use crate::config::LlmConfig;

const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 0.95;
const TOP_K: u32 = 40;

/// Advisory shown when the key's quota or billing is exhausted
const QUOTA_ADVISORY: &str = "Your Gemini API key has no remaining quota.";

/// Advisory shown when the service rate-limits the key
const RATE_LIMIT_ADVISORY: &str = "Gemini rate limit reached, please try again later.";

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key =
            std::env::var(&config.api_key_env).map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            max_output_tokens: config.max_output_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Build an HTTP client, routing through the proxy when one is given
    fn http_client(&self, proxy: Option<&Proxy>) -> Result<Client, LlmError> {
        let mut builder = Client::builder().timeout(self.timeout);

        if let Some(proxy) = proxy {
            debug!(proxy = %proxy, "Routing request through proxy");
            let proxy = reqwest::Proxy::all(proxy.url()).map_err(|e| LlmError::BadProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(LlmError::Network)
    }

    /// Build the request body for the generateContent call
    ///
    /// The system prompt rides as a preliminary user message, followed by
    /// the user message proper.
    fn build_request_body(&self, system_prompt: &str, user_message: &str) -> serde_json::Value {
        let mut contents = Vec::new();

        if !system_prompt.is_empty() {
            contents.push(serde_json::json!({
                "role": "user",
                "parts": [{ "text": system_prompt }],
            }));
        }

        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{ "text": user_message }],
        }));

        serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": TEMPERATURE,
                "topP": TOP_P,
                "topK": TOP_K,
                "maxOutputTokens": self.max_output_tokens,
            },
        })
    }

    /// Issue a completion call, returning the generated text
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        proxy: Option<&Proxy>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = self.build_request_body(system_prompt, user_message);

        let http = self.http_client(proxy)?;
        let response = http
            .post(url)
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status, "Gemini API error");
            return Err(LlmError::Api { status, message });
        }

        let api_response: GeminiResponse = response.json().await.map_err(LlmError::Network)?;

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse("no text in response".to_string()));
        }

        Ok(text)
    }

    /// Completion call that never errors: `(success, text-or-advisory)`
    ///
    /// Failures are classified by message substring into a small fixed set
    /// of advisory strings, with a generic fallback embedding the raw error.
    pub async fn ask(&self, system_prompt: &str, user_message: &str, proxy: Option<&Proxy>) -> (bool, String) {
        match self.complete(system_prompt, user_message, proxy).await {
            Ok(text) => (true, text),
            Err(err) => {
                let message = err.to_string();
                error!(error = %message, "Gemini request failed");
                (false, classify_error(&message))
            }
        }
    }
}

/// Map an error message onto a user-facing advisory
fn classify_error(message: &str) -> String {
    let lower = message.to_lowercase();

    if lower.contains("quota") || lower.contains("billing") {
        return QUOTA_ADVISORY.to_string();
    }

    if lower.contains("rate") && lower.contains("limit") {
        return RATE_LIMIT_ADVISORY.to_string();
    }

    format!("Gemini error occurred: {}", message)
}

// Gemini API response types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}
