//! Live adapter for the `LlmClient` port using the Anthropic messages API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::DigestError;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Live LLM client that calls the Anthropic Claude API.
pub struct LiveLlmClient {
    client: Client,
    api_key: String,
}

impl LiveLlmClient {
    /// Creates a client authenticating with `api_key`, giving up on any
    /// request after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Configuration`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, DigestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DigestError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_key: api_key.to_string() })
    }
}

/// Request body sent to the Anthropic messages API.
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

/// A single message in the Anthropic API request.
#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Top-level response from the Anthropic messages API.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

/// A content block in the Anthropic response.
#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Token usage reported by the Anthropic API.
#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Error response from the Anthropic API.
#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

/// Detail inside an Anthropic error response.
#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

impl LiveLlmClient {
    async fn send(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, Box<dyn std::error::Error + Send + Sync>> {
        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: request.system.as_deref(),
            messages: vec![AnthropicMessage { role: "user", content: &request.prompt }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Anthropic API request failed: {e}"))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read Anthropic API response: {e}"))?;

        if !status.is_success() {
            let msg = serde_json::from_str::<AnthropicError>(&response_text)
                .map(|e| e.error.message)
                .unwrap_or(response_text);
            return Err(format!("Anthropic API error ({}): {msg}", status.as_u16()).into());
        }

        let api_response: AnthropicResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("Failed to parse Anthropic API response: {e}"))?;

        let text = api_response.content.into_iter().map(|block| block.text).collect::<String>();

        Ok(CompletionResponse {
            text,
            prompt_tokens: api_response.usage.input_tokens,
            completion_tokens: api_response.usage.output_tokens,
        })
    }
}

impl LlmClient for LiveLlmClient {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        Box::pin(self.send(request.clone()))
    }
}
