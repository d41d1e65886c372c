//! Natural-language summaries of method bodies via the LLM port.

pub mod normalize;

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SummarizerConfig;
use crate::error::DigestError;
use crate::ports::llm::{CompletionRequest, LlmClient};

pub use normalize::normalize;

/// System instruction sent with every method.
pub const SYSTEM_PROMPT: &str = "Summarize what the following method does in one short \
    sentence, minimizing length while preserving accuracy. Reply with the summary only.";

/// Builds bounded requests for method bodies and normalizes the replies.
pub struct Summarizer<'a> {
    llm: &'a dyn LlmClient,
    config: &'a SummarizerConfig,
}

impl<'a> Summarizer<'a> {
    /// Creates a summarizer over the given client and options.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient, config: &'a SummarizerConfig) -> Self {
        Self { llm, config }
    }

    /// Builds the completion request for one method's source text.
    #[must_use]
    pub fn request_for(&self, source: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: truncate_chars(source, self.config.max_input_chars).to_string(),
            max_tokens: self.config.max_output_tokens,
        }
    }

    /// Describes the method `identifier` whose full text is `source`.
    ///
    /// Failed calls are retried with exponential backoff as configured.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Summarization`] when every attempt fails or the
    /// reply is empty.
    pub async fn describe(&self, identifier: &str, source: &str) -> Result<String, DigestError> {
        let request = self.request_for(source);
        let mut delay = Duration::from_millis(self.config.retry_backoff_ms);
        let mut attempt = 0;

        loop {
            debug!(method = identifier, attempt, "requesting method summary");
            match self.attempt(identifier, &request).await {
                Ok(summary) => return Ok(summary),
                Err(err) if attempt < self.config.retries => {
                    warn!(method = identifier, attempt, error = %err, "summary failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt(
        &self,
        identifier: &str,
        request: &CompletionRequest,
    ) -> Result<String, DigestError> {
        let response = self
            .llm
            .complete(request)
            .await
            .map_err(|e| DigestError::summarization(identifier, e.to_string()))?;

        let budget = usize::try_from(self.config.max_output_tokens).unwrap_or(usize::MAX);
        let summary = normalize(&response.text, budget);
        if summary.is_empty() {
            return Err(DigestError::summarization(identifier, "empty reply"));
        }
        Ok(summary)
    }
}

/// Returns at most `max` characters of `text`, cut on a character boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
