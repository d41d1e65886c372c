//! Replaying adapter for the `LlmClient` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

/// Serves recorded LLM completions from a cassette.
pub struct ReplayingLlmClient {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> LlmFuture<'_> {
        let output = next_output(&self.replayer, "llm", "complete");
        Box::pin(async move { replay_result::<CompletionResponse>(output) })
    }
}
