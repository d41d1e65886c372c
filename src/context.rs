//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::llm::LiveLlmClient;
use crate::adapters::live::parser::CSharpParser;
use crate::adapters::recording::clock::RecordingClock;
use crate::adapters::recording::llm::RecordingLlmClient;
use crate::adapters::replaying::{ReplayingClock, ReplayingLlmClient};
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::DigestConfig;
use crate::error::DigestError;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};
use crate::ports::parser::DeclarationParser;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Filesystem for discovery, cache records, and digest output.
    pub fs: Box<dyn FileSystem>,
    /// LLM client for method summaries.
    pub llm: Box<dyn LlmClient>,
    /// Clock for timestamps.
    pub clock: Box<dyn Clock>,
    /// Parser producing declaration trees.
    pub parser: Box<dyn DeclarationParser>,
    /// Optional cassette recorder; written to disk on drop.
    pub(crate) recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a live context: real disk, system clock, the C# parser, and
    /// the remote LLM configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Configuration`] if the HTTP client cannot be built.
    pub fn live(config: &DigestConfig) -> Result<Self, DigestError> {
        Ok(Self {
            fs: Box::new(LiveFileSystem),
            llm: Box::new(LiveLlmClient::new(
                &config.api_key,
                config.summarizer.request_timeout_secs,
            )?),
            clock: Box::new(LiveClock),
            parser: Box::new(CSharpParser),
            recorder: None,
        })
    }

    /// Creates a live context whose LLM and clock interactions are recorded
    /// to a cassette at `path` when the context is dropped.
    ///
    /// This is the developer-only mechanism for capturing cassettes via the
    /// `CODEDIGEST_RECORD` env var.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Configuration`] if the HTTP client cannot be built.
    pub fn recording(path: &Path, config: &DigestConfig) -> Result<Self, DigestError> {
        Ok(Self::live(config)?.record_to(path))
    }

    /// Wraps this context's LLM and clock so every call they serve is
    /// recorded. The cassette is written to `path` when the context is dropped.
    ///
    /// The ports recorded here are exactly the ports
    /// [`ServiceContext::replaying`] serves from a cassette.
    #[must_use]
    pub fn record_to(mut self, path: &Path) -> Self {
        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(path, "codedigest-session", "unknown")));
        let llm = std::mem::replace(&mut self.llm, Box::new(UnconfiguredLlm));
        self.llm = Box::new(RecordingLlmClient::new(llm, Arc::clone(&recorder)));
        let clock = std::mem::replace(&mut self.clock, Box::new(LiveClock));
        self.clock = Box::new(RecordingClock::new(clock, Arc::clone(&recorder)));
        self.recorder = Some(recorder);
        self
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// LLM completions and clock readings come from the cassette; the
    /// filesystem and parser stay live.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;

        // Each port gets its own replayer so per-port cursors are independent.
        Ok(Self {
            fs: Box::new(LiveFileSystem),
            llm: Box::new(ReplayingLlmClient::new(Arc::new(Mutex::new(CassetteReplayer::new(
                &cassette,
            ))))),
            clock: Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            parser: Box::new(CSharpParser),
            recorder: None,
        })
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        // Release the recording adapters' references first.
        self.llm = Box::new(UnconfiguredLlm);
        self.clock = Box::new(LiveClock);
        let finished = Arc::try_unwrap(recorder)
            .map_err(|_| "recorder still shared".to_string())
            .and_then(|m| m.into_inner().map_err(|e| e.to_string()))
            .and_then(|r| r.finish().map_err(|e| e.to_string()));
        match finished {
            Ok(path) => tracing::info!(path = %path.display(), "cassette written"),
            Err(e) => tracing::warn!("failed to write cassette: {e}"),
        }
    }
}

/// Stand-in LLM used while swapping adapters; fails every call.
struct UnconfiguredLlm;

impl LlmClient for UnconfiguredLlm {
    fn complete(&self, _request: &CompletionRequest) -> LlmFuture<'_> {
        Box::pin(async {
            let err: Box<dyn std::error::Error + Send + Sync> = "LLM client not configured".into();
            Err::<CompletionResponse, _>(err)
        })
    }
}
