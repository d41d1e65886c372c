//! Run configuration, built once from CLI arguments and the environment.

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::cli::Cli;
use crate::error::DigestError;
use crate::pack::SizeUnit;

/// Environment variable holding the summarization service credential.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Default output directory name, created under the root folder.
pub const DEFAULT_OUTPUT_DIR: &str = ".codedigest";

/// How the summary cache is used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CacheMode {
    /// Consult existing records and store new ones.
    #[default]
    Reuse,
    /// Clear the cache at start, then store new records.
    Fresh,
    /// Neither read nor write the cache.
    Off,
}

/// When a cached record may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CacheValidation {
    /// Only when the file's SHA-256 matches the recorded hash.
    #[default]
    ContentHash,
    /// Whenever a record exists, even if the source changed since.
    Existence,
}

/// What to do when a method summary cannot be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SummaryErrorPolicy {
    /// Replace the whole file's summary with a diagnostic line and continue.
    #[default]
    FailFile,
    /// Keep the method with a placeholder description.
    Placeholder,
    /// Stop the run; files already written are kept.
    Abort,
}

/// Options for the summarization service adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizerConfig {
    /// Remote model identifier.
    pub model: String,
    /// Caps the remote response length; also the normalization budget.
    pub max_output_tokens: u32,
    /// Method text beyond this many characters is cut before sending.
    pub max_input_chars: usize,
    /// Extra attempts after a failed call.
    pub retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_backoff_ms: u64,
    /// Remote call timeout.
    pub request_timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-20241022".to_string(),
            max_output_tokens: 100,
            max_input_chars: 12_000,
            retries: 0,
            retry_backoff_ms: 500,
            request_timeout_secs: 60,
        }
    }
}

/// Everything one digest run needs.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Folder whose source files are digested.
    pub root: PathBuf,
    /// Source file extension, without the dot.
    pub extension: String,
    /// Where summaries, chunks, and the manifest are written.
    pub output_dir: PathBuf,
    /// Where cache records live.
    pub cache_dir: PathBuf,
    /// Cache usage for this run.
    pub cache_mode: CacheMode,
    /// Cache reuse rule.
    pub cache_validation: CacheValidation,
    /// Maximum chunk length in `size_unit`.
    pub chunk_limit: usize,
    /// Unit chunk lengths are measured in.
    pub size_unit: SizeUnit,
    /// Summarization service options.
    pub summarizer: SummarizerConfig,
    /// Reaction to a failed method summary.
    pub on_summary_error: SummaryErrorPolicy,
    /// Summarization service credential.
    pub api_key: String,
}

impl DigestConfig {
    /// Builds a config rooted at `root` with default options and no credential.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let output_dir = root.join(DEFAULT_OUTPUT_DIR);
        Self {
            cache_dir: output_dir.join("cache"),
            output_dir,
            root,
            extension: "cs".to_string(),
            cache_mode: CacheMode::default(),
            cache_validation: CacheValidation::default(),
            chunk_limit: 8000,
            size_unit: SizeUnit::default(),
            summarizer: SummarizerConfig::default(),
            on_summary_error: SummaryErrorPolicy::default(),
            api_key: String::new(),
        }
    }

    /// Resolves the config from parsed arguments, looking up the credential
    /// with `lookup_env`.
    ///
    /// Checks run in order: root given, root is an existing directory,
    /// options valid, credential present. Nothing under the root is read.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Configuration`] on the first failed check.
    pub fn resolve(
        cli: &Cli,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DigestError> {
        let root = cli
            .root
            .as_deref()
            .ok_or_else(|| DigestError::Configuration("no root folder given".into()))?;
        check_root(root)?;

        if cli.chunk_limit == 0 {
            return Err(DigestError::Configuration("--chunk-limit must be positive".into()));
        }
        if cli.max_output_tokens == 0 {
            return Err(DigestError::Configuration("--max-output-tokens must be positive".into()));
        }

        let api_key = lookup_env(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DigestError::Configuration(format!("{API_KEY_VAR} is not set")))?;

        let mut config = Self::for_root(root);
        if let Some(output) = &cli.output {
            config.output_dir.clone_from(output);
            config.cache_dir = output.join("cache");
        }
        if let Some(cache_dir) = &cli.cache_dir {
            config.cache_dir.clone_from(cache_dir);
        }
        config.extension = cli.extension.trim_start_matches('.').to_string();
        config.cache_mode = cli.cache;
        config.cache_validation = cli.cache_validation;
        config.chunk_limit = cli.chunk_limit;
        config.size_unit = cli.size_unit;
        config.on_summary_error = cli.on_summary_error;
        config.summarizer = SummarizerConfig {
            model: cli.model.clone(),
            max_output_tokens: cli.max_output_tokens,
            max_input_chars: cli.max_input_chars,
            retries: cli.retries,
            retry_backoff_ms: cli.retry_backoff_ms,
            request_timeout_secs: cli.timeout_secs,
        };
        config.api_key = api_key;
        Ok(config)
    }
}

fn check_root(root: &Path) -> Result<(), DigestError> {
    if !root.exists() {
        return Err(DigestError::Configuration(format!(
            "root folder {} does not exist",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(DigestError::Configuration(format!(
            "root folder {} is not a directory",
            root.display()
        )));
    }
    Ok(())
}
