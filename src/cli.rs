//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{CacheMode, CacheValidation, SummaryErrorPolicy};
use crate::pack::SizeUnit;

/// Top-level CLI parser for `codedigest`.
#[derive(Debug, Parser)]
#[command(
    name = "codedigest",
    version,
    about = "Summarize a source tree into size-bounded text chunks"
)]
pub struct Cli {
    /// Root folder to digest.
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Output directory (default: <ROOT>/.codedigest).
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Cache directory (default: <OUTPUT>/cache).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Source file extension to digest.
    #[arg(long, default_value = "cs")]
    pub extension: String,

    /// How the summary cache is used.
    #[arg(long, value_enum, default_value_t = CacheMode::Reuse)]
    pub cache: CacheMode,

    /// When a cached summary is still valid.
    #[arg(long, value_enum, default_value_t = CacheValidation::ContentHash)]
    pub cache_validation: CacheValidation,

    /// Maximum chunk length.
    #[arg(long, default_value_t = 8000)]
    pub chunk_limit: usize,

    /// Unit the chunk limit is measured in.
    #[arg(long, value_enum, default_value_t = SizeUnit::Chars)]
    pub size_unit: SizeUnit,

    /// Summarization model.
    #[arg(long, default_value = "claude-3-5-haiku-20241022")]
    pub model: String,

    /// Token cap for each method summary.
    #[arg(long, default_value_t = 100)]
    pub max_output_tokens: u32,

    /// Longest method text sent for summarization, in characters.
    #[arg(long, default_value_t = 12_000)]
    pub max_input_chars: usize,

    /// Retries for a failed summarization call.
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Initial retry delay in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub retry_backoff_ms: u64,

    /// Summarization request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Reaction to a failed method summary.
    #[arg(long, value_enum, default_value_t = SummaryErrorPolicy::FailFile)]
    pub on_summary_error: SummaryErrorPolicy,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
