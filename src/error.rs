//! Error kinds surfaced by the digest pipeline.

use thiserror::Error;

/// Main error type for digest operations.
///
/// Parse and cache errors are contained by the pipeline at file granularity;
/// configuration errors halt the run before any file is read.
#[derive(Debug, Error)]
pub enum DigestError {
    /// A source file could not be parsed into a declaration tree.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path of the offending file.
        path: String,
        /// What the parser reported.
        message: String,
    },

    /// The summarization service failed or returned an unusable reply.
    #[error("summarization failed for {subject}: {message}")]
    Summarization {
        /// The declaration being summarized.
        subject: String,
        /// Transport, status, or response-shape failure.
        message: String,
    },

    /// The summary cache could not be read or written.
    #[error("summary cache error: {0}")]
    CacheIo(String),

    /// Missing credential, missing root folder, or an invalid option.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Writing digest artifacts failed.
    #[error("output error: {0}")]
    Output(String),

    /// The run was stopped by the `abort` summary-error policy.
    #[error("run aborted: {0}")]
    Aborted(Box<DigestError>),
}

impl DigestError {
    /// Stable machine-readable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DigestError::Parse { .. } => "parse_failure",
            DigestError::Summarization { .. } => "summarization_failure",
            DigestError::CacheIo(_) => "cache_io_failure",
            DigestError::Configuration(_) => "configuration_failure",
            DigestError::Output(_) => "output_failure",
            DigestError::Aborted(_) => "aborted",
        }
    }

    pub(crate) fn summarization(subject: &str, message: impl Into<String>) -> Self {
        DigestError::Summarization { subject: subject.to_string(), message: message.into() }
    }
}
