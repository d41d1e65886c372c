//! Summary cache: per-file summaries persisted between runs.
//!
//! One YAML record per file key lives under the cache directory:
//!
//! ```text
//! <cache dir>/
//!   └── <first 16 hex chars of sha256(key)>.yaml
//! ```
//!
//! All I/O goes through `ctx.fs`, so the cache works against any
//! filesystem adapter.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{CacheMode, CacheValidation};
use crate::context::ServiceContext;
use crate::decl::FileSummary;
use crate::error::DigestError;

/// A persisted file summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// File identity the record belongs to.
    pub key: String,
    /// SHA-256 of the source text the summary was computed from.
    pub content_hash: String,
    /// When the record was written.
    pub stored_at: DateTime<Utc>,
    /// The summary, reused verbatim on a hit.
    pub summary: FileSummary,
}

/// Hex SHA-256 of `text`.
#[must_use]
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Keyed store of [`FileSummary`] records.
///
/// Access is single-threaded: the pipeline is the only writer and touches
/// each key at most once per run.
pub struct SummaryCache<'a> {
    ctx: &'a ServiceContext,
    dir: PathBuf,
    mode: CacheMode,
    validation: CacheValidation,
}

impl<'a> SummaryCache<'a> {
    /// Creates a cache rooted at `dir`.
    #[must_use]
    pub fn new(
        ctx: &'a ServiceContext,
        dir: &Path,
        mode: CacheMode,
        validation: CacheValidation,
    ) -> Self {
        Self { ctx, dir: dir.to_path_buf(), mode, validation }
    }

    /// Clears every record when the cache runs in [`CacheMode::Fresh`].
    ///
    /// Only record files are removed; anything else sharing the cache
    /// directory is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::CacheIo`] if the directory cannot be listed or
    /// a record cannot be removed.
    pub fn prepare(&self) -> Result<(), DigestError> {
        if self.mode != CacheMode::Fresh || !self.ctx.fs.is_dir(&self.dir) {
            return Ok(());
        }
        let clear_err = |e: Box<dyn std::error::Error + Send + Sync>| {
            DigestError::CacheIo(format!("failed to clear {}: {e}", self.dir.display()))
        };
        let names = self.ctx.fs.list_dir(&self.dir).map_err(clear_err)?;
        for name in names.iter().filter(|n| is_record_name(n)) {
            self.ctx.fs.remove_file(&self.dir.join(name)).map_err(clear_err)?;
        }
        Ok(())
    }

    /// Returns the cached summary for `key` if it may be reused for `text`.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::CacheIo`] if an existing record cannot be read
    /// or parsed.
    pub fn lookup(&self, key: &str, text: &str) -> Result<Option<FileSummary>, DigestError> {
        if self.mode != CacheMode::Reuse {
            return Ok(None);
        }
        let path = self.record_path(key);
        if !self.ctx.fs.exists(&path) {
            return Ok(None);
        }

        let contents = self
            .ctx
            .fs
            .read_to_string(&path)
            .map_err(|e| DigestError::CacheIo(format!("failed to read record for {key}: {e}")))?;
        let record: CacheRecord = serde_yaml::from_str(&contents)
            .map_err(|e| DigestError::CacheIo(format!("failed to parse record for {key}: {e}")))?;

        if record.key != key {
            return Ok(None);
        }
        let valid = match self.validation {
            CacheValidation::ContentHash => record.content_hash == content_hash(text),
            CacheValidation::Existence => true,
        };
        Ok(valid.then_some(record.summary))
    }

    /// Stores `summary` for `key`, replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::CacheIo`] if serialization or writing fails.
    pub fn store(&self, key: &str, text: &str, summary: &FileSummary) -> Result<(), DigestError> {
        if self.mode == CacheMode::Off {
            return Ok(());
        }
        let record = CacheRecord {
            key: key.to_string(),
            content_hash: content_hash(text),
            stored_at: self.ctx.clock.now(),
            summary: summary.clone(),
        };
        let yaml = serde_yaml::to_string(&record)
            .map_err(|e| DigestError::CacheIo(format!("failed to serialize record for {key}: {e}")))?;
        self.ctx
            .fs
            .write(&self.record_path(key), &yaml)
            .map_err(|e| DigestError::CacheIo(format!("failed to write record for {key}: {e}")))
    }

    fn record_path(&self, key: &str) -> PathBuf {
        let hash = content_hash(key);
        self.dir.join(format!("{}.yaml", &hash[..16]))
    }
}

/// Matches `<16 lowercase hex chars>.yaml`.
fn is_record_name(name: &str) -> bool {
    name.strip_suffix(".yaml").is_some_and(|stem| {
        stem.len() == 16 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    })
}
