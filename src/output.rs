//! Digest writer: persists file summaries, chunks, and the run manifest.
//!
//! Uses the `FileSystem` port for all I/O. Directory layout:
//!
//! ```text
//! <output dir>/
//!   ├── summaries/<relative path>.txt
//!   ├── chunks/chunk-0000.txt
//!   └── digest.json
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ServiceContext;
use crate::decl::FileSummary;
use crate::error::DigestError;
use crate::pack::Chunk;

/// Top-level document written to `digest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// When the digest was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of chunk files written.
    pub chunk_count: usize,
    /// Every file summary in processing order.
    pub files: Vec<FileSummary>,
}

/// Writes digest artifacts under one output directory.
pub struct DigestWriter<'a> {
    ctx: &'a ServiceContext,
    root: PathBuf,
}

impl<'a> DigestWriter<'a> {
    /// Creates a writer rooted at the given output directory.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, root: &Path) -> Self {
        Self { ctx, root: root.to_path_buf() }
    }

    /// Removes chunk files left over from a previous run.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Output`] if the chunk directory cannot be removed.
    pub fn clear_chunks(&self) -> Result<(), DigestError> {
        self.clear("chunks")
    }

    /// Removes file summaries left over from a previous run, including those
    /// of source files that no longer exist.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Output`] if the summaries directory cannot be removed.
    pub fn clear_summaries(&self) -> Result<(), DigestError> {
        self.clear("summaries")
    }

    fn clear(&self, subdir: &str) -> Result<(), DigestError> {
        let dir = self.root.join(subdir);
        self.ctx
            .fs
            .remove_dir_all(&dir)
            .map_err(|e| DigestError::Output(format!("failed to clear {}: {e}", dir.display())))
    }

    /// Writes one file summary to `summaries/<file>.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Output`] if the file cannot be written.
    pub fn write_file_summary(&self, summary: &FileSummary) -> Result<PathBuf, DigestError> {
        let path = self.summary_path(&summary.file);
        self.write(&path, &summary.render())?;
        Ok(path)
    }

    /// Writes chunk `index` to `chunks/chunk-<index>.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Output`] if the file cannot be written.
    pub fn write_chunk(&self, chunk: &Chunk, index: usize) -> Result<PathBuf, DigestError> {
        let path = self.root.join("chunks").join(format!("chunk-{index:04}.txt"));
        let mut text = chunk.text();
        text.push('\n');
        self.write(&path, &text)?;
        Ok(path)
    }

    /// Writes `digest.json`, stamped with the context clock.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Output`] if serialization or writing fails.
    pub fn write_manifest(
        &self,
        files: &[FileSummary],
        chunk_count: usize,
    ) -> Result<PathBuf, DigestError> {
        let manifest =
            Manifest { generated_at: self.ctx.clock.now(), chunk_count, files: files.to_vec() };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| DigestError::Output(format!("failed to serialize manifest: {e}")))?;
        let path = self.root.join("digest.json");
        self.write(&path, &json)?;
        Ok(path)
    }

    fn summary_path(&self, file: &str) -> PathBuf {
        let mut path = self.root.join("summaries");
        for part in file.split('/').filter(|p| !p.is_empty() && *p != "..") {
            path.push(part);
        }
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".txt");
        path.set_file_name(name);
        path
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), DigestError> {
        self.ctx
            .fs
            .write(path, contents)
            .map_err(|e| DigestError::Output(format!("failed to write {}: {e}", path.display())))
    }
}
