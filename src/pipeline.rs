//! End-to-end digest run: discover, summarize, cache, pack, write.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::SummaryCache;
use crate::config::{DigestConfig, SummaryErrorPolicy};
use crate::context::ServiceContext;
use crate::decl::visitor::DeclarationVisitor;
use crate::decl::{FileSummary, SourceUnit};
use crate::error::DigestError;
use crate::output::DigestWriter;
use crate::pack::{pack, Chunk};
use crate::summarize::Summarizer;

/// Directory names never descended into during discovery.
const SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// Counts describing one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestReport {
    /// Files discovered and summarized (including failures).
    pub files: usize,
    /// Chunks written.
    pub chunks: usize,
    /// Files served from the summary cache.
    pub reused: usize,
    /// Files that ended up as diagnostic summaries.
    pub failed: usize,
}

impl fmt::Display for DigestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files ({} cached, {} failed) packed into {} chunks",
            self.files, self.reused, self.failed, self.chunks
        )
    }
}

/// How a file's summary was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Cached,
    Computed,
    Failed,
}

/// Drives one digest run over a configured root folder.
pub struct Pipeline<'a> {
    ctx: &'a ServiceContext,
    config: &'a DigestConfig,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over the given context and configuration.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, config: &'a DigestConfig) -> Self {
        Self { ctx, config }
    }

    /// Runs the digest and returns what it did.
    ///
    /// Files are processed one at a time in lexical path order; each file's
    /// summary is written as soon as it is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Output`] when an artifact cannot be written,
    /// [`DigestError::Configuration`] when the root cannot be listed, and
    /// [`DigestError::Aborted`] when a summary fails under the abort policy.
    pub async fn run(&self) -> Result<DigestReport, DigestError> {
        let config = self.config;
        info!(root = %config.root.display(), output = %config.output_dir.display(), "starting digest");

        let cache = SummaryCache::new(
            self.ctx,
            &config.cache_dir,
            config.cache_mode,
            config.cache_validation,
        );
        if let Err(err) = cache.prepare() {
            warn!(error = %err, "continuing without clearing the cache");
        }
        let writer = DigestWriter::new(self.ctx, &config.output_dir);
        let summarizer = Summarizer::new(self.ctx.llm.as_ref(), &config.summarizer);
        let visitor = DeclarationVisitor::new(&summarizer, config.on_summary_error);

        let paths = self.discover()?;
        info!(files = paths.len(), "discovered source files");
        writer.clear_summaries()?;

        let mut report = DigestReport::default();
        let mut summaries = Vec::with_capacity(paths.len());
        for path in paths {
            let key = self.key_for(&path);
            let (summary, origin) = self.summarize_file(path, key, &cache, &visitor).await?;
            writer.write_file_summary(&summary)?;

            report.files += 1;
            match origin {
                Origin::Cached => report.reused += 1,
                Origin::Failed => report.failed += 1,
                Origin::Computed => {}
            }
            summaries.push(summary);
        }

        let chunks = pack_summaries(&summaries, config);
        writer.clear_chunks()?;
        for chunk in &chunks {
            writer.write_chunk(chunk, chunk.index)?;
        }
        writer.write_manifest(&summaries, chunks.len())?;
        report.chunks = chunks.len();

        info!(
            files = report.files,
            reused = report.reused,
            failed = report.failed,
            chunks = report.chunks,
            "digest complete"
        );
        Ok(report)
    }

    /// Lists source files under the root, recursively and in lexical order.
    ///
    /// Hidden directories, build output (`bin`, `obj`), and the digest's own
    /// output directory are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Configuration`] if the root cannot be listed.
    pub fn discover(&self) -> Result<Vec<PathBuf>, DigestError> {
        let root = &self.config.root;
        let entries = self.ctx.fs.list_dir(root).map_err(|e| {
            DigestError::Configuration(format!("cannot list {}: {e}", root.display()))
        })?;
        let mut out = Vec::new();
        self.walk(root, entries, &mut out);
        Ok(out)
    }

    fn walk(&self, dir: &Path, entries: Vec<String>, out: &mut Vec<PathBuf>) {
        for name in entries {
            let path = dir.join(&name);
            if self.ctx.fs.is_dir(&path) {
                if self.skip_dir(&name, &path) {
                    continue;
                }
                match self.ctx.fs.list_dir(&path) {
                    Ok(children) => self.walk(&path, children, out),
                    Err(err) => warn!(dir = %path.display(), error = %err, "skipping unreadable directory"),
                }
            } else if self.has_extension(&path) {
                out.push(path);
            }
        }
    }

    fn skip_dir(&self, name: &str, path: &Path) -> bool {
        name.starts_with('.')
            || SKIPPED_DIRS.contains(&name)
            || path == self.config.output_dir.as_path()
            || path == self.config.cache_dir.as_path()
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.config.extension))
    }

    /// Root-relative, `/`-separated identity of `path`.
    fn key_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.config.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    async fn summarize_file(
        &self,
        path: PathBuf,
        key: String,
        cache: &SummaryCache<'_>,
        visitor: &DeclarationVisitor<'_>,
    ) -> Result<(FileSummary, Origin), DigestError> {
        let text = match self.ctx.fs.read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %key, error = %err, "failed to read source file");
                let message = format!("failed to read {key}: {err}");
                return Ok((FileSummary::diagnostic(&key, &message), Origin::Failed));
            }
        };
        let unit = SourceUnit { path, key, text };

        match cache.lookup(&unit.key, &unit.text) {
            Ok(Some(summary)) => {
                debug!(file = %unit.key, "reusing cached summary");
                return Ok((summary, Origin::Cached));
            }
            Ok(None) => {}
            Err(err) => warn!(file = %unit.key, error = %err, "cache lookup failed"),
        }

        let roots = match self.ctx.parser.parse(&unit.path, &unit.text) {
            Ok(roots) => roots,
            Err(err) => {
                warn!(file = %unit.key, error = %err, "parse failed");
                return Ok((FileSummary::diagnostic(&unit.key, &err.to_string()), Origin::Failed));
            }
        };

        debug!(file = %unit.key, declarations = roots.len(), "summarizing file");
        let members = match visitor.visit_root(&roots).await {
            Ok(members) => members,
            Err(err) if self.config.on_summary_error == SummaryErrorPolicy::Abort => {
                return Err(DigestError::Aborted(Box::new(err)));
            }
            Err(err) => {
                warn!(file = %unit.key, error = %err, "summarization failed");
                return Ok((FileSummary::diagnostic(&unit.key, &err.to_string()), Origin::Failed));
            }
        };

        let summary = FileSummary { file: unit.key, members };
        if let Err(err) = cache.store(&summary.file, &unit.text, &summary) {
            warn!(file = %summary.file, error = %err, "cache store failed");
        }
        Ok((summary, Origin::Computed))
    }
}

/// Flattens summaries into one line list (a `File:` header before each
/// file's members) and packs it.
fn pack_summaries(summaries: &[FileSummary], config: &DigestConfig) -> Vec<Chunk> {
    let mut lines = Vec::new();
    for summary in summaries {
        lines.push(format!("File: {}", summary.file));
        lines.extend(summary.lines().map(str::to_string));
    }
    pack(&lines, config.chunk_limit, config.size_unit)
}
