//! In-memory test doubles shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::adapters::live::parser::CSharpParser;
use crate::context::ServiceContext;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

/// In-memory filesystem; clones share the same files.
#[derive(Clone, Default)]
pub(crate) struct MemFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MemFs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_files(files: &[(&str, &str)]) -> Self {
        let fs = Self::new();
        for (path, contents) in files {
            fs.write(Path::new(path), contents).unwrap();
        }
        fs
    }

    pub(crate) fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().unwrap();
        files.get(path).cloned().ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut files = self.files.lock().unwrap();
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|k| k.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut files = self.files.lock().unwrap();
        files.retain(|k, _| !k.starts_with(path));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}

/// Clock pinned to a single instant.
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Serves canned replies in order and counts calls; once the queue is
/// empty every reply is `"Does <prompt length> things"`.
pub(crate) struct CannedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
    pub(crate) prompts: Mutex<Vec<CompletionRequest>>,
}

impl CannedLlm {
    pub(crate) fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies.into_iter().map(|r| r.map(str::to_string).map_err(str::to_string)).collect(),
            ),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn echo() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for CannedLlm {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let reply = next.unwrap_or_else(|| Ok(format!("Does {} things", request.prompt.len())));
        Box::pin(async move {
            reply
                .map(|text| CompletionResponse { text, prompt_tokens: 10, completion_tokens: 5 })
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { e.into() })
        })
    }
}

/// Shares one [`CannedLlm`] between a context and the test body.
pub(crate) struct SharedLlm(pub(crate) Arc<CannedLlm>);

impl LlmClient for SharedLlm {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        self.0.complete(request)
    }
}

/// A context over `fs` with a fixed clock, an echoing LLM, and the C# parser.
pub(crate) fn test_context(fs: MemFs) -> ServiceContext {
    ServiceContext {
        fs: Box::new(fs),
        llm: Box::new(CannedLlm::echo()),
        clock: Box::new(FixedClock::default()),
        parser: Box::new(CSharpParser),
        recorder: None,
    }
}
