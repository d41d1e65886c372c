//! Replay integration test.
//!
//! Proves that a digest run is reproducible from a cassette:
//! 1. Record LLM replies and a clock reading with `CassetteRecorder`.
//! 2. Run the pipeline over a real C# tree with `ServiceContext::replaying()`.
//! 3. Assert the chunk text and manifest match the recorded replies.
//! 4. Replay a second time and assert byte-identical artifacts.
//!
//! A second test captures a cassette through `ServiceContext::record_to`
//! and replays it with the cache enabled.

use std::path::Path;

use serde_json::json;

use codedigest::cassette::format::Cassette;
use codedigest::cassette::recorder::CassetteRecorder;
use codedigest::config::{CacheMode, DigestConfig};
use codedigest::context::ServiceContext;
use codedigest::pipeline::Pipeline;
use codedigest::ports::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

const CALCULATOR: &str = r"using System;

namespace Demo
{
    public class Calculator
    {
        private int last;

        public int Add(int a, int b) { return a + b; }

        public int Sub(int a, int b)
        {
            return a - b;
        }
    }
}
";

fn completion(text: &str) -> serde_json::Value {
    json!({"Ok": {"text": text, "prompt_tokens": 40, "completion_tokens": 6}})
}

fn record_cassette(path: &Path) {
    let mut recorder = CassetteRecorder::new(path, "calculator-digest", "abc123");
    recorder.record("llm", "complete", json!({"prompt": "Add"}), completion("Adds two integers"));
    recorder.record("llm", "complete", json!({"prompt": "Sub"}), completion("Subtracts b from a,"));
    recorder.record("clock", "now", json!({}), json!("2025-03-15T14:30:00Z"));
    recorder.finish().expect("recording should succeed");
}

async fn replay(root: &Path, cassette: &Path) -> (String, String) {
    let ctx = ServiceContext::replaying(cassette).unwrap();
    let mut config = DigestConfig::for_root(root);
    config.cache_mode = CacheMode::Off;

    let report = Pipeline::new(&ctx, &config).run().await.unwrap();
    assert_eq!(report.files, 1);
    assert_eq!(report.failed, 0);

    let out = root.join(".codedigest");
    let chunk = std::fs::read_to_string(out.join("chunks/chunk-0000.txt")).unwrap();
    let manifest = std::fs::read_to_string(out.join("digest.json")).unwrap();
    (chunk, manifest)
}

#[tokio::test]
async fn replayed_digest_is_deterministic() {
    let dir = std::env::temp_dir().join("codedigest_record_replay_test");
    let _ = std::fs::remove_dir_all(&dir);
    let root = dir.join("project");
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("src/Calculator.cs"), CALCULATOR).unwrap();
    std::fs::write(root.join("README.md"), "# Demo").unwrap();
    let cassette = dir.join("calculator.cassette.yaml");
    record_cassette(&cassette);

    let (chunk1, manifest1) = replay(&root, &cassette).await;
    assert_eq!(
        chunk1,
        "File: src/Calculator.cs\n\
         Namespace: Demo\n\
         Class: Calculator\n\
         Field: last (int)\n\
         Method: Add - Adds two integers.\n\
         Method: Sub - Subtracts b from a.\n"
    );
    assert!(manifest1.contains("2025-03-15T14:30:00Z"));

    let (chunk2, manifest2) = replay(&root, &cassette).await;
    assert_eq!(chunk1, chunk2, "determinism: chunk text differs between replays");
    assert_eq!(manifest1, manifest2, "determinism: manifest differs between replays");

    let _ = std::fs::remove_dir_all(&dir);
}

/// Answers from the method body so the recording needs no network.
struct BodyLlm;

impl LlmClient for BodyLlm {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        let text = if request.prompt.contains("a + b") { "Adds two integers" } else { "Subtracts" };
        Box::pin(async move {
            Ok(CompletionResponse { text: text.into(), prompt_tokens: 40, completion_tokens: 3 })
        })
    }
}

fn artifacts(root: &Path) -> (String, String) {
    let out = root.join(".codedigest");
    (
        std::fs::read_to_string(out.join("chunks/chunk-0000.txt")).unwrap(),
        std::fs::read_to_string(out.join("digest.json")).unwrap(),
    )
}

#[tokio::test]
async fn recorded_session_replays_with_cache_enabled() {
    let dir = std::env::temp_dir().join("codedigest_record_then_replay_test");
    let _ = std::fs::remove_dir_all(&dir);
    let root = dir.join("project");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("Calculator.cs"), CALCULATOR).unwrap();
    let cassette = dir.join("session.cassette.yaml");

    let mut config = DigestConfig::for_root(&root);
    config.api_key = "sk-unused".into();
    {
        let mut ctx = ServiceContext::live(&config).unwrap();
        ctx.llm = Box::new(BodyLlm);
        let ctx = ctx.record_to(&cassette);
        let report = Pipeline::new(&ctx, &config).run().await.unwrap();
        assert_eq!(report.failed, 0);
    }
    let recorded = artifacts(&root);

    let session = Cassette::load(&cassette).unwrap();
    assert_eq!(session.count("llm"), 2);
    // One reading for the cache record, one for the manifest.
    assert_eq!(session.count("clock"), 2);

    std::fs::remove_dir_all(root.join(".codedigest")).unwrap();
    let ctx = ServiceContext::replaying(&cassette).unwrap();
    let report = Pipeline::new(&ctx, &config).run().await.unwrap();
    assert_eq!(report.failed, 0);
    assert_eq!(report.reused, 0);

    let replayed = artifacts(&root);
    assert_eq!(recorded, replayed);
    assert!(replayed.0.contains("Method: Add - Adds two integers.\n"));

    let _ = std::fs::remove_dir_all(&dir);
}
