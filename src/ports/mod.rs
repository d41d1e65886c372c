//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system (time, LLM, filesystem, source parser).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod llm;
pub mod parser;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};
pub use parser::DeclarationParser;
