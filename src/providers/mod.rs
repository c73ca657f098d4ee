//! Provider abstractions for embeddings and answer generation
//!
//! Trait seams keep the pipeline independent of the backing model server;
//! `OllamaClient` implements both against a local Ollama instance.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::OllamaClient;
