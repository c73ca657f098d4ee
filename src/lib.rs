//! paperchat: retrieval-augmented question answering over local PDF documents
//!
//! Ingest PDFs, chunk and embed their text into a persistent vector index,
//! then chat with the collection: questions are answered by a local Ollama
//! model grounded in the most relevant chunks, with page-level citations.

pub mod answerer;
pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod session;
pub mod types;

pub use answerer::{Answer, Answerer};
pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::Citation;
pub use index::{LoadOptions, ScoredChunk, VectorIndex};
pub use session::{AskOutcome, IngestReport, SessionController};
pub use types::{Chunk, ChunkSource, Document, Page};
