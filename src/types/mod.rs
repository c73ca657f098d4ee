//! Core types for the QA pipeline

pub mod conversation;
pub mod document;

pub use conversation::{ChatTurn, Role};
pub use document::{Chunk, ChunkSource, Document, Page, RawDocument};
