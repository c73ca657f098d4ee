//! Document ingestion: PDF reading and chunking

mod chunker;
mod pipeline;
mod reader;

pub use chunker::{TextChunker, TextWindow};
pub use pipeline::{IngestPipeline, IngestedDocument, PAGE_SEPARATOR};
pub use reader::{DocumentReader, PdfReader};
