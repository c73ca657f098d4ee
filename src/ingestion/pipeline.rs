//! Turns a read document into an ingested `Document` plus its chunks.
//!
//! Page texts are joined with [`PAGE_SEPARATOR`] into one stream per document
//! and chunk windows are cut from that stream; which pages a window spans is
//! recovered from recorded page offsets so citations can name them.

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, Document, RawDocument};

use super::chunker::TextChunker;

/// Separator inserted between consecutive page texts
pub const PAGE_SEPARATOR: &str = "\n";

/// One document after chunking, ready for embedding
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub chunks: Vec<Chunk>,
}

/// Concatenates and chunks one document at a time
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    chunker: TextChunker,
}

impl IngestPipeline {
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        Ok(Self {
            chunker: TextChunker::from_config(config)?,
        })
    }

    pub fn with_chunker(chunker: TextChunker) -> Self {
        Self { chunker }
    }

    /// Chunk one document. Fails when the document carries no text at all.
    pub fn process(&self, raw: &RawDocument) -> Result<IngestedDocument> {
        let (text, page_starts) = concatenate_pages(raw);

        let windows = self.chunker.chunk_windows(&text);
        if windows.is_empty() {
            return Err(Error::document_read(&raw.filename, "no text to chunk"));
        }

        let mut document =
            Document::new(raw.filename.clone(), raw.content_hash.clone(), raw.file_size);
        document.total_pages = raw.page_count();
        document.total_chunks = windows.len() as u32;

        let chunks = windows
            .into_iter()
            .enumerate()
            .map(|(i, window)| {
                let page_start = page_for_offset(&page_starts, window.char_start);
                let page_end = page_for_offset(&page_starts, window.char_end.saturating_sub(1));
                Chunk::new(
                    document.id,
                    window.text,
                    ChunkSource::new(raw.filename.clone(), page_start, page_end),
                    window.char_start,
                    window.char_end,
                    i as u32,
                )
            })
            .collect::<Vec<_>>();

        tracing::info!(
            filename = %raw.filename,
            pages = raw.pages.len(),
            chunks = chunks.len(),
            "document chunked"
        );

        Ok(IngestedDocument { document, chunks })
    }
}

/// Join page texts and record each page's first character offset
fn concatenate_pages(raw: &RawDocument) -> (String, Vec<(u32, usize)>) {
    let mut text = String::new();
    let mut page_starts = Vec::with_capacity(raw.pages.len());
    let mut offset = 0usize;

    for (i, page) in raw.pages.iter().enumerate() {
        if i > 0 {
            text.push_str(PAGE_SEPARATOR);
            offset += PAGE_SEPARATOR.chars().count();
        }
        page_starts.push((page.number, offset));
        text.push_str(&page.text);
        offset += page.text.chars().count();
    }

    (text, page_starts)
}

/// Page containing the given character offset (last page starting at or
/// before it). Page starts are ascending; the first entry starts at 0.
fn page_for_offset(page_starts: &[(u32, usize)], offset: usize) -> u32 {
    let idx = page_starts.partition_point(|&(_, start)| start <= offset);
    page_starts[idx.saturating_sub(1)].0
}
