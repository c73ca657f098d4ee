//! Document and chunk types with source tracking for citations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One page of extracted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number, 1-indexed
    pub number: u32,
    /// Extracted text; empty when the page had no extractable text
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: String) -> Self {
        Self { number, text }
    }
}

/// A document as it comes out of the reader, before chunking
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Original filename
    pub filename: String,
    /// Content hash for deduplication (sha256, hex)
    pub content_hash: String,
    /// File size in bytes
    pub file_size: u64,
    /// Pages in document order
    pub pages: Vec<Page>,
}

impl RawDocument {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// True when no page carries any text
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// A document that has been ingested into an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename
    pub filename: String,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Total number of pages
    pub total_pages: u32,
    /// Total number of chunks created
    pub total_chunks: u32,
    /// File size in bytes
    pub file_size: u64,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(filename: String, content_hash: String, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            content_hash,
            total_pages: 0,
            total_chunks: 0,
            file_size,
            ingested_at: chrono::Utc::now(),
        }
    }
}

/// Source information for a chunk (used for citations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Original filename (used in citations)
    pub filename: String,
    /// First page the chunk draws text from, 1-indexed
    pub page_start: u32,
    /// Last page the chunk draws text from, 1-indexed
    pub page_end: u32,
}

impl ChunkSource {
    pub fn new(filename: String, page_start: u32, page_end: u32) -> Self {
        Self {
            filename,
            page_start,
            page_end,
        }
    }

    /// Format source for display, e.g. `report.pdf, Page 3` or
    /// `report.pdf, Pages 3-4` when a chunk spans a page break
    pub fn format_citation(&self) -> String {
        if self.page_start == self.page_end {
            format!("{}, Page {}", self.filename, self.page_start)
        } else {
            format!("{}, Pages {}-{}", self.filename, self.page_start, self.page_end)
        }
    }
}

/// A chunk of text from a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Embedding vector; empty until the chunk is indexed
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    /// Source information for citations
    pub source: ChunkSource,
    /// Character position in the document's concatenated page text
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new, not yet embedded chunk
    pub fn new(
        document_id: Uuid,
        content: String,
        source: ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            embedding: Vec::new(),
            source,
            char_start,
            char_end,
            chunk_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_single_page() {
        let source = ChunkSource::new("report.pdf".into(), 3, 3);
        assert_eq!(source.format_citation(), "report.pdf, Page 3");
    }

    #[test]
    fn citation_page_span() {
        let source = ChunkSource::new("report.pdf".into(), 3, 5);
        assert_eq!(source.format_citation(), "report.pdf, Pages 3-5");
    }

    #[test]
    fn raw_document_emptiness() {
        let doc = RawDocument {
            filename: "blank.pdf".into(),
            content_hash: "deadbeef".into(),
            file_size: 10,
            pages: vec![Page::new(1, "  ".into()), Page::new(2, String::new())],
        };
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 2);
    }
}
