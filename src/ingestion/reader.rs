//! PDF reading: one page of text per PDF page

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{Page, RawDocument};

/// Reads a document file into pages of text.
///
/// The session logic only depends on this trait, so tests can feed synthetic
/// documents without touching the filesystem.
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<RawDocument>;
}

/// PDF reader backed by lopdf, with a pdf-extract fallback for files whose
/// per-page extraction comes back blank.
#[derive(Debug, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }

    fn pages_via_lopdf(bytes: &[u8], filename: &str) -> Result<Vec<Page>> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| Error::document_read(filename, e.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = match document.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        filename = %filename,
                        page = page_no,
                        error = %e,
                        "page text extraction failed, keeping empty page"
                    );
                    String::new()
                }
            };
            pages.push(Page::new(page_no, text));
        }

        if pages.is_empty() {
            return Err(Error::document_read(filename, "document has no pages"));
        }
        Ok(pages)
    }

    /// Whole-document extraction; pdf-extract separates pages with form feeds.
    fn pages_via_pdf_extract(bytes: &[u8], filename: &str) -> Result<Vec<Page>> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::document_read(filename, e.to_string()))?;

        let pages: Vec<Page> = text
            .split('\u{0c}')
            .enumerate()
            .map(|(i, page_text)| Page::new(i as u32 + 1, page_text.to_string()))
            .collect();
        Ok(pages)
    }

    fn hash_bytes(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }
}

impl DocumentReader for PdfReader {
    fn read(&self, path: &Path) -> Result<RawDocument> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = std::fs::read(path)
            .map_err(|e| Error::document_read(&filename, e.to_string()))?;
        let content_hash = Self::hash_bytes(&bytes);

        let mut pages = Self::pages_via_lopdf(&bytes, &filename)?;

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            tracing::warn!(
                filename = %filename,
                "per-page extraction empty, trying whole-document fallback"
            );
            if let Ok(fallback) = Self::pages_via_pdf_extract(&bytes, &filename) {
                if fallback.iter().any(|p| !p.text.trim().is_empty()) {
                    pages = fallback;
                }
            }
        }

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(Error::document_read(&filename, "no extractable text"));
        }

        tracing::debug!(filename = %filename, pages = pages.len(), "document read");
        Ok(RawDocument {
            filename,
            content_hash,
            file_size: bytes.len() as u64,
            pages,
        })
    }
}
