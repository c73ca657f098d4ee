//! Fixed-size overlapping text chunking.
//!
//! Windows are exact character slices: no boundary snapping, so the original
//! text can always be rebuilt from the chunks by stripping the known overlap.

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};

/// A chunk window with its character offsets in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct TextWindow {
    pub text: String,
    /// Offsets in characters (not bytes), end exclusive
    pub char_start: usize,
    pub char_end: usize,
}

/// Splits text into overlapping fixed-size character windows
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into windows of exactly `chunk_size` characters (the last
    /// may be shorter), consecutive windows sharing exactly `chunk_overlap`
    /// characters. Empty text yields no windows.
    pub fn chunk_windows(&self, text: &str) -> Vec<TextWindow> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let stride = self.chunk_size - self.chunk_overlap;
        let mut windows = Vec::new();
        let mut start = 0usize;

        loop {
            let end = usize::min(start + self.chunk_size, chars.len());
            windows.push(TextWindow {
                text: chars[start..end].iter().collect(),
                char_start: start,
                char_end: end,
            });
            if end == chars.len() {
                break;
            }
            start += stride;
        }

        windows
    }

    /// Window texts only
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.chunk_windows(text)
            .into_iter()
            .map(|w| w.text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    /// Rebuild the original text: first chunk whole, then each subsequent
    /// chunk minus the leading overlap characters.
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                out.extend(chunk.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(10, 2).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn short_text_yields_single_identical_chunk() {
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.chunk("short text");
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn all_chunks_except_last_have_exact_size() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk("abcdefghij");
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(char_len(chunk), 4);
        }
        assert!(char_len(chunks.last().unwrap()) <= 4);
    }

    #[test]
    fn consecutive_chunks_share_exact_overlap() {
        let chunker = TextChunker::new(5, 2).unwrap();
        let chunks = chunker.chunk("the quick brown fox jumps");
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(char_len(&pair[0]) - 2).collect();
            let head: String = pair[1].chars().take(2).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn reconstruction_property() {
        let texts = [
            "abcdefghijklmnopqrstuvwxyz",
            "the quick brown fox jumps over the lazy dog",
            "a",
            "ten__chars",
        ];
        let configs = [(4usize, 1usize), (5, 2), (7, 0), (10, 9), (3, 1)];

        for text in texts {
            for (size, overlap) in configs {
                let chunker = TextChunker::new(size, overlap).unwrap();
                let chunks = chunker.chunk(text);
                assert_eq!(
                    reconstruct(&chunks, overlap),
                    text,
                    "size={size} overlap={overlap}"
                );
            }
        }
    }

    #[test]
    fn reconstruction_with_multibyte_text() {
        let text = "héllo wörld, naïve café résumé, 日本語のテキスト, emoji 🙂🚀 end";
        for (size, overlap) in [(4usize, 1usize), (6, 3), (9, 2)] {
            let chunker = TextChunker::new(size, overlap).unwrap();
            let chunks = chunker.chunk(text);
            assert_eq!(
                reconstruct(&chunks, overlap),
                text,
                "size={size} overlap={overlap}"
            );
        }
    }

    #[test]
    fn window_offsets_are_consistent() {
        let chunker = TextChunker::new(6, 2).unwrap();
        let windows = chunker.chunk_windows("abcdefghijklmnopqrst");
        for window in &windows {
            assert_eq!(window.char_end - window.char_start, char_len(&window.text));
        }
        for pair in windows.windows(2) {
            assert_eq!(pair[1].char_start, pair[0].char_end - 2);
        }
        assert_eq!(windows.first().unwrap().char_start, 0);
        assert_eq!(windows.last().unwrap().char_end, 20);
    }

    #[test]
    fn zero_overlap_partitions_text() {
        let chunker = TextChunker::new(3, 0).unwrap();
        let chunks = chunker.chunk("abcdefgh");
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn invalid_configurations_rejected() {
        assert!(matches!(TextChunker::new(0, 0), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(10, 10), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(10, 15), Err(Error::Config(_))));
    }
}
