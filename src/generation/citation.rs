//! Citation extraction and linking

use regex::Regex;
use uuid::Uuid;

use crate::index::ScoredChunk;

/// How much of a chunk survives into the displayed snippet
const SNIPPET_MAX_LEN: usize = 160;

/// A displayable citation tied back to its source chunk
#[derive(Debug, Clone)]
pub struct Citation {
    pub chunk_id: Uuid,
    pub filename: String,
    pub page_start: u32,
    pub page_end: u32,
    pub chunk_index: u32,
    pub snippet: String,
    pub similarity: f32,
}

impl Citation {
    pub fn from_hit(hit: &ScoredChunk) -> Self {
        Self {
            chunk_id: hit.chunk.id,
            filename: hit.chunk.source.filename.clone(),
            page_start: hit.chunk.source.page_start,
            page_end: hit.chunk.source.page_end,
            chunk_index: hit.chunk.chunk_index,
            snippet: truncate_snippet(&hit.chunk.content, SNIPPET_MAX_LEN),
            similarity: hit.similarity,
        }
    }

    /// e.g. `report.pdf, Page 3` or `report.pdf, Pages 3-5`
    pub fn format_source(&self) -> String {
        if self.page_start == self.page_end {
            format!("{}, Page {}", self.filename, self.page_start)
        } else {
            format!("{}, Pages {}-{}", self.filename, self.page_start, self.page_end)
        }
    }

    /// Source plus similarity, for display under an answer
    pub fn format_inline(&self) -> String {
        format!("{} (similarity {:.2})", self.format_source(), self.similarity)
    }
}

/// Link `[Source: ...]` markers in an answer back to the retrieved citations.
///
/// Returns the citations the answer actually references, each at most once.
/// An answer with no recognizable markers falls back to every available
/// citation, so the user always sees where the context came from.
pub fn link_citations(answer: &str, available: &[Citation]) -> Vec<Citation> {
    // Matches [Source: filename], [Source: filename, Page 3] and
    // [Source: filename, Pages 3-5]
    let citation_pattern = Regex::new(
        r"\[Source:\s*([^,\]]+)(?:,\s*Pages?\s*(\d+)(?:\s*-\s*(\d+))?)?\]",
    )
    .expect("Invalid regex");

    let mut linked: Vec<Citation> = Vec::new();

    for cap in citation_pattern.captures_iter(answer) {
        let filename = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let page_start: Option<u32> = cap.get(2).and_then(|m| m.as_str().parse().ok());
        let page_end: Option<u32> = cap.get(3).and_then(|m| m.as_str().parse().ok());

        if let Some(citation) = find_matching_citation(available, filename, page_start, page_end) {
            if !linked.iter().any(|c| c.chunk_id == citation.chunk_id) {
                linked.push(citation);
            }
        }
    }

    // No recognizable markers: show everything the answer was grounded on
    if linked.is_empty() {
        return available.to_vec();
    }

    linked
}

/// Find a citation matching the referenced filename and page range
fn find_matching_citation(
    citations: &[Citation],
    filename: &str,
    page_start: Option<u32>,
    page_end: Option<u32>,
) -> Option<Citation> {
    for citation in citations {
        let filename_matches = citation.filename.contains(filename)
            || filename.contains(&citation.filename)
            || filename.to_lowercase() == citation.filename.to_lowercase();

        if !filename_matches {
            continue;
        }

        match page_start {
            Some(start) => {
                let end = page_end.unwrap_or(start);
                // Cited range overlaps the chunk's page range
                if start <= citation.page_end && citation.page_start <= end {
                    return Some(citation.clone());
                }
            }
            None => return Some(citation.clone()),
        }
    }

    None
}

/// Truncate snippet to a maximum length while preserving word boundaries
pub fn truncate_snippet(snippet: &str, max_len: usize) -> String {
    if snippet.len() <= max_len {
        return snippet.to_string();
    }

    let mut end = max_len;
    while end > 0 && !snippet.is_char_boundary(end) {
        end -= 1;
    }

    if let Some(pos) = snippet[..end].rfind(' ') {
        return format!("{}...", &snippet[..pos]);
    }

    format!("{}...", &snippet[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(filename: &str, page_start: u32, page_end: u32) -> Citation {
        Citation {
            chunk_id: Uuid::new_v4(),
            filename: filename.to_string(),
            page_start,
            page_end,
            chunk_index: 0,
            snippet: String::new(),
            similarity: 0.5,
        }
    }

    #[test]
    fn linking_finds_cited_sources() {
        let available = vec![citation("report.pdf", 1, 1), citation("report.pdf", 2, 2)];
        let answer = "Revenue grew 12% [Source: report.pdf, Page 2].";

        let linked = link_citations(answer, &available);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].page_start, 2);
    }

    #[test]
    fn cited_page_matches_a_page_span() {
        let available = vec![citation("thesis.pdf", 3, 5)];
        let answer = "See the methodology [Source: thesis.pdf, Page 4].";

        let linked = link_citations(answer, &available);
        assert_eq!(linked.len(), 1);
    }

    #[test]
    fn page_span_marker_is_parsed() {
        let available = vec![citation("thesis.pdf", 3, 5), citation("thesis.pdf", 9, 9)];
        let answer = "Described across [Source: thesis.pdf, Pages 4-5].";

        let linked = link_citations(answer, &available);
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].page_start, 3);
    }

    #[test]
    fn unreferenced_answer_falls_back_to_all_sources() {
        let available = vec![citation("a.pdf", 1, 1), citation("b.pdf", 2, 2)];
        let answer = "An answer with no markers at all.";

        let linked = link_citations(answer, &available);
        assert_eq!(linked.len(), 2);
    }

    #[test]
    fn duplicate_references_link_once() {
        let available = vec![citation("a.pdf", 1, 1)];
        let answer = "First [Source: a.pdf, Page 1], and again [Source: a.pdf, Page 1].";

        let linked = link_citations(answer, &available);
        assert_eq!(linked.len(), 1);
    }

    #[test]
    fn test_truncate_snippet() {
        let snippet = "This is a very long snippet that needs to be truncated.";
        let truncated = truncate_snippet(snippet, 20);

        assert!(truncated.len() <= 23); // 20 + "..."
        assert!(truncated.ends_with("..."));
    }
}
