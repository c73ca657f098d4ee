//! Prompt templates for grounded question answering

use crate::generation::Citation;
use crate::index::ScoredChunk;

/// The phrase the model is told to use when the context has no answer.
/// Also returned directly when retrieval comes back empty.
pub const NO_ANSWER_FALLBACK: &str = "I could not find this in the indexed documents.";

/// Prompt builder for retrieval-augmented queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search results, numbered to match the sources list
    pub fn build_context(hits: &[ScoredChunk]) -> String {
        let mut context = String::new();

        for (i, hit) in hits.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                hit.chunk.source.format_citation(),
                hit.chunk.content
            ));
        }

        context
    }

    /// Build the full question-answering prompt with grounding rules
    pub fn build_qa_prompt(question: &str, context: &str, citations: &[Citation]) -> String {
        format!(
            r#"You are a careful assistant answering questions about a set of PDF documents.

RULES:
1. Answer ONLY from the CONTEXT below
2. If the context does not contain the answer, respond with "{fallback}"
3. Cite the sources you use inline, like [Source: report.pdf, Page 3]
4. Never invent filenames or page numbers

CONTEXT:
{context}

AVAILABLE SOURCES:
{sources}

QUESTION: {question}

Answer:"#,
            fallback = NO_ANSWER_FALLBACK,
            context = context,
            sources = Self::format_sources_list(citations),
            question = question
        )
    }

    /// Format sources list for the prompt
    fn format_sources_list(citations: &[Citation]) -> String {
        citations
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] {}", i + 1, c.format_source()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};
    use uuid::Uuid;

    fn hit(content: &str, filename: &str, page: u32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(
                Uuid::new_v4(),
                content.to_string(),
                ChunkSource::new(filename.to_string(), page, page),
                0,
                content.chars().count(),
                0,
            ),
            similarity: 0.9,
        }
    }

    #[test]
    fn context_numbers_hits_and_names_sources() {
        let hits = vec![
            hit("First passage.", "a.pdf", 1),
            hit("Second passage.", "b.pdf", 4),
        ];
        let context = PromptBuilder::build_context(&hits);

        assert!(context.contains("[1] a.pdf, Page 1"));
        assert!(context.contains("[2] b.pdf, Page 4"));
        assert!(context.contains("First passage."));
        assert!(context.contains("Second passage."));
    }

    #[test]
    fn qa_prompt_carries_question_and_fallback() {
        let hits = vec![hit("Only passage.", "a.pdf", 1)];
        let citations: Vec<Citation> = hits.iter().map(Citation::from_hit).collect();
        let context = PromptBuilder::build_context(&hits);
        let prompt = PromptBuilder::build_qa_prompt("What is this?", &context, &citations);

        assert!(prompt.contains("QUESTION: What is this?"));
        assert!(prompt.contains(NO_ANSWER_FALLBACK));
        assert!(prompt.contains("[1] a.pdf, Page 1"));
    }
}
