//! Answer synthesis: retrieve context, prompt the model, link citations

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::{link_citations, Citation, PromptBuilder, NO_ANSWER_FALLBACK};
use crate::index::VectorIndex;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::Retriever;

/// A synthesized answer with the sources that grounded it
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Question answering over one bound vector index
pub struct Answerer {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl Answerer {
    pub fn new(
        index: VectorIndex,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            retriever: Retriever::new(index, embedder),
            llm,
            top_k,
        }
    }

    /// Answer a question from the indexed documents.
    ///
    /// Retrieval failures surface as `Error::Embedding`, an unreachable model
    /// as `Error::ModelUnavailable`, and an index with no entries as
    /// `Error::EmptyIndex` so the caller can respond with guidance instead of
    /// an error dump.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        if self.retriever.index().is_empty() {
            return Err(Error::EmptyIndex);
        }

        let hits = self.retriever.retrieve(question, self.top_k).await?;
        if hits.is_empty() {
            return Ok(Answer {
                text: NO_ANSWER_FALLBACK.to_string(),
                citations: Vec::new(),
            });
        }

        let citations: Vec<Citation> = hits.iter().map(Citation::from_hit).collect();
        let context = PromptBuilder::build_context(&hits);
        let prompt = PromptBuilder::build_qa_prompt(question, &context, &citations);

        let text = self.llm.complete(&prompt).await?;
        let linked = link_citations(&text, &citations);

        tracing::info!(
            question_chars = question.chars().count(),
            sources = linked.len(),
            model = self.llm.model(),
            "answer generated"
        );

        Ok(Answer {
            text,
            citations: linked,
        })
    }

    pub fn index(&self) -> &VectorIndex {
        self.retriever.index()
    }

    pub fn into_index(self) -> VectorIndex {
        self.retriever.into_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct LetterEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let count = |c: char| text.chars().filter(|&x| x == c).count() as f32;
            Ok(vec![count('a') + 1.0, count('b') + 1.0])
        }

        fn name(&self) -> &str {
            "letters"
        }

        fn model(&self) -> &str {
            "letters"
        }
    }

    struct CannedLlm {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmProvider for DownLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::model_unavailable("connection refused"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "down"
        }

        fn model(&self) -> &str {
            "down"
        }
    }

    fn chunk(content: &str, filename: &str, page: u32, index: u32) -> Chunk {
        Chunk::new(
            Uuid::new_v4(),
            content.to_string(),
            ChunkSource::new(filename.to_string(), page, page),
            0,
            content.chars().count(),
            index,
        )
    }

    async fn two_chunk_index() -> VectorIndex {
        VectorIndex::create(
            vec![
                chunk("aaaa material", "alpha.pdf", 1, 0),
                chunk("bbbb material", "beta.pdf", 2, 0),
            ],
            &LetterEmbedder,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn ask_returns_answer_with_linked_citations() {
        let index = two_chunk_index().await;
        let llm = Arc::new(CannedLlm::new(
            "It is described in [Source: alpha.pdf, Page 1].",
        ));
        let answerer = Answerer::new(index, Arc::new(LetterEmbedder), llm.clone(), 2);

        let answer = answerer.ask("tell me about aaaa").await.unwrap();
        assert!(answer.text.contains("alpha.pdf"));
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].filename, "alpha.pdf");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ask_against_empty_index_is_empty_index_error() {
        let index = VectorIndex::from_parts(2, "letters".into(), Vec::new(), Vec::new());
        let answerer = Answerer::new(
            index,
            Arc::new(LetterEmbedder),
            Arc::new(CannedLlm::new("unused")),
            4,
        );

        let err = answerer.ask("anything").await.unwrap_err();
        assert!(matches!(err, Error::EmptyIndex));
    }

    #[tokio::test]
    async fn unreachable_model_surfaces_as_model_unavailable() {
        let index = two_chunk_index().await;
        let answerer = Answerer::new(index, Arc::new(LetterEmbedder), Arc::new(DownLlm), 2);

        let err = answerer.ask("question").await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn answer_without_markers_keeps_all_retrieved_sources() {
        let index = two_chunk_index().await;
        let answerer = Answerer::new(
            index,
            Arc::new(LetterEmbedder),
            Arc::new(CannedLlm::new("A plain answer.")),
            2,
        );

        let answer = answerer.ask("question").await.unwrap();
        assert_eq!(answer.citations.len(), 2);
    }
}
