//! Query-time retrieval: embed the question, search the index

use std::sync::Arc;

use crate::error::Result;
use crate::index::{ScoredChunk, VectorIndex};
use crate::providers::EmbeddingProvider;

/// Binds a vector index to the embedder that produced its vectors
pub struct Retriever {
    index: VectorIndex,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    /// Embed the query and return the top `k` chunks
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&vector, k)?;

        tracing::debug!(k, hits = hits.len(), "retrieval complete");
        Ok(hits)
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn into_index(self) -> VectorIndex {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};
    use async_trait::async_trait;
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

    fn chunk(content: &str, index: u32) -> Chunk {
        Chunk::new(
            Uuid::new_v4(),
            content.to_string(),
            ChunkSource::new("doc.pdf".into(), 1, 1),
            0,
            content.chars().count(),
            index,
        )
    }

    #[tokio::test]
    async fn retrieve_embeds_the_query_and_ranks_chunks() {
        let embedder = LetterEmbedder;
        let index = VectorIndex::create(vec![chunk("aaaa", 0), chunk("bbbb", 1)], &embedder)
            .await
            .unwrap();

        let retriever = Retriever::new(index, Arc::new(LetterEmbedder));
        let hits = retriever.retrieve("aaa", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.content, "aaaa");
    }
}
