//! In-memory embedding store with exact cosine-similarity search.
//!
//! Entries keep insertion order, which also breaks score ties: the stable
//! descending sort leaves the earliest-inserted chunk first. Search is a full
//! scan, so results are identical before and after a save/load cycle.

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, Document};

/// A search hit: chunk plus its cosine similarity to the query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Insertion-ordered embedding store with a document registry
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimensions: usize,
    embedding_model: String,
    chunks: Vec<Chunk>,
    documents: Vec<Document>,
}

impl VectorIndex {
    /// Embed every chunk and build a new index. Either the whole batch goes
    /// in or the error comes back with nothing built.
    pub async fn create(
        mut chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::internal("cannot create an index from zero chunks"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let dimensions = vectors.first().map(|v| v.len()).unwrap_or(0);
        if dimensions == 0 {
            return Err(Error::embedding("embedder returned an empty vector"));
        }
        for vector in &vectors {
            validate_embedding(vector, dimensions)?;
        }

        for (chunk, vector) in chunks.iter_mut().zip(vectors) {
            chunk.embedding = vector;
        }

        tracing::info!(
            chunks = chunks.len(),
            dimensions,
            model = embedder.model(),
            "vector index created"
        );

        Ok(Self {
            dimensions,
            embedding_model: embedder.model().to_string(),
            chunks,
            documents: Vec::new(),
        })
    }

    /// Embed and append chunks. Validation happens before any entry lands,
    /// so a failure leaves the index exactly as it was. An empty batch is a
    /// no-op that never calls the embedder.
    pub async fn add(
        &mut self,
        mut chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        for vector in &vectors {
            validate_embedding(vector, self.dimensions)?;
        }

        for (chunk, vector) in chunks.iter_mut().zip(vectors) {
            chunk.embedding = vector;
        }
        self.chunks.extend(chunks);

        tracing::info!(total = self.chunks.len(), "chunks added to index");
        Ok(())
    }

    /// K nearest chunks by cosine similarity, descending. Ties keep insertion
    /// order. Fewer than `k` entries returns everything.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(Error::internal("search requires k >= 1"));
        }
        validate_embedding(query, self.dimensions)?;

        let mut results: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk: chunk.clone(),
                similarity: cosine_similarity(query, &chunk.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    /// Record an ingested document in the registry
    pub fn register_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// True when a document with this content hash was already ingested
    pub fn contains_document(&self, content_hash: &str) -> bool {
        self.documents.iter().any(|d| d.content_hash == content_hash)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub(crate) fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn from_parts(
        dimensions: usize,
        embedding_model: String,
        chunks: Vec<Chunk>,
        documents: Vec<Document>,
    ) -> Self {
        Self {
            dimensions,
            embedding_model,
            chunks,
            documents,
        }
    }
}

/// Reject wrong-dimension and non-finite vectors before they enter the index
fn validate_embedding(vector: &[f32], dimensions: usize) -> Result<()> {
    if vector.len() != dimensions {
        return Err(Error::embedding(format!(
            "embedding dimension {} does not match index dimension {}",
            vector.len(),
            dimensions
        )));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(Error::embedding("embedding contains non-finite values"));
    }
    Ok(())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
