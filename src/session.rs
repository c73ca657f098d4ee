//! Session orchestration: document submission, index binding and the chat loop
//!
//! A session is either unbound (no index) or bound to one index through an
//! `Answerer`. Submitting documents creates or extends the index on disk;
//! loading binds an existing artifact. Asking questions is infallible at this
//! boundary: every failure becomes a user-visible reply, and the conversation
//! log survives all of them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::answerer::Answerer;
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::Citation;
use crate::index::{index_exists, LoadOptions, VectorIndex};
use crate::ingestion::{DocumentReader, IngestPipeline};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::types::{ChatTurn, Document, RawDocument};

/// Fixed reply for questions asked before any index is bound
pub const NOT_READY_GUIDANCE: &str =
    "Please add PDF documents or load an existing index before asking questions.";

/// Reply confirming the conversation log was cleared
pub const RESET_ACK: &str = "Conversation cleared.";

/// Per-file outcome of a document submission
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Files newly chunked and indexed
    pub added: Vec<String>,
    /// Files whose content was already in the index
    pub skipped: Vec<String>,
    /// Files that could not be read or chunked, with reasons
    pub failed: Vec<(String, String)>,
    /// Chunks added to the index by this call
    pub chunks_added: usize,
    /// Set when the updated index could not be written to disk; the
    /// in-memory index stays bound and usable for this session.
    pub persist_error: Option<String>,
}

/// Summary of a successfully loaded index
#[derive(Debug)]
pub struct LoadReport {
    pub documents: usize,
    pub chunks: usize,
    pub embedding_model: String,
}

/// Reply to one chat input, with the sources behind it (empty for guidance
/// and reset acknowledgements)
#[derive(Debug)]
pub struct AskOutcome {
    pub reply: String,
    pub citations: Vec<Citation>,
}

/// Snapshot of session state for display
#[derive(Debug)]
pub struct SessionStatus {
    pub ready: bool,
    pub index_dir: Option<PathBuf>,
    pub documents: usize,
    pub chunks: usize,
    pub turns: usize,
}

/// Stateful controller binding one index (at most) to a conversation log
pub struct SessionController {
    config: RagConfig,
    reader: Arc<dyn DocumentReader>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    load_options: LoadOptions,
    answerer: Option<Answerer>,
    index_dir: Option<PathBuf>,
    transcript: Vec<ChatTurn>,
}

impl SessionController {
    pub fn new(
        config: RagConfig,
        reader: Arc<dyn DocumentReader>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        load_options: LoadOptions,
    ) -> Self {
        Self {
            config,
            reader,
            embedder,
            llm,
            load_options,
            answerer: None,
            index_dir: None,
            transcript: Vec::new(),
        }
    }

    /// Read, chunk and index the given files, then persist the index.
    ///
    /// Files already present in the index (by content hash) are skipped, so
    /// resubmitting a document never duplicates its chunks, including after a
    /// restart with the same index name. Unreadable files are reported in the
    /// returned `IngestReport` while the remaining files proceed. Submitting
    /// under a different index name switches the binding once the target
    /// index is ready. A failed load or embedding run aborts the batch and
    /// leaves the session bound exactly as it was before the call.
    pub async fn submit_documents(
        &mut self,
        paths: &[PathBuf],
        index_name: Option<&str>,
    ) -> Result<IngestReport> {
        let target = match index_name {
            Some(name) => self.config.index.dir_for(name),
            None => self
                .index_dir
                .clone()
                .unwrap_or_else(|| self.config.index.dir_for(&self.config.index.default_name)),
        };

        let same_target = self.index_dir.as_deref() == Some(target.as_path());

        let pipeline = IngestPipeline::new(&self.config.chunking)?;

        let mut report = IngestReport::default();
        let mut raws = Vec::new();
        for path in paths {
            match self.reader.read(path) {
                Ok(raw) => raws.push(raw),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "document skipped");
                    report.failed.push((display_name(path), e.to_string()));
                }
            }
        }
        if raws.is_empty() {
            return Ok(report);
        }

        // Extending in place takes the bound index out of the session; a
        // switch loads the target artifact instead, so deduplication sees
        // documents indexed in earlier runs while the current binding stays
        // in place until the new index is ready
        let mut current: Option<VectorIndex> = if same_target {
            match self.answerer.take() {
                Some(answerer) => Some(answerer.into_index()),
                None if index_exists(&target) => {
                    Some(VectorIndex::load(&target, self.load_options)?)
                }
                None => None,
            }
        } else if index_exists(&target) {
            Some(VectorIndex::load(&target, self.load_options)?)
        } else {
            None
        };

        let result = self
            .extend_index(&mut current, &pipeline, raws, &target, &mut report)
            .await;

        if let Some(index) = current {
            if result.is_ok() {
                self.answerer = Some(self.bind(index));
                self.index_dir = Some(target);
            } else if same_target {
                // A failed extension left the index unchanged; put it back
                self.answerer = Some(self.bind(index));
            }
        }

        result?;
        Ok(report)
    }

    async fn extend_index(
        &self,
        current: &mut Option<VectorIndex>,
        pipeline: &IngestPipeline,
        raws: Vec<RawDocument>,
        target: &Path,
        report: &mut IngestReport,
    ) -> Result<()> {
        let mut new_docs: Vec<Document> = Vec::new();
        let mut new_chunks = Vec::new();

        for raw in raws {
            let already_indexed = current
                .as_ref()
                .map_or(false, |index| index.contains_document(&raw.content_hash))
                || new_docs.iter().any(|d| d.content_hash == raw.content_hash);
            if already_indexed {
                tracing::info!(file = %raw.filename, "document already indexed, skipping");
                report.skipped.push(raw.filename);
                continue;
            }

            match pipeline.process(&raw) {
                Ok(ingested) => {
                    report.added.push(ingested.document.filename.clone());
                    new_docs.push(ingested.document);
                    new_chunks.extend(ingested.chunks);
                }
                Err(e) => report.failed.push((raw.filename, e.to_string())),
            }
        }

        if new_chunks.is_empty() {
            return Ok(());
        }
        report.chunks_added = new_chunks.len();

        match current.as_mut() {
            Some(index) => index.add(new_chunks, self.embedder.as_ref()).await?,
            None => {
                *current = Some(VectorIndex::create(new_chunks, self.embedder.as_ref()).await?)
            }
        }

        if let Some(index) = current.as_mut() {
            for doc in new_docs {
                index.register_document(doc);
            }
            if let Err(e) = index.save(target) {
                tracing::error!(error = %e, "index update could not be persisted");
                report.persist_error = Some(e.to_string());
            }
        }

        Ok(())
    }

    /// Bind a previously saved index. A failed load leaves the session
    /// exactly as it was.
    pub fn load_existing_index(&mut self, path: &Path) -> Result<LoadReport> {
        let index = VectorIndex::load(path, self.load_options)?;

        if index.embedding_model() != self.config.llm.embed_model {
            tracing::warn!(
                persisted = index.embedding_model(),
                configured = %self.config.llm.embed_model,
                "index was built with a different embedding model; rankings may degrade"
            );
        }

        let report = LoadReport {
            documents: index.documents().len(),
            chunks: index.len(),
            embedding_model: index.embedding_model().to_string(),
        };

        self.answerer = Some(self.bind(index));
        self.index_dir = Some(path.to_path_buf());
        Ok(report)
    }

    /// Drop the bound index, returning to the unbound state. The conversation
    /// log is untouched; the on-disk artifact stays where it is.
    pub fn clear_index(&mut self) {
        self.answerer = None;
        self.index_dir = None;
        tracing::info!("index binding cleared");
    }

    /// Handle one chat input. The reset word (matched case-insensitively)
    /// clears the conversation log and nothing else; any other input is
    /// logged together with its reply, which is the answer, the not-ready
    /// guidance, or a failure notice.
    pub async fn ask(&mut self, input: &str) -> AskOutcome {
        let trimmed = input.trim();
        if trimmed.to_lowercase() == self.config.session.reset_word.to_lowercase() {
            self.transcript.clear();
            tracing::info!("conversation log cleared");
            return AskOutcome {
                reply: RESET_ACK.to_string(),
                citations: Vec::new(),
            };
        }

        self.transcript.push(ChatTurn::user(trimmed));

        let (reply, citations) = match &self.answerer {
            None => (NOT_READY_GUIDANCE.to_string(), Vec::new()),
            Some(answerer) => match answerer.ask(trimmed).await {
                Ok(answer) => (answer.text, answer.citations),
                Err(e) => {
                    tracing::warn!(error = %e, "question could not be answered");
                    (failure_notice(&e), Vec::new())
                }
            },
        };

        self.transcript.push(ChatTurn::assistant(reply.clone()));
        AskOutcome { reply, citations }
    }

    pub fn is_ready(&self) -> bool {
        self.answerer.is_some()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            ready: self.is_ready(),
            index_dir: self.index_dir.clone(),
            documents: self
                .answerer
                .as_ref()
                .map_or(0, |a| a.index().documents().len()),
            chunks: self.answerer.as_ref().map_or(0, |a| a.index().len()),
            turns: self.transcript.len(),
        }
    }

    fn bind(&self, index: VectorIndex) -> Answerer {
        Answerer::new(
            index,
            Arc::clone(&self.embedder),
            Arc::clone(&self.llm),
            self.config.session.top_k,
        )
    }
}

/// Turn an answering failure into the reply the user sees
fn failure_notice(error: &Error) -> String {
    match error {
        Error::EmptyIndex => NOT_READY_GUIDANCE.to_string(),
        Error::ModelUnavailable(message) => format!(
            "The language model could not be reached: {message}. \
             Check that Ollama is running, then try again."
        ),
        other => format!("Something went wrong while answering: {other}"),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
