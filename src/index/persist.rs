//! Index persistence: a manifest plus a chunk payload on disk.
//!
//! The manifest records the embedding model, dimensions and a sha256 checksum
//! of the payload, so a load can reject truncated or edited files before any
//! chunk reaches the store. Loading deserializes data from disk, so it is
//! gated behind an explicit opt-in (`LoadOptions::trusted`); without it the
//! call fails with instructions rather than silently parsing the files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

use super::store::VectorIndex;

const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.json";
const FORMAT_VERSION: u32 = 1;

/// Controls for loading a persisted index
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Deserializing a persisted index parses files from disk. Set only for
    /// index directories you created or otherwise trust.
    pub trust_persisted: bool,
}

impl LoadOptions {
    pub fn trusted() -> Self {
        Self {
            trust_persisted: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    format_version: u32,
    embedding_model: String,
    dimensions: usize,
    chunk_count: usize,
    /// sha256 of the chunk payload file, hex encoded
    payload_checksum: String,
    documents: Vec<Document>,
    saved_at: chrono::DateTime<chrono::Utc>,
}

impl VectorIndex {
    /// Write the index to `dir` as `chunks.json` + `manifest.json`.
    ///
    /// Both files go through a temp-file-and-rename so a crash mid-save never
    /// leaves a half-written file behind, and the manifest is written last so
    /// its checksum only ever describes a complete payload.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let payload = serde_json::to_vec_pretty(&self.chunks())?;
        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            embedding_model: self.embedding_model().to_string(),
            dimensions: self.dimensions(),
            chunk_count: self.len(),
            payload_checksum: checksum(&payload),
            documents: self.documents().to_vec(),
            saved_at: chrono::Utc::now(),
        };

        write_atomic(&dir.join(CHUNKS_FILE), &payload)?;
        write_atomic(&dir.join(MANIFEST_FILE), &serde_json::to_vec_pretty(&manifest)?)?;

        tracing::info!(
            path = %dir.display(),
            chunks = self.len(),
            documents = self.documents().len(),
            "index saved"
        );
        Ok(())
    }

    /// Load a persisted index from `dir`, verifying the manifest checksum and
    /// that every stored embedding matches the recorded dimensions.
    pub fn load(dir: &Path, options: LoadOptions) -> Result<Self> {
        if !options.trust_persisted {
            return Err(Error::Config(format!(
                "loading a persisted index deserializes files from disk; \
                 pass --trust-index to confirm you trust {}",
                dir.display()
            )));
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(Error::IndexNotFound(dir.to_path_buf()));
        }

        let manifest_bytes = fs::read(&manifest_path)?;
        let manifest: Manifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| Error::index_corrupt(format!("unreadable manifest: {e}")))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::index_corrupt(format!(
                "unsupported index format version {} (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }
        if manifest.dimensions == 0 {
            return Err(Error::index_corrupt("manifest records zero dimensions"));
        }

        let chunks_path = dir.join(CHUNKS_FILE);
        let payload = fs::read(&chunks_path)
            .map_err(|e| Error::index_corrupt(format!("missing chunk payload: {e}")))?;

        let actual = checksum(&payload);
        if actual != manifest.payload_checksum {
            return Err(Error::index_corrupt(format!(
                "chunk payload checksum mismatch (expected {}, got {})",
                manifest.payload_checksum, actual
            )));
        }

        let chunks: Vec<Chunk> = serde_json::from_slice(&payload)
            .map_err(|e| Error::index_corrupt(format!("unreadable chunk payload: {e}")))?;

        if chunks.len() != manifest.chunk_count {
            return Err(Error::index_corrupt(format!(
                "manifest records {} chunks but payload holds {}",
                manifest.chunk_count,
                chunks.len()
            )));
        }
        for chunk in &chunks {
            if chunk.embedding.len() != manifest.dimensions {
                return Err(Error::index_corrupt(format!(
                    "chunk {} has {} dimensions, manifest records {}",
                    chunk.id,
                    chunk.embedding.len(),
                    manifest.dimensions
                )));
            }
        }

        tracing::info!(
            path = %dir.display(),
            chunks = chunks.len(),
            model = %manifest.embedding_model,
            "index loaded"
        );

        Ok(VectorIndex::from_parts(
            manifest.dimensions,
            manifest.embedding_model,
            chunks,
            manifest.documents,
        ))
    }
}

/// True when `dir` holds a saved index (its manifest is present)
pub fn index_exists(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE).exists()
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Write via a temp file in the same directory, then rename into place
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp: PathBuf = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
