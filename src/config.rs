//! Configuration for the QA pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Index storage configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Chat session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    150
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Embedding model name
    #[serde(default = "default_model")]
    pub embed_model: String,
    /// Generation model name
    #[serde(default = "default_model")]
    pub generate_model: String,
    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_model(),
            generate_model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Index storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory under which named index artifacts are stored
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Name used when the caller does not pick one
    #[serde(default = "default_index_name")]
    pub default_name: String,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./indexes")
}

fn default_index_name() -> String {
    "combined_pdfs".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            default_name: default_index_name(),
        }
    }
}

impl IndexConfig {
    /// Resolve the artifact directory for a named index
    pub fn dir_for(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Input that clears the conversation log
    #[serde(default = "default_reset_word")]
    pub reset_word: String,
}

fn default_top_k() -> usize {
    4
}

fn default_reset_word() -> String {
    "tata".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            reset_word: default_reset_word(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the first config file found in the
    /// standard locations (`./paperchat.toml`, then the user config dir), or
    /// fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from("paperchat.toml");
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("paperchat").join("config.toml");
            if user.is_file() {
                return Self::from_file(&user);
            }
        }

        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be at least 1".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.session.top_k == 0 {
            return Err(Error::Config("session.top_k must be at least 1".into()));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(Error::Config("llm.base_url must not be empty".into()));
        }
        if self.llm.embed_model.trim().is_empty() || self.llm.generate_model.trim().is_empty() {
            return Err(Error::Config("llm model names must not be empty".into()));
        }
        Ok(())
    }
}
