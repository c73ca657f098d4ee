//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for completing a fully built prompt with a language model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt and return the model's text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check whether the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;
}
