//! Prompt construction and citation linking for answer generation

pub mod citation;
pub mod prompt;

pub use citation::{link_citations, truncate_snippet, Citation};
pub use prompt::{PromptBuilder, NO_ANSWER_FALLBACK};
