//! Vector index: embedding store with exact cosine search and disk persistence

mod persist;
mod store;

pub use persist::{index_exists, LoadOptions};
pub use store::{ScoredChunk, VectorIndex};
