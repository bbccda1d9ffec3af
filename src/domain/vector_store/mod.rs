//! Vector store domain - chunk records, retrieval results and the store trait

mod record;
mod store;

pub use record::{sort_by_score, ChunkRecordMetadata, ScoredChunk, UpsertResult, VectorRecord};
pub use store::VectorStore;

#[cfg(test)]
pub use store::MockVectorStore;
