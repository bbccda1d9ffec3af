//! Ingestion domain types: chunking and chunk identity

pub mod chunker;
mod identity;
mod report;

pub use chunker::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use identity::{chunk_id, source_prefix};
pub use report::IndexReport;
