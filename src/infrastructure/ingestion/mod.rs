//! Document ingestion infrastructure: chunkers and the indexing pipeline

pub mod chunkers;
pub mod pipeline;

pub use chunkers::RecursiveCharacterChunker;
pub use pipeline::{IndexingOptions, IndexingPipeline};
