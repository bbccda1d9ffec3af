//! Vector store record and result types

use serde::{Deserialize, Serialize};

/// Metadata stored alongside every chunk vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecordMetadata {
    pub text: String,
    /// Source URL of the page the chunk came from
    pub source: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chunk_index: usize,
}

/// A chunk embedding ready to be upserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkRecordMetadata,
}

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: String,
    pub content: String,
    pub source_url: String,
    pub title: String,
    pub score: f32,
}

impl ScoredChunk {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source_url: source_url.into(),
            title: title.into(),
            score,
        }
    }

    pub fn from_metadata(id: impl Into<String>, metadata: ChunkRecordMetadata, score: f32) -> Self {
        Self {
            id: id.into(),
            content: metadata.text,
            source_url: metadata.source,
            title: metadata.title,
            score,
        }
    }
}

/// Outcome of an upsert call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertResult {
    pub upserted: usize,
}

impl UpsertResult {
    pub fn new(upserted: usize) -> Self {
        Self { upserted }
    }

    pub fn merge(self, other: UpsertResult) -> Self {
        Self {
            upserted: self.upserted + other.upserted,
        }
    }
}

/// Order results by descending score, keeping the input order for ties
pub fn sort_by_score(results: &mut [ScoredChunk]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}
