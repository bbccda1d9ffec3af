//! Vector store trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{ScoredChunk, UpsertResult, VectorRecord};
use crate::domain::DomainError;

/// A named collection of chunk vectors searchable by similarity
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace records by id
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<UpsertResult, DomainError>;

    /// Return at most `top_k` chunks ordered by descending similarity
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<ScoredChunk>, DomainError>;

    /// Remove every record whose id starts with `prefix`, returning how many went
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, DomainError>;

    /// Name of the collection this store writes to
    fn collection_name(&self) -> String;
}
