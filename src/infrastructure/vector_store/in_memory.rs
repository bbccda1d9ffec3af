//! In-memory vector store for development and testing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::embedding::cosine_similarity;
use crate::domain::vector_store::{
    sort_by_score, ScoredChunk, UpsertResult, VectorRecord, VectorStore,
};
use crate::domain::DomainError;

/// Exhaustive cosine search over records kept in insertion order
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    name: String,
    records: Arc<RwLock<Vec<VectorRecord>>>,
}

impl InMemoryVectorStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<VectorRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<UpsertResult, DomainError> {
        let mut stored = self.records.write().await;
        let count = records.len();

        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(UpsertResult::new(count))
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<ScoredChunk>, DomainError> {
        let stored = self.records.read().await;

        let mut results: Vec<ScoredChunk> = stored
            .iter()
            .map(|record| {
                let score = cosine_similarity(&vector, &record.values);
                ScoredChunk::from_metadata(record.id.clone(), record.metadata.clone(), score)
            })
            .collect();

        sort_by_score(&mut results);
        results.truncate(top_k);

        Ok(results)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let mut stored = self.records.write().await;
        let before = stored.len();
        stored.retain(|r| !r.id.starts_with(prefix));
        Ok(before - stored.len())
    }

    fn collection_name(&self) -> String {
        self.name.clone()
    }
}
