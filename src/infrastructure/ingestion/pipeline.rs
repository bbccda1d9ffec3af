//! Indexing pipeline: chunk, embed and upsert crawled pages

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::corpus::CorpusDocument;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::ingestion::{
    chunk_id, source_prefix, Chunk, ChunkingConfig, ChunkingStrategy, IndexReport,
};
use crate::domain::vector_store::{ChunkRecordMetadata, VectorRecord, VectorStore};
use crate::domain::DomainError;

use super::chunkers::RecursiveCharacterChunker;

/// Settings for one indexing run
#[derive(Debug, Clone)]
pub struct IndexingOptions {
    pub chunking: ChunkingConfig,
    pub embedding_model: String,
    pub embedding_dimensions: Option<usize>,
    /// Chunks embedded per provider call
    pub embedding_batch_size: usize,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            embedding_model: "text-embedding-3-large".to_string(),
            embedding_dimensions: None,
            embedding_batch_size: 100,
        }
    }
}

/// A chunk waiting to be embedded, with the page it came from
struct PendingChunk<'a> {
    document: &'a CorpusDocument,
    chunk: Chunk,
}

impl PendingChunk<'_> {
    fn source_prefix(&self) -> String {
        source_prefix(&self.document.source_url, &self.document.content)
    }

    fn into_record(self, values: Vec<f32>) -> VectorRecord {
        let index = self.chunk.index();
        VectorRecord {
            id: chunk_id(&self.document.source_url, &self.document.content, index),
            values,
            metadata: ChunkRecordMetadata {
                text: self.chunk.content,
                source: self.document.source_url.clone(),
                title: self.document.title.clone(),
                chunk_index: index,
            },
        }
    }
}

/// Pipeline writing corpus documents into a vector store
pub struct IndexingPipeline<E, V>
where
    E: EmbeddingProvider,
    V: VectorStore,
{
    embedder: Arc<E>,
    store: Arc<V>,
    chunker: Arc<dyn ChunkingStrategy>,
    options: IndexingOptions,
}

impl<E: EmbeddingProvider, V: VectorStore> IndexingPipeline<E, V> {
    pub fn new(embedder: Arc<E>, store: Arc<V>, options: IndexingOptions) -> Self {
        Self {
            embedder,
            store,
            chunker: Arc::new(RecursiveCharacterChunker::new()),
            options,
        }
    }

    pub fn with_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn options(&self) -> &IndexingOptions {
        &self.options
    }

    /// Split documents into overlapping windows, dropping whitespace-only ones
    fn split<'a>(
        &self,
        documents: &'a [CorpusDocument],
    ) -> Result<(Vec<PendingChunk<'a>>, usize), DomainError> {
        let mut pending = Vec::new();
        let mut skipped = 0;

        for document in documents {
            for chunk in self.chunker.chunk(&document.content, &self.options.chunking)? {
                if chunk.is_blank() {
                    skipped += 1;
                    continue;
                }
                pending.push(PendingChunk { document, chunk });
            }
        }

        Ok((pending, skipped))
    }

    /// Index documents, replacing whatever an earlier run stored for the same pages
    ///
    /// A page's old vectors are deleted right before its first chunk is written,
    /// so a failed embedding call leaves pages not yet reached untouched.
    pub async fn index(&self, documents: &[CorpusDocument]) -> Result<IndexReport, DomainError> {
        if self.options.embedding_batch_size == 0 {
            return Err(DomainError::configuration(
                "embedding_batch_size must be greater than 0",
            ));
        }

        let (pending, skipped_blank) = self.split(documents)?;

        info!(
            "Split into {} chunks using {}",
            pending.len(),
            self.chunker.name()
        );
        if skipped_blank > 0 {
            warn!(skipped = skipped_blank, "Skipped whitespace-only chunks");
        }

        let mut report = IndexReport {
            documents: documents.len(),
            chunks: pending.len(),
            skipped_blank,
            ..Default::default()
        };
        let mut cleared: HashSet<String> = HashSet::new();

        let mut pending = pending.into_iter().peekable();
        let mut batch_number = 0;

        while pending.peek().is_some() {
            let batch: Vec<PendingChunk<'_>> =
                pending.by_ref().take(self.options.embedding_batch_size).collect();
            batch_number += 1;

            let texts = batch.iter().map(|p| p.chunk.content.clone()).collect();
            let request = EmbeddingRequest::batch(&self.options.embedding_model, texts)
                .with_dimensions(self.options.embedding_dimensions);

            let vectors = self.embedder.embed(request).await?.into_vectors();
            if vectors.len() != batch.len() {
                return Err(DomainError::provider(
                    self.embedder.provider_name(),
                    format!(
                        "Expected {} embeddings, received {}",
                        batch.len(),
                        vectors.len()
                    ),
                ));
            }

            for prefix in batch.iter().map(PendingChunk::source_prefix) {
                if !cleared.contains(&prefix) {
                    report.replaced += self.store.delete_prefix(&prefix).await?;
                    cleared.insert(prefix);
                }
            }

            let records: Vec<VectorRecord> = batch
                .into_iter()
                .zip(vectors)
                .map(|(p, values)| p.into_record(values))
                .collect();

            let result = self.store.upsert(records).await?;
            report.upserted += result.upserted;

            debug!(batch = batch_number, upserted = result.upserted, "Indexed batch");
        }

        info!(
            "Upserted {} of {} chunks into {} ({} earlier vectors replaced)",
            report.upserted,
            report.chunks,
            self.store.collection_name(),
            report.replaced
        );

        Ok(report)
    }
}
