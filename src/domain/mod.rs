//! Domain layer - Core business logic and entities

pub mod corpus;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod ingestion;
pub mod llm;
pub mod prompt;
pub mod safety_plan;
pub mod vector_store;

pub use corpus::{CorpusDocument, ParsedCorpus};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use evaluation::{
    EvaluationRecord, EvaluationSample, EvaluationSummary, GeneratedAnswers, Metric, MetricScore,
    MetricScorer, TestCase, TestSet,
};
pub use ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy, IndexReport};
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use prompt::{PromptTemplate, TemplateError, TemplateRegistry};
pub use safety_plan::{
    FormattedQuery, GeneratedPlan, GeneratorConfig, PlanStages, RetryConfig, SafetyPlan,
    SafetyPlanRequest,
};
pub use vector_store::{ScoredChunk, VectorRecord, VectorStore};
