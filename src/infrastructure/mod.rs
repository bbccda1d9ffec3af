//! Infrastructure layer - External service implementations

pub mod corpus;
pub mod embedding;
pub mod evaluation;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod safety_plan;
pub mod vector_store;
