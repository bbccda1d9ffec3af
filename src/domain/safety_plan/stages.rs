//! The two model passes of plan generation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::FormattedQuery;
use crate::domain::vector_store::ScoredChunk;
use crate::domain::DomainError;

/// Free-text analysis grounded in retrieved context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Analysis(String);

impl Analysis {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Four-section plan text produced by the synthesis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanBody(String);

impl PlanBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Analyze-then-synthesize pipeline
#[async_trait]
pub trait PlanStages: Send + Sync + Debug {
    /// Produce an analysis of the query using only the supplied context
    async fn analyze(
        &self,
        query: &FormattedQuery,
        context: &[ScoredChunk],
    ) -> Result<Analysis, DomainError>;

    /// Turn an analysis into the four-section plan body
    async fn synthesize(
        &self,
        query: &FormattedQuery,
        analysis: &Analysis,
    ) -> Result<PlanBody, DomainError>;
}
