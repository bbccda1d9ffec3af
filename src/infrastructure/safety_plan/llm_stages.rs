//! Plan stages backed by a chat completion model

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::prompt::{
    TemplateRegistry, ANALYSIS_TEMPLATE, EXAMPLE_SAFETY_PLAN, SYNTHESIS_TEMPLATE,
};
use crate::domain::safety_plan::{Analysis, FormattedQuery, PlanBody, PlanStages};
use crate::domain::vector_store::ScoredChunk;
use crate::domain::DomainError;

/// Render retrieved chunks as the context block of the analysis prompt
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "{}\nSource: {} ({})",
                chunk.content, chunk.title, chunk.source_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Analysis and synthesis as two chat calls with prompt templates
#[derive(Debug)]
pub struct LlmPlanStages<P: LlmProvider> {
    llm: Arc<P>,
    templates: Arc<TemplateRegistry>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl<P: LlmProvider> LlmPlanStages<P> {
    pub fn new(llm: Arc<P>, templates: Arc<TemplateRegistry>, model: impl Into<String>) -> Self {
        Self {
            llm,
            templates,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn complete(&self, prompt: String) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(self.temperature)
            .max_tokens_opt(self.max_tokens)
            .build();

        let response = self.llm.chat(&self.model, request).await?;

        if response.is_truncated() {
            debug!(model = %self.model, "Completion stopped at the token limit");
        }

        Ok(response.content().trim().to_string())
    }
}

#[async_trait]
impl<P: LlmProvider> PlanStages for LlmPlanStages<P> {
    async fn analyze(
        &self,
        query: &FormattedQuery,
        context: &[ScoredChunk],
    ) -> Result<Analysis, DomainError> {
        let context = format_context(context);
        let prompt = self.templates.render_with(
            ANALYSIS_TEMPLATE,
            &[("input", query.as_str()), ("context", &context)],
        )?;

        debug!(prompt_len = prompt.len(), "Running analysis stage");
        Ok(Analysis::new(self.complete(prompt).await?))
    }

    async fn synthesize(
        &self,
        query: &FormattedQuery,
        analysis: &Analysis,
    ) -> Result<PlanBody, DomainError> {
        let prompt = self.templates.render_with(
            SYNTHESIS_TEMPLATE,
            &[
                ("input", query.as_str()),
                ("analysis", analysis.as_str()),
                ("example_plan", EXAMPLE_SAFETY_PLAN),
            ],
        )?;

        debug!(prompt_len = prompt.len(), "Running synthesis stage");
        Ok(PlanBody::new(self.complete(prompt).await?))
    }
}
