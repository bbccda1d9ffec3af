//! LLM-as-judge metric scorer
//!
//! Each metric has its own judge prompt. The model answers with a
//! `{"score": 0-10, "reason": ...}` object which is normalized to `[0, 1]`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::evaluation::{EvaluationSample, Metric, MetricScore, MetricScorer};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::prompt::{
    judge_format, TemplateRegistry, ANSWER_RELEVANCY_TEMPLATE, CONTEXT_PRECISION_TEMPLATE,
    CONTEXT_RECALL_TEMPLATE, FAITHFULNESS_TEMPLATE,
};
use crate::domain::DomainError;

const JUDGE_MAX_TOKENS: u32 = 300;

fn template_for(metric: Metric) -> &'static str {
    match metric {
        Metric::Faithfulness => FAITHFULNESS_TEMPLATE,
        Metric::AnswerRelevancy => ANSWER_RELEVANCY_TEMPLATE,
        Metric::ContextPrecision => CONTEXT_PRECISION_TEMPLATE,
        Metric::ContextRecall => CONTEXT_RECALL_TEMPLATE,
    }
}

/// Response structure from the judge
#[derive(Debug, Deserialize)]
struct JudgeResponse {
    score: f64,
    reason: Option<String>,
}

/// Deserialize the first JSON object in a reply
///
/// Anything before the first `{` (markdown fences, prose) is skipped, and
/// anything after the end of that object is ignored.
pub(super) fn first_json_object<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let start = text.find('{').unwrap_or(0);

    match serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<T>()
        .next()
    {
        Some(result) => result,
        None => serde_json::from_str(text),
    }
}

/// Metric scorer that asks a chat model to grade each sample
#[derive(Debug)]
pub struct LlmJudgeScorer<P>
where
    P: LlmProvider,
{
    provider: Arc<P>,
    templates: Arc<TemplateRegistry>,
    model: String,
}

impl<P: LlmProvider> LlmJudgeScorer<P> {
    pub fn new(provider: Arc<P>, templates: Arc<TemplateRegistry>, model: impl Into<String>) -> Self {
        Self {
            provider,
            templates,
            model: model.into(),
        }
    }

    fn build_prompt(&self, metric: Metric, sample: &EvaluationSample) -> Result<String, DomainError> {
        let contexts = sample
            .contexts
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(self.templates.render_with(
            template_for(metric),
            &[
                ("question", sample.question.as_str()),
                ("answer", sample.answer.as_str()),
                ("contexts", contexts.as_str()),
                ("ground_truth", sample.ground_truth.as_str()),
                ("format", judge_format()),
            ],
        )?)
    }

    fn parse_response(&self, response: &str) -> Result<JudgeResponse, DomainError> {
        first_json_object(response).map_err(|e| {
            warn!("Failed to parse judge response: {} - Response: {}", e, response);
            DomainError::evaluation(format!("Invalid judge response format: {}", e))
        })
    }

    fn normalize_score(score: f64) -> f64 {
        (score / 10.0).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl<P: LlmProvider> MetricScorer for LlmJudgeScorer<P> {
    async fn score(
        &self,
        metric: Metric,
        sample: &EvaluationSample,
    ) -> Result<MetricScore, DomainError> {
        let prompt = self.build_prompt(metric, sample)?;

        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(0.0)
            .max_tokens(JUDGE_MAX_TOKENS)
            .json_output(true)
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let parsed = self.parse_response(response.content())?;
        let normalized = Self::normalize_score(parsed.score);

        debug!(
            "Scored {}: raw={}, normalized={}",
            metric, parsed.score, normalized
        );

        let mut score = MetricScore::new(metric, normalized);
        if let Some(reason) = parsed.reason {
            score = score.with_reason(reason);
        }
        Ok(score)
    }

    fn scorer_name(&self) -> &'static str {
        "llm_judge"
    }
}
