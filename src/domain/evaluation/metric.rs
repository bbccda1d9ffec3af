//! Evaluation metrics and the scorer seam

use std::fmt::{self, Debug};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// The four answer-quality metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Faithfulness,
    AnswerRelevancy,
    ContextPrecision,
    ContextRecall,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Faithfulness,
        Metric::AnswerRelevancy,
        Metric::ContextPrecision,
        Metric::ContextRecall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Faithfulness => "faithfulness",
            Metric::AnswerRelevancy => "answer_relevancy",
            Metric::ContextPrecision => "context_precision",
            Metric::ContextRecall => "context_recall",
        }
    }

    /// Suggested change when the metric scores low
    pub fn improvement_hint(&self) -> &'static str {
        match self {
            Metric::Faithfulness => "Consider adjusting prompt to stay closer to context",
            Metric::AnswerRelevancy => "Refine prompt to focus more on question",
            Metric::ContextPrecision => "Adjust retrieval strategy or expand knowledge base",
            Metric::ContextRecall => "Modify prompt to better utilize context",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("Unknown metric: {}", s)))
    }
}

/// One question, the generated answer and the material it is judged against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSample {
    pub question: String,
    pub answer: String,
    pub contexts: Vec<String>,
    pub ground_truth: String,
}

impl EvaluationSample {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        contexts: Vec<String>,
        ground_truth: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            contexts,
            ground_truth: ground_truth.into(),
        }
    }
}

/// A metric value in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub metric: Metric,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MetricScore {
    /// Scores outside `[0, 1]` are clamped
    pub fn new(metric: Metric, score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self {
            metric,
            score,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Scores one metric for one sample
#[async_trait]
pub trait MetricScorer: Send + Sync + Debug {
    async fn score(
        &self,
        metric: Metric,
        sample: &EvaluationSample,
    ) -> Result<MetricScore, DomainError>;

    fn scorer_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Scorer returning a fixed value per metric
    #[derive(Debug, Default)]
    pub struct MockMetricScorer {
        scores: HashMap<Metric, f64>,
        fallback: f64,
        fail_on: Option<String>,
        calls: Mutex<Vec<(Metric, String)>>,
    }

    impl MockMetricScorer {
        pub fn new(fallback: f64) -> Self {
            Self {
                fallback,
                ..Default::default()
            }
        }

        pub fn with_score(mut self, metric: Metric, score: f64) -> Self {
            self.scores.insert(metric, score);
            self
        }

        /// Fail every call for the given question
        pub fn failing_for(mut self, question: impl Into<String>) -> Self {
            self.fail_on = Some(question.into());
            self
        }

        pub fn calls(&self) -> Vec<(Metric, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetricScorer for MockMetricScorer {
        async fn score(
            &self,
            metric: Metric,
            sample: &EvaluationSample,
        ) -> Result<MetricScore, DomainError> {
            self.calls
                .lock()
                .unwrap()
                .push((metric, sample.question.clone()));

            if self.fail_on.as_deref() == Some(sample.question.as_str()) {
                return Err(DomainError::provider("mock", "judge unavailable"));
            }

            let score = self.scores.get(&metric).copied().unwrap_or(self.fallback);
            Ok(MetricScore::new(metric, score))
        }

        fn scorer_name(&self) -> &'static str {
            "mock"
        }
    }
}
