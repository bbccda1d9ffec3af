//! Evaluation records, aggregation and quality analysis

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Metric;

const HIGH_SCORE: f64 = 0.9;
const LOW_SCORE: f64 = 0.7;

/// Generated plan text keyed by the question that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedAnswers(BTreeMap<String, String>);

impl GeneratedAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.0.insert(question.into(), answer.into());
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0.get(question).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metric values for one evaluated question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub scores: BTreeMap<Metric, f64>,
}

impl EvaluationRecord {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            scores: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, metric: Metric, score: f64) -> Self {
        self.scores.insert(metric, score);
        self
    }

    pub fn score(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied()
    }
}

/// Mean of each metric across a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub count: usize,
    pub means: BTreeMap<Metric, f64>,
}

impl EvaluationSummary {
    /// Metrics with no recorded value are left out
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let means = Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                let values: Vec<f64> = records.iter().filter_map(|r| r.score(metric)).collect();
                if values.is_empty() {
                    None
                } else {
                    Some((metric, values.iter().sum::<f64>() / values.len() as f64))
                }
            })
            .collect();

        Self {
            count: records.len(),
            means,
        }
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means.get(&metric).copied()
    }

    /// Mean of the metric means
    pub fn overall(&self) -> Option<f64> {
        if self.means.is_empty() {
            return None;
        }
        Some(self.means.values().sum::<f64>() / self.means.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Suspiciously high, worth checking for leakage or a lenient judge
    Warning,
    Suggestion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityFinding {
    pub metric: Metric,
    pub kind: FindingKind,
    pub score: f64,
    pub message: String,
}

impl fmt::Display for QualityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3}): {}", self.metric, self.score, self.message)
    }
}

pub fn analyze_quality(summary: &EvaluationSummary) -> Vec<QualityFinding> {
    summary
        .means
        .iter()
        .filter_map(|(&metric, &score)| {
            if score > HIGH_SCORE {
                Some(QualityFinding {
                    metric,
                    kind: FindingKind::Warning,
                    score,
                    message: format!("Unusually high {} score - verify evaluation", metric),
                })
            } else if score < LOW_SCORE {
                Some(QualityFinding {
                    metric,
                    kind: FindingKind::Suggestion,
                    score,
                    message: metric.improvement_hint().to_string(),
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<EvaluationRecord> {
        vec![
            EvaluationRecord::new("q1")
                .with_score(Metric::Faithfulness, 0.8)
                .with_score(Metric::AnswerRelevancy, 0.95)
                .with_score(Metric::ContextPrecision, 0.5),
            EvaluationRecord::new("q2")
                .with_score(Metric::Faithfulness, 0.7)
                .with_score(Metric::AnswerRelevancy, 0.93)
                .with_score(Metric::ContextPrecision, 0.7),
        ]
    }

    #[test]
    fn test_means_per_metric() {
        let summary = EvaluationSummary::from_records(&records());

        assert_eq!(summary.count, 2);
        assert!((summary.mean(Metric::Faithfulness).unwrap() - 0.75).abs() < 1e-9);
        assert!((summary.mean(Metric::AnswerRelevancy).unwrap() - 0.94).abs() < 1e-9);
        assert!((summary.mean(Metric::ContextPrecision).unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(summary.mean(Metric::ContextRecall), None);
        assert!((summary.overall().unwrap() - (0.75 + 0.94 + 0.6) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = EvaluationSummary::from_records(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.means.is_empty());
        assert_eq!(summary.overall(), None);
    }

    #[test]
    fn test_quality_findings() {
        let summary = EvaluationSummary::from_records(&records());
        let findings = analyze_quality(&summary);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].metric, Metric::AnswerRelevancy);
        assert_eq!(findings[0].kind, FindingKind::Warning);
        assert_eq!(findings[1].metric, Metric::ContextPrecision);
        assert_eq!(findings[1].kind, FindingKind::Suggestion);
        assert_eq!(
            findings[1].message,
            "Adjust retrieval strategy or expand knowledge base"
        );
    }

    #[test]
    fn test_generated_answers_json_shape() {
        let mut answers = GeneratedAnswers::new();
        answers.insert("q1", "plan one");

        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"q1":"plan one"}"#);

        let parsed: GeneratedAnswers = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.get("q1"), Some("plan one"));
        assert_eq!(parsed.get("q2"), None);
    }
}
