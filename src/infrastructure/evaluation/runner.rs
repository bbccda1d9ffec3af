//! Answer generation and metric scoring over a test set

use tracing::{info, warn};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::evaluation::{
    EvaluationRecord, EvaluationSample, GeneratedAnswers, Metric, MetricScorer, TestCase,
};
use crate::domain::safety_plan::PlanStages;
use crate::domain::vector_store::VectorStore;
use crate::infrastructure::safety_plan::SafetyPlanGenerator;

/// Run the generator once per test case, in order, keyed by question text
pub async fn answer_questions<E, V, S>(
    generator: &SafetyPlanGenerator<E, V, S>,
    test_cases: &[TestCase],
) -> GeneratedAnswers
where
    E: EmbeddingProvider,
    V: VectorStore,
    S: PlanStages,
{
    let mut answers = GeneratedAnswers::new();

    for (i, case) in test_cases.iter().enumerate() {
        info!(
            case = i + 1,
            total = test_cases.len(),
            neighbourhood = %case.metadata.structured_input.neighbourhood,
            "Generating answer"
        );

        match generator.generate(&case.to_request()).await {
            Ok(plan) => answers.insert(case.question.clone(), plan.render()),
            Err(e) => warn!(case = i + 1, error = %e, "Skipping test case"),
        }
    }

    info!(answered = answers.len(), total = test_cases.len(), "Answers generated");
    answers
}

/// Score every answered test case on all four metrics
pub async fn evaluate<M>(
    scorer: &M,
    test_cases: &[TestCase],
    answers: &GeneratedAnswers,
) -> Vec<EvaluationRecord>
where
    M: MetricScorer + ?Sized,
{
    let mut records = Vec::new();

    for case in test_cases {
        let Some(answer) = answers.get(&case.question) else {
            warn!(question = %preview(&case.question), "No generated answer, skipping");
            continue;
        };

        let sample = EvaluationSample::new(
            case.question.clone(),
            answer,
            case.ground_truth_context.clone(),
            case.ground_truth_text(),
        );

        let mut record = EvaluationRecord::new(case.question.clone());
        for metric in Metric::ALL {
            match scorer.score(metric, &sample).await {
                Ok(score) => record = record.with_score(metric, score.score),
                Err(e) => warn!(
                    metric = %metric,
                    scorer = scorer.scorer_name(),
                    error = %e,
                    "Metric failed"
                ),
            }
        }
        records.push(record);
    }

    info!(evaluated = records.len(), "Evaluation complete");
    records
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}
