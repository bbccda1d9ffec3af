//! Evaluation domain - question sets, metrics and run summaries

mod metric;
mod result;
mod test_set;

pub use metric::{EvaluationSample, Metric, MetricScore, MetricScorer};
pub use result::{
    analyze_quality, EvaluationRecord, EvaluationSummary, FindingKind, GeneratedAnswers,
    QualityFinding,
};
pub use test_set::{
    StructuredInput, TestCase, TestCaseMetadata, TestSet, TestSetMetadata, SCENARIO_TYPES,
    TEST_SET_VERSION,
};

#[cfg(test)]
pub use metric::mock::MockMetricScorer;
