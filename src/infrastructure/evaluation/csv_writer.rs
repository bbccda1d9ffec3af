//! CSV reports of evaluation runs

use std::path::Path;

use crate::domain::evaluation::{EvaluationRecord, EvaluationSummary, Metric};
use crate::domain::DomainError;

fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{:.4}", s)).unwrap_or_default()
}

fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(csv::Writer::from_path(path)?)
}

/// One row per question; a metric that could not be scored is left blank
pub fn write_records(path: impl AsRef<Path>, records: &[EvaluationRecord]) -> Result<(), DomainError> {
    let mut writer = create_writer(path.as_ref())?;

    let mut header = vec!["question"];
    header.extend(Metric::ALL.iter().map(|m| m.as_str()));
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.question.clone()];
        row.extend(Metric::ALL.iter().map(|&m| format_score(record.score(m))));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// `metric,mean` rows followed by the overall mean
pub fn write_summary(path: impl AsRef<Path>, summary: &EvaluationSummary) -> Result<(), DomainError> {
    let mut writer = create_writer(path.as_ref())?;

    writer.write_record(["metric", "mean"])?;
    for metric in Metric::ALL {
        writer.write_record([metric.as_str(), format_score(summary.mean(metric)).as_str()])?;
    }
    writer.write_record(["overall", format_score(summary.overall()).as_str()])?;

    writer.flush()?;
    Ok(())
}
