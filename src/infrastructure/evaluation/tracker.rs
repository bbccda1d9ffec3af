//! Experiment history across evaluation runs

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::csv_writer::write_records;
use crate::domain::evaluation::{EvaluationRecord, EvaluationSummary, Metric};
use crate::domain::DomainError;

pub const HISTORY_FILE: &str = "improvement_history.csv";

/// Pipeline settings recorded with each run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub retriever_k: usize,
    pub model_name: String,
    pub embedding_model: String,
    pub temperature: f32,
    #[serde(default)]
    pub changes_made: String,
}

/// One row of the improvement history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub experiment_name: String,
    pub faithfulness: Option<f64>,
    pub answer_relevancy: Option<f64>,
    pub context_precision: Option<f64>,
    pub context_recall: Option<f64>,
    pub retriever_k: Option<usize>,
    pub model_name: String,
    pub changes_made: String,
    pub notes: String,
}

impl HistoryEntry {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Faithfulness => self.faithfulness,
            Metric::AnswerRelevancy => self.answer_relevancy,
            Metric::ContextPrecision => self.context_precision,
            Metric::ContextRecall => self.context_recall,
        }
    }
}

/// Writes per-run metrics and configs and appends to the history file
#[derive(Debug, Clone)]
pub struct ExperimentTracker {
    tracking_dir: PathBuf,
    experiment_name: String,
}

impl ExperimentTracker {
    pub fn new(tracking_dir: impl Into<PathBuf>, experiment_name: impl Into<String>) -> Self {
        Self {
            tracking_dir: tracking_dir.into(),
            experiment_name: experiment_name.into(),
        }
    }

    fn history_path(&self) -> PathBuf {
        self.tracking_dir.join(HISTORY_FILE)
    }

    pub fn log_experiment(
        &self,
        records: &[EvaluationRecord],
        summary: &EvaluationSummary,
        config: &ExperimentConfig,
        notes: &str,
    ) -> Result<String, DomainError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.log_experiment_at(&timestamp, records, summary, config, notes)?;
        Ok(timestamp)
    }

    /// Record a run under an explicit timestamp label
    pub fn log_experiment_at(
        &self,
        timestamp: &str,
        records: &[EvaluationRecord],
        summary: &EvaluationSummary,
        config: &ExperimentConfig,
        notes: &str,
    ) -> Result<(), DomainError> {
        let metrics_dir = self.tracking_dir.join("metrics");
        let configs_dir = self.tracking_dir.join("configs");
        std::fs::create_dir_all(&metrics_dir)?;
        std::fs::create_dir_all(&configs_dir)?;

        write_records(metrics_dir.join(format!("metrics_{}.csv", timestamp)), records)?;
        std::fs::write(
            configs_dir.join(format!("config_{}.json", timestamp)),
            serde_json::to_string_pretty(config)?,
        )?;

        let entry = HistoryEntry {
            timestamp: timestamp.to_string(),
            experiment_name: self.experiment_name.clone(),
            faithfulness: summary.mean(Metric::Faithfulness),
            answer_relevancy: summary.mean(Metric::AnswerRelevancy),
            context_precision: summary.mean(Metric::ContextPrecision),
            context_recall: summary.mean(Metric::ContextRecall),
            retriever_k: Some(config.retriever_k),
            model_name: config.model_name.clone(),
            changes_made: config.changes_made.clone(),
            notes: notes.to_string(),
        };
        self.append(&entry)?;

        info!(
            experiment = %self.experiment_name,
            timestamp,
            "Logged experiment"
        );
        Ok(())
    }

    fn append(&self, entry: &HistoryEntry) -> Result<(), DomainError> {
        let path = self.history_path();
        let is_new = is_missing_or_empty(&path);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);

        writer.serialize(entry)?;
        writer.flush()?;
        Ok(())
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, DomainError> {
        read_history(&self.history_path())
    }

    /// Last run minus first run for each metric; `None` with fewer than two runs
    pub fn improvement_summary(&self) -> Result<Option<BTreeMap<Metric, f64>>, DomainError> {
        let history = self.history()?;

        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Ok(None);
        };
        if history.len() < 2 {
            return Ok(None);
        }

        let deltas = Metric::ALL
            .into_iter()
            .filter_map(|metric| Some((metric, last.metric(metric)? - first.metric(metric)?)))
            .collect();

        Ok(Some(deltas))
    }
}

/// A history file with no bytes has no header yet
fn is_missing_or_empty(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}

fn read_history(path: &Path) -> Result<Vec<HistoryEntry>, DomainError> {
    if is_missing_or_empty(path) {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let entries = reader.deserialize().collect::<Result<Vec<HistoryEntry>, _>>()?;
    Ok(entries)
}
