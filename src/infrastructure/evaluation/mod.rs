//! Evaluation harness - answering, judging, persistence and tracking

mod csv_writer;
mod llm_judge;
mod runner;
mod test_set_generator;
mod test_set_store;
mod tracker;

pub use csv_writer::{write_records, write_summary};
pub use llm_judge::LlmJudgeScorer;
pub use runner::{answer_questions, evaluate};
pub use test_set_generator::{
    TestSetGenerator, TestSetGeneratorConfig, CRIME_TYPES, RISK_LEVELS, TORONTO_NEIGHBOURHOODS,
};
pub use test_set_store::{load_answers, save_answers, TestSetStore, ANSWERS_FILE};
pub use tracker::{ExperimentConfig, ExperimentTracker, HistoryEntry, HISTORY_FILE};
