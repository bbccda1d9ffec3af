//! Evaluate command - judge stored answers and track the run

use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::evaluation::{analyze_quality, EvaluationSummary, Metric};
use crate::infrastructure::evaluation::{
    evaluate, load_answers, write_records, write_summary, ExperimentConfig, ExperimentTracker,
    TestSetStore, ANSWERS_FILE,
};

use super::services::Services;

#[derive(Args, Clone)]
pub struct EvaluateArgs {
    /// Test set file; defaults to the newest one in the test set directory
    #[arg(long)]
    pub test_set: Option<PathBuf>,

    #[arg(long, default_value = ANSWERS_FILE)]
    pub answers: PathBuf,

    /// Free-form notes stored with the run
    #[arg(long, default_value = "")]
    pub notes: String,

    /// What changed since the previous run
    #[arg(long, default_value = "")]
    pub changes: String,
}

pub async fn run(config: AppConfig, args: EvaluateArgs) -> anyhow::Result<()> {
    let store = TestSetStore::new(&config.evaluation.test_sets_dir);
    let test_set = match &args.test_set {
        Some(path) => TestSetStore::load(path).await?,
        None => store.load_latest().await?,
    };
    let answers = load_answers(&args.answers).await?;
    info!(cases = test_set.len(), answers = answers.len(), "Loaded evaluation inputs");

    let services = Services::connect(config).await?;
    let records = evaluate(&services.judge(), &test_set.questions, &answers).await;
    if records.is_empty() {
        anyhow::bail!("No test case had a generated answer; run the answer command first");
    }

    let summary = EvaluationSummary::from_records(&records);
    let evaluation = &services.config.evaluation;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let results_path = evaluation
        .output_dir
        .join(format!("evaluation_results_{}.csv", timestamp));
    let summary_path = evaluation
        .output_dir
        .join(format!("evaluation_summary_{}.csv", timestamp));
    write_records(&results_path, &records)?;
    write_summary(&summary_path, &summary)?;

    print_summary(&summary);

    let generator = services.config.generator_config();
    let tracker = ExperimentTracker::new(&evaluation.tracking_dir, evaluation.experiment_name.as_str());
    tracker.log_experiment(
        &records,
        &summary,
        &ExperimentConfig {
            retriever_k: generator.top_k,
            model_name: generator.chat_model,
            embedding_model: generator.embedding_model,
            temperature: generator.temperature,
            changes_made: args.changes,
        },
        &args.notes,
    )?;

    if let Some(deltas) = tracker.improvement_summary()? {
        println!("\nChange since first tracked run:");
        for (metric, delta) in deltas {
            println!("  {:<20} {:+.3}", metric.as_str(), delta);
        }
    }

    println!("\nResults written to {}", results_path.display());
    Ok(())
}

fn print_summary(summary: &EvaluationSummary) {
    println!("Evaluation over {} questions", summary.count);
    for metric in Metric::ALL {
        match summary.mean(metric) {
            Some(mean) => println!("  {:<20} {:.3}", metric.as_str(), mean),
            None => println!("  {:<20} n/a", metric.as_str()),
        }
    }
    if let Some(overall) = summary.overall() {
        println!("  {:<20} {:.3}", "overall", overall);
    }

    let findings = analyze_quality(summary);
    if !findings.is_empty() {
        println!("\nQuality analysis:");
        for finding in findings {
            println!("  {}", finding);
        }
    }
}
