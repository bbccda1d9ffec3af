//! Answer command - run the generator over a test set and store the answers

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::evaluation::{answer_questions, save_answers, TestSetStore, ANSWERS_FILE};

use super::services::Services;

#[derive(Args, Clone)]
pub struct AnswerArgs {
    /// Test set file; defaults to the newest one in the test set directory
    #[arg(long)]
    pub test_set: Option<PathBuf>,

    #[arg(long, default_value = ANSWERS_FILE)]
    pub output: PathBuf,
}

pub async fn run(config: AppConfig, args: AnswerArgs) -> anyhow::Result<()> {
    let store = TestSetStore::new(&config.evaluation.test_sets_dir);
    let test_set = match &args.test_set {
        Some(path) => TestSetStore::load(path).await?,
        None => store.load_latest().await?,
    };
    info!(cases = test_set.len(), model = %test_set.metadata.model, "Loaded test set");

    let services = Services::connect(config).await?;
    let answers = answer_questions(&services.generator(), &test_set.questions).await;

    save_answers(&args.output, &answers).await?;
    println!(
        "Answered {} of {} questions. Saved to {}",
        answers.len(),
        test_set.len(),
        args.output.display()
    );
    Ok(())
}
