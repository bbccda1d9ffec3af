//! Index command - chunk, embed and upsert a crawl file

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::infrastructure::corpus::load_corpus;

use super::services::Services;

#[derive(Args, Clone)]
pub struct IndexArgs {
    /// Crawl JSON file (array of batches)
    #[arg(long, default_value = "non_copyrighted_torontopublicsafetycorpus.json")]
    pub corpus: PathBuf,
}

pub async fn run(config: AppConfig, args: IndexArgs) -> anyhow::Result<()> {
    let services = Services::connect(config).await?;

    let corpus = load_corpus(&args.corpus).await?;
    info!(
        documents = corpus.documents.len(),
        skipped = corpus.skipped,
        path = %args.corpus.display(),
        "Loaded corpus"
    );

    let report = services.indexing_pipeline().index(&corpus.documents).await?;

    if !report.is_complete() {
        warn!(
            chunks = report.chunks,
            upserted = report.upserted,
            "Vector store acknowledged fewer chunks than were sent"
        );
    }

    println!(
        "Indexed {} documents: {} chunks, {} upserted, {} blank skipped, {} earlier vectors replaced",
        report.documents, report.chunks, report.upserted, report.skipped_blank, report.replaced
    );
    Ok(())
}
