//! CLI module for the Toronto safety plan pipeline
//!
//! Subcommands cover the whole lifecycle:
//! - `filter-corpus` and `index` prepare the vector store
//! - `generate` produces a single plan
//! - `generate-test-set`, `answer` and `evaluate` run the evaluation loop

pub mod answer;
pub mod evaluate;
pub mod filter_corpus;
pub mod generate;
pub mod generate_test_set;
pub mod index;
pub mod services;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Toronto safety plan generator - RAG over police and city safety resources
#[derive(Parser)]
#[command(name = "toronto-safety-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Chunk, embed and upsert a crawl file into the vector store
    Index(index::IndexArgs),

    /// Remove pages from excluded domains in a crawl file
    FilterCorpus(filter_corpus::FilterCorpusArgs),

    /// Generate a safety plan for one request
    Generate(generate::GenerateArgs),

    /// Generate answers for every question in a test set
    Answer(answer::AnswerArgs),

    /// Score stored answers and log the run
    Evaluate(evaluate::EvaluateArgs),

    /// Generate a synthetic test set
    GenerateTestSet(generate_test_set::GenerateTestSetArgs),
}

/// Load `.env`, configuration and logging
pub fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    config
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = bootstrap();

    match cli.command {
        Command::Index(args) => index::run(config, args).await,
        Command::FilterCorpus(args) => filter_corpus::run(args).await,
        Command::Generate(args) => generate::run(config, args).await,
        Command::Answer(args) => answer::run(config, args).await,
        Command::Evaluate(args) => evaluate::run(config, args).await,
        Command::GenerateTestSet(args) => generate_test_set::run(config, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "toronto-safety-rag",
            "generate",
            "--neighbourhood",
            "Annex (95)",
            "--concern",
            "Robbery: High",
            "--concern",
            "Assault: Low",
            "--context",
            "Q: Do you walk at night?",
        ])
        .unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.neighbourhood, "Annex (95)");
        assert_eq!(args.concerns, vec!["Robbery: High", "Assault: Low"]);
        assert_eq!(args.context.len(), 1);
        assert_eq!(args.top_k, None);
    }

    #[test]
    fn test_generate_requires_a_concern() {
        assert!(Cli::try_parse_from(["toronto-safety-rag", "generate", "--neighbourhood", "Annex"]).is_err());
    }

    #[test]
    fn test_parse_filter_corpus_excludes() {
        let cli = Cli::try_parse_from([
            "toronto-safety-rag",
            "filter-corpus",
            "--exclude",
            "ttc.ca",
            "--exclude",
            "toronto.ca",
        ])
        .unwrap();

        let Command::FilterCorpus(args) = cli.command else {
            panic!("expected filter-corpus");
        };
        assert_eq!(args.exclude, vec!["ttc.ca", "toronto.ca"]);
        assert_eq!(args.input.to_str(), Some("torontopublicsafetycorpus.json"));
    }

    #[test]
    fn test_parse_evaluation_commands() {
        let cli = Cli::try_parse_from([
            "toronto-safety-rag",
            "evaluate",
            "--notes",
            "k=5",
            "--changes",
            "lower top_k",
        ])
        .unwrap();
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.answers.to_str(), Some("generated_answers.json"));
        assert_eq!(args.changes, "lower top_k");
        assert!(args.test_set.is_none());

        let cli = Cli::try_parse_from(["toronto-safety-rag", "generate-test-set", "--cases-per-type", "3"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::GenerateTestSet(generate_test_set::GenerateTestSetArgs { cases_per_type: 3 })
        ));
    }
}
