//! Filter-corpus command - drop pages from excluded domains

use std::path::PathBuf;

use clap::Args;

use crate::infrastructure::corpus::{read_batches, write_batches, DomainFilter};

#[derive(Args, Clone)]
pub struct FilterCorpusArgs {
    #[arg(long, default_value = "torontopublicsafetycorpus.json")]
    pub input: PathBuf,

    #[arg(long, default_value = "non_copyrighted_torontopublicsafetycorpus.json")]
    pub output: PathBuf,

    /// Base domain to exclude; replaces the default list when given
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
}

pub async fn run(args: FilterCorpusArgs) -> anyhow::Result<()> {
    let filter = if args.exclude.is_empty() {
        DomainFilter::default()
    } else {
        DomainFilter::new(args.exclude.iter().map(|d| d.to_lowercase()))
    };

    let batches = read_batches(&args.input).await?;
    let report = filter.filter(&batches);
    write_batches(&args.output, &report.batches).await?;

    println!("All base domains found:");
    for domain in &report.all_domains {
        println!("  {}", domain);
    }
    println!("\nDomains kept:");
    for domain in &report.kept_domains {
        println!("  {}", domain);
    }
    println!(
        "\nKept {} documents, excluded {}, {} without metadata. Written to {}",
        report.kept(),
        report.excluded,
        report.unattributed,
        args.output.display()
    );
    Ok(())
}
