//! Generate command - produce one safety plan

use clap::Args;

use crate::config::AppConfig;
use crate::domain::safety_plan::SafetyPlanRequest;

use super::services::Services;

#[derive(Args, Clone)]
pub struct GenerateArgs {
    /// Neighbourhood name, e.g. "Agincourt North (129)"
    #[arg(long)]
    pub neighbourhood: String,

    /// Crime concern as "Crime: Severity", repeatable
    #[arg(long = "concern", required = true)]
    pub concerns: Vec<String>,

    /// Additional context line, repeatable ("Q: ..." / "A: ...")
    #[arg(long = "context")]
    pub context: Vec<String>,

    /// Override the number of retrieved chunks
    #[arg(long)]
    pub top_k: Option<usize>,
}

pub async fn run(mut config: AppConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let request = SafetyPlanRequest::new(args.neighbourhood, args.concerns).with_context(args.context);
    request.validate()?;

    if let Some(top_k) = args.top_k {
        config.generator.top_k = top_k;
    }

    let services = Services::connect(config).await?;
    let plan = services.generator().generate(&request).await?;

    println!("{}", plan);
    Ok(())
}
