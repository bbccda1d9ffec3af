//! Generate-test-set command

use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::evaluation::TestSetStore;

use super::services::Services;

#[derive(Args, Clone)]
pub struct GenerateTestSetArgs {
    #[arg(long, default_value_t = 2)]
    pub cases_per_type: usize,
}

pub async fn run(config: AppConfig, args: GenerateTestSetArgs) -> anyhow::Result<()> {
    let store = TestSetStore::new(&config.evaluation.test_sets_dir);
    let services = Services::connect(config).await?;

    let test_set = services
        .test_set_generator()
        .generate(args.cases_per_type)
        .await;

    if test_set.is_empty() {
        anyhow::bail!("No test cases could be generated");
    }

    let path = store.save(&test_set).await?;
    println!("Saved {} test cases to {}", test_set.len(), path.display());
    Ok(())
}
