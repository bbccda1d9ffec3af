//! Test set and generated answer files

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;

use crate::domain::evaluation::{GeneratedAnswers, TestSet};
use crate::domain::DomainError;

const TEST_SET_PREFIX: &str = "test_set_v2_";
pub const ANSWERS_FILE: &str = "generated_answers.json";

/// Directory of versioned test set files
#[derive(Debug, Clone)]
pub struct TestSetStore {
    dir: PathBuf,
}

impl TestSetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<TestSet, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::not_found(format!("Test set {} unreadable: {}", path.display(), e))
        })?;

        let test_set: TestSet = serde_json::from_str(&raw)?;
        info!(path = %path.display(), questions = test_set.len(), "Loaded test set");
        Ok(test_set)
    }

    /// Path of the most recently modified `test_set_v2_*.json`
    pub async fn latest_path(&self) -> Result<PathBuf, DomainError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            DomainError::not_found(format!(
                "Test set directory {} unreadable: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut latest: Option<(SystemTime, PathBuf)> = None;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(TEST_SET_PREFIX) || !name.ends_with(".json") {
                continue;
            }

            let modified = entry.metadata().await?.modified()?;
            let candidate = (modified, entry.path());
            if latest.as_ref().is_none_or(|current| candidate > *current) {
                latest = Some(candidate);
            }
        }

        latest.map(|(_, path)| path).ok_or_else(|| {
            DomainError::not_found(format!("No test sets found in {}", self.dir.display()))
        })
    }

    pub async fn load_latest(&self) -> Result<TestSet, DomainError> {
        let path = self.latest_path().await?;
        Self::load(path).await
    }

    /// Write `test_set_v2_{timestamp}.json`, named after the generation time
    pub async fn save(&self, test_set: &TestSet) -> Result<PathBuf, DomainError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!(
            "{}{}.json",
            TEST_SET_PREFIX,
            test_set.metadata.generated_at.format("%Y%m%d_%H%M%S")
        );
        let path = self.dir.join(name);

        tokio::fs::write(&path, serde_json::to_string_pretty(test_set)?).await?;
        info!(path = %path.display(), questions = test_set.len(), "Saved test set");

        Ok(path)
    }
}

pub async fn save_answers(
    path: impl AsRef<Path>,
    answers: &GeneratedAnswers,
) -> Result<(), DomainError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, serde_json::to_string_pretty(answers)?).await?;
    info!(path = %path.display(), answers = answers.len(), "Saved generated answers");
    Ok(())
}

pub async fn load_answers(path: impl AsRef<Path>) -> Result<GeneratedAnswers, DomainError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|_| {
        DomainError::not_found(format!(
            "Generated answers not found at {}; run the answer command first",
            path.display()
        ))
    })?;

    Ok(serde_json::from_str(&raw)?)
}
