//! Crawl file reading and writing

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::domain::corpus::{parse_batches, ParsedCorpus};
use crate::domain::DomainError;

/// Read the raw batch array of a crawl file
pub async fn read_batches(path: impl AsRef<Path>) -> Result<Vec<Value>, DomainError> {
    let path = path.as_ref();

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::corpus(format!("Failed to read corpus {}: {}", path.display(), e))
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|e| {
        DomainError::corpus(format!("Invalid corpus JSON in {}: {}", path.display(), e))
    })?;

    match value {
        Value::Array(batches) => Ok(batches),
        _ => Err(DomainError::corpus(format!(
            "Corpus {} must contain a JSON array of batches",
            path.display()
        ))),
    }
}

/// Load every well-formed page of a crawl file
pub async fn load_corpus(path: impl AsRef<Path>) -> Result<ParsedCorpus, DomainError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading corpus");

    let batches = read_batches(path).await?;
    Ok(parse_batches(&batches))
}

/// Write batches as pretty-printed JSON, creating parent directories
pub async fn write_batches(path: impl AsRef<Path>, batches: &[Value]) -> Result<(), DomainError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(batches)?;
    tokio::fs::write(path, json).await?;

    info!(path = %path.display(), batches = batches.len(), "Wrote corpus");
    Ok(())
}
