//! Crawl batch file format
//!
//! The crawler writes a JSON array of batches. Each batch may carry a `data`
//! array of scraped items, each with `markdown` content and a `metadata`
//! object holding `sourceURL` (or `url`) and an optional `title`.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::CorpusDocument;

/// Metadata attached to a scraped page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlMetadata {
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl CrawlMetadata {
    /// `sourceURL`, falling back to `url`, falling back to empty
    pub fn resolved_url(&self) -> &str {
        self.source_url
            .as_deref()
            .or(self.url.as_deref())
            .unwrap_or_default()
    }
}

/// A well-formed scraped page
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlItem {
    pub markdown: String,
    pub metadata: CrawlMetadata,
}

impl CrawlItem {
    /// Interpret a raw item, returning `None` when it lacks content or metadata
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn into_document(self) -> CorpusDocument {
        let source_url = self.metadata.resolved_url().to_string();
        CorpusDocument {
            content: self.markdown,
            source_url,
            title: self.metadata.title.unwrap_or_default(),
        }
    }
}

/// Documents extracted from crawl batches along with the number of dropped items
#[derive(Debug, Clone, Default)]
pub struct ParsedCorpus {
    pub documents: Vec<CorpusDocument>,
    pub skipped: usize,
}

/// Raw items of a batch, empty when the batch has no `data` array
pub fn batch_items(batch: &Value) -> &[Value] {
    batch
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Flatten crawl batches into documents, skipping malformed items
pub fn parse_batches(batches: &[Value]) -> ParsedCorpus {
    let mut parsed = ParsedCorpus::default();

    for item in batches.iter().flat_map(batch_items) {
        match CrawlItem::from_value(item) {
            Some(item) => parsed.documents.push(item.into_document()),
            None => parsed.skipped += 1,
        }
    }

    if parsed.skipped > 0 {
        debug!("Skipped {} malformed corpus items", parsed.skipped);
    }
    info!("Loaded {} documents", parsed.documents.len());

    parsed
}
