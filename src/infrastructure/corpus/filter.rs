//! Domain-based corpus filtering

use std::collections::{BTreeSet, HashSet};

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::corpus::{batch_items, CrawlMetadata};

/// Base domains excluded from the published corpus by default
pub const DEFAULT_EXCLUDED_DOMAINS: [&str; 3] = ["retailcouncil.org", "toronto.ca", "ttc.ca"];

/// Last two labels of the URL host, lowercased; empty when the URL does not parse
pub fn base_domain(url: &str) -> String {
    let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
        Some(host) => host,
        None => return String::new(),
    };

    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Result of filtering crawl batches
#[derive(Debug, Clone, Default)]
pub struct FilterReport {
    pub batches: Vec<Value>,
    pub excluded: usize,
    /// Items with no metadata object, dropped because they cannot be attributed
    pub unattributed: usize,
    pub all_domains: BTreeSet<String>,
    pub kept_domains: BTreeSet<String>,
}

impl FilterReport {
    pub fn kept(&self) -> usize {
        self.batches.iter().map(|b| batch_items(b).len()).sum()
    }
}

/// Removes crawl items whose base domain is excluded
#[derive(Debug, Clone)]
pub struct DomainFilter {
    excluded: HashSet<String>,
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_DOMAINS.iter().map(|d| d.to_string()))
    }
}

impl DomainFilter {
    pub fn new(excluded: impl IntoIterator<Item = String>) -> Self {
        Self {
            excluded: excluded.into_iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    pub fn is_excluded(&self, base_domain: &str) -> bool {
        self.excluded.contains(base_domain)
    }

    fn item_domain(item: &Value) -> Option<String> {
        let metadata = item.get("metadata")?;
        let metadata: CrawlMetadata = serde_json::from_value(metadata.clone()).unwrap_or_default();
        Some(base_domain(metadata.resolved_url()))
    }

    /// Filter batches, dropping any batch left without items
    pub fn filter(&self, batches: &[Value]) -> FilterReport {
        let mut report = FilterReport::default();

        for batch in batches {
            let mut kept_items = Vec::new();

            for item in batch_items(batch) {
                let Some(domain) = Self::item_domain(item) else {
                    report.unattributed += 1;
                    continue;
                };

                report.all_domains.insert(domain.clone());

                if self.is_excluded(&domain) {
                    debug!(domain = %domain, "Excluding document");
                    report.excluded += 1;
                    continue;
                }

                report.kept_domains.insert(domain);
                kept_items.push(item.clone());
            }

            if kept_items.is_empty() {
                continue;
            }

            let mut filtered = batch.clone();
            if let Some(object) = filtered.as_object_mut() {
                object.insert("data".to_string(), Value::Array(kept_items));
            }
            report.batches.push(filtered);
        }

        info!(
            excluded = report.excluded,
            kept = report.kept(),
            domains = report.kept_domains.len(),
            "Filtering complete"
        );

        report
    }
}
