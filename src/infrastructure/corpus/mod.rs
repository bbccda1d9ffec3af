//! Crawl file access and filtering

mod filter;
mod json_loader;

pub use filter::{base_domain, DomainFilter, FilterReport, DEFAULT_EXCLUDED_DOMAINS};
pub use json_loader::{load_corpus, read_batches, write_batches};
