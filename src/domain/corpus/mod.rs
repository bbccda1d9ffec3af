//! Corpus domain - crawled pages and the crawl batch format

mod crawl;
mod document;

pub use crawl::{batch_items, parse_batches, CrawlItem, CrawlMetadata, ParsedCorpus};
pub use document::CorpusDocument;
