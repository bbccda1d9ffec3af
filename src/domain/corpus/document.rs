use serde::{Deserialize, Serialize};

/// A crawled page ready for chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub content: String,
    pub source_url: String,
    pub title: String,
}

impl CorpusDocument {
    pub fn new(
        content: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            source_url: source_url.into(),
            title: title.into(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
