//! Generator settings

use serde::{Deserialize, Serialize};

use super::RetryConfig;

/// Models and retrieval depth used to produce a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub top_k: usize,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: Option<usize>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub retry: RetryConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-large".to_string(),
            embedding_dimensions: None,
            temperature: 0.0,
            max_tokens: None,
            retry: RetryConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.top_k, 10);
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.embedding_model, "text-embedding-3-large");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"top_k": 4}"#).unwrap();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.chat_model, "gpt-4o");
    }
}
