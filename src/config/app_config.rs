use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::ingestion::ChunkingConfig;
use crate::domain::safety_plan::GeneratorConfig;
use crate::domain::DomainError;
use crate::infrastructure::ingestion::IndexingOptions;
use crate::infrastructure::llm::DEFAULT_OPENAI_BASE_URL;
use crate::infrastructure::vector_store::PINECONE_CONTROL_PLANE_URL;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub pinecone: PineconeConfig,
    pub generator: GeneratorConfig,
    pub evaluation: EvaluationConfig,
    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: Option<usize>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub namespace: Option<String>,
    /// Skips the control-plane lookup when set
    pub index_host: Option<String>,
    pub control_plane_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub test_sets_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tracking_dir: PathBuf,
    pub experiment_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embedding_batch_size: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-large".to_string(),
            embedding_dimensions: None,
            timeout_secs: 120,
        }
    }
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            index_host: None,
            control_plane_url: PINECONE_CONTROL_PLANE_URL.to_string(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            test_sets_dir: PathBuf::from("test_sets"),
            output_dir: PathBuf::from("evaluation_results"),
            tracking_dir: PathBuf::from("rag_tracking"),
            experiment_name: "safety_plan_rag".to_string(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();
        Self {
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            embedding_batch_size: 100,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Generator settings with the model names taken from the `openai` section
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            chat_model: self.openai.chat_model.clone(),
            embedding_model: self.openai.embedding_model.clone(),
            embedding_dimensions: self.openai.embedding_dimensions,
            ..self.generator.clone()
        }
    }

    pub fn indexing_options(&self) -> IndexingOptions {
        IndexingOptions {
            chunking: ChunkingConfig::new(self.indexing.chunk_size, self.indexing.chunk_overlap),
            embedding_model: self.openai.embedding_model.clone(),
            embedding_dimensions: self.openai.embedding_dimensions,
            embedding_batch_size: self.indexing.embedding_batch_size,
        }
    }
}

/// Credentials read from the environment, never from config files
#[derive(Clone)]
pub struct Secrets {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_index_name: String,
    pub pinecone_index_host: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("openai_api_key", &"[REDACTED]")
            .field("pinecone_api_key", &"[REDACTED]")
            .field("pinecone_index_name", &self.pinecone_index_name)
            .field("pinecone_index_host", &self.pinecone_index_host)
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration(format!("missing environment variable {}", key))
                })
        };

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            pinecone_api_key: required("PINECONE_API_KEY")?,
            pinecone_index_name: required("PINECONE_INDEX_NAME")?,
            pinecone_index_host: lookup("PINECONE_INDEX_HOST").filter(|h| !h.trim().is_empty()),
        })
    }
}
