//! Provider wiring shared by the commands

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{AppConfig, Secrets};
use crate::domain::prompt::{builtin_registry, TemplateRegistry};
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::evaluation::{LlmJudgeScorer, TestSetGenerator, TestSetGeneratorConfig};
use crate::infrastructure::ingestion::IndexingPipeline;
use crate::infrastructure::llm::{HttpClient, OpenAiProvider};
use crate::infrastructure::safety_plan::{LlmPlanStages, SafetyPlanGenerator};
use crate::infrastructure::vector_store::PineconeVectorStore;

pub type Llm = OpenAiProvider<HttpClient>;
pub type Embedder = OpenAiEmbeddingProvider<HttpClient>;
pub type Store = PineconeVectorStore<HttpClient>;
pub type Generator = SafetyPlanGenerator<Embedder, Store, LlmPlanStages<Llm>>;

/// Connected providers plus the configuration they were built from
pub struct Services {
    pub config: AppConfig,
    pub llm: Arc<Llm>,
    pub embedder: Arc<Embedder>,
    pub store: Arc<Store>,
    pub templates: Arc<TemplateRegistry>,
}

impl Services {
    /// Read secrets and connect every provider. Fails before any network call
    /// when a required environment variable is missing.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let secrets = Secrets::from_env()?;
        let client = HttpClient::with_timeout(Duration::from_secs(config.openai.timeout_secs))?;

        let llm = OpenAiProvider::with_base_url(
            client.clone(),
            secrets.openai_api_key.as_str(),
            config.openai.base_url.as_str(),
        );
        let embedder = OpenAiEmbeddingProvider::with_base_url(
            client.clone(),
            secrets.openai_api_key.as_str(),
            config.openai.base_url.as_str(),
        );

        let host = secrets
            .pinecone_index_host
            .clone()
            .or_else(|| config.pinecone.index_host.clone());

        let mut store = match host {
            Some(host) => PineconeVectorStore::new(
                client,
                secrets.pinecone_api_key.as_str(),
                secrets.pinecone_index_name.as_str(),
                host,
            ),
            None => {
                PineconeVectorStore::connect(
                    client,
                    secrets.pinecone_api_key.as_str(),
                    secrets.pinecone_index_name.as_str(),
                    &config.pinecone.control_plane_url,
                )
                .await?
            }
        };
        if let Some(namespace) = &config.pinecone.namespace {
            store = store.with_namespace(namespace.as_str());
        }

        info!(
            index = %secrets.pinecone_index_name,
            host = %store.host(),
            chat_model = %config.openai.chat_model,
            "Providers ready"
        );

        Ok(Self {
            config,
            llm: Arc::new(llm),
            embedder: Arc::new(embedder),
            store: Arc::new(store),
            templates: Arc::new(builtin_registry()?),
        })
    }

    pub fn generator(&self) -> Generator {
        let config = self.config.generator_config();
        let stages = LlmPlanStages::new(
            self.llm.clone(),
            self.templates.clone(),
            config.chat_model.as_str(),
        )
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

        SafetyPlanGenerator::new(
            self.embedder.clone(),
            self.store.clone(),
            Arc::new(stages),
            config,
        )
    }

    pub fn indexing_pipeline(&self) -> IndexingPipeline<Embedder, Store> {
        IndexingPipeline::new(
            self.embedder.clone(),
            self.store.clone(),
            self.config.indexing_options(),
        )
    }

    pub fn judge(&self) -> LlmJudgeScorer<Llm> {
        LlmJudgeScorer::new(
            self.llm.clone(),
            self.templates.clone(),
            self.config.openai.chat_model.as_str(),
        )
    }

    pub fn test_set_generator(&self) -> TestSetGenerator<Llm, Embedder, Store> {
        let config = TestSetGeneratorConfig {
            chat_model: self.config.openai.chat_model.clone(),
            embedding_model: self.config.openai.embedding_model.clone(),
            embedding_dimensions: self.config.openai.embedding_dimensions,
            ..Default::default()
        };

        TestSetGenerator::new(
            self.llm.clone(),
            self.embedder.clone(),
            self.store.clone(),
            self.templates.clone(),
            config,
        )
    }
}
