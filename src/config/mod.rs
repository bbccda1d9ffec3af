//! Application configuration and environment secrets

mod app_config;

pub use app_config::{
    AppConfig, EvaluationConfig, IndexingConfig, LogFormat, LoggingConfig, OpenAiConfig,
    PineconeConfig, Secrets,
};
