//! OpenAI embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::HttpClientTrait;
use crate::domain::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;
use crate::infrastructure::llm::DEFAULT_OPENAI_BASE_URL;

/// OpenAI embedding provider
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model(),
            "input": request.inputs(),
        });

        if let Some(dims) = request.dimensions() {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        expected: usize,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        if response.data.len() != expected {
            return Err(DomainError::provider(
                "openai",
                format!(
                    "Expected {} embeddings, received {}",
                    expected,
                    response.data.len()
                ),
            ));
        }

        let embeddings: Vec<Embedding> = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();

        let total_tokens = response.usage.map(|u| u.total_tokens).unwrap_or_default();

        Ok(EmbeddingResponse::new(response.model, embeddings, total_tokens))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        if request.is_empty() {
            return Ok(EmbeddingResponse::new(request.model(), vec![], 0));
        }

        let url = self.embeddings_url();
        let body = self.build_request(&request);

        debug!(model = %request.model(), inputs = request.len(), "Requesting embeddings");

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await?;

        self.parse_response(response, request.len())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: String,
    data: Vec<OpenAiEmbeddingData>,
    usage: Option<OpenAiEmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingUsage {
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::{HttpClient, MockHttpClient};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";
    const MODEL: &str = "text-embedding-3-large";

    fn create_mock_response(indices: &[usize], dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = indices
            .iter()
            .map(|&i| {
                let embedding: Vec<f32> = (0..dimensions).map(|j| (i + j) as f32 * 0.001).collect();
                serde_json::json!({
                    "index": i,
                    "embedding": embedding,
                    "object": "embedding"
                })
            })
            .collect();

        serde_json::json!({
            "model": MODEL,
            "data": data,
            "usage": { "prompt_tokens": 10, "total_tokens": 10 }
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[0], 8));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::single(MODEL, "Lock your car");
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.model(), MODEL);
        assert_eq!(response.embeddings().len(), 1);
        assert_eq!(response.embeddings()[0].vector().len(), 8);
        assert_eq!(response.total_tokens(), 10);
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[2, 0, 1], 4));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::batch(MODEL, vec!["a".into(), "b".into(), "c".into()]);
        let vectors = provider.embed(request).await.unwrap().into_vectors();

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0][0], 0.0);
        assert_eq!(vectors[1][0], 0.001);
        assert_eq!(vectors[2][0], 0.002);
    }

    #[tokio::test]
    async fn test_request_body_carries_dimensions() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[0], 4));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::single(MODEL, "Hello").with_dimensions(Some(4));
        provider.embed(request).await.unwrap();

        let body = &provider.client.bodies_for(TEST_URL)[0];
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["input"], serde_json::json!(["Hello"]));
        assert_eq!(body["dimensions"], 4);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_an_error() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(&[0], 4));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::batch(MODEL, vec!["a".into(), "b".into()]);
        assert!(provider.embed(request).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_call() {
        let provider = OpenAiEmbeddingProvider::new(MockHttpClient::new(), "test-api-key");

        let response = provider
            .embed(EmbeddingRequest::batch(MODEL, vec![]))
            .await
            .unwrap();

        assert!(response.embeddings().is_empty());
        assert!(provider.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let result = provider.embed(EmbeddingRequest::single(MODEL, "Hello")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_embed_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_mock_response(&[0], 3)))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::with_base_url(HttpClient::new(), "sk-test", server.uri());
        let response = provider
            .embed(EmbeddingRequest::single(MODEL, "Test"))
            .await
            .unwrap();

        assert_eq!(response.embeddings()[0].vector().len(), 3);
        assert_eq!(provider.provider_name(), "openai");
    }
}
