//! Pinecone serverless index over its data plane REST API

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::vector_store::{
    sort_by_score, ScoredChunk, UpsertResult, VectorRecord, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

pub const PINECONE_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Largest number of vectors sent in one upsert call
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Largest number of ids sent in one delete call
pub const DELETE_BATCH_SIZE: usize = 1000;

/// Pinecone index client
#[derive(Debug)]
pub struct PineconeVectorStore<C: HttpClientTrait> {
    client: C,
    api_key: String,
    index_name: String,
    host: String,
    namespace: String,
}

impl<C: HttpClientTrait> PineconeVectorStore<C> {
    pub fn new(
        client: C,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            index_name: index_name.into(),
            host: normalize_host(&host.into()),
            namespace: String::new(),
        }
    }

    /// Look up the index host through the control plane
    pub async fn connect(
        client: C,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
        control_plane_url: &str,
    ) -> Result<Self, DomainError> {
        let api_key = api_key.into();
        let index_name = index_name.into();
        let url = format!(
            "{}/indexes/{}",
            control_plane_url.trim_end_matches('/'),
            index_name
        );

        let description = client
            .get_json(&url, vec![("Api-Key", api_key.as_str())])
            .await
            .map_err(|e| {
                DomainError::vector_store(format!("Failed to describe index {}: {}", index_name, e))
            })?;

        let host = description
            .get("host")
            .and_then(|h| h.as_str())
            .ok_or_else(|| {
                DomainError::vector_store(format!("Index {} has no host", index_name))
            })?
            .to_string();

        info!(index = %index_name, host = %host, "Resolved Pinecone index host");

        Ok(Self::new(client, api_key, index_name, host))
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Api-Key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    async fn upsert_batch(&self, batch: &[VectorRecord]) -> Result<usize, DomainError> {
        let body = serde_json::json!({
            "vectors": batch,
            "namespace": self.namespace,
        });

        let response = self
            .client
            .post_json(&format!("{}/vectors/upsert", self.host), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store(format!("Upsert failed: {}", e)))?;

        let parsed: UpsertResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::vector_store(format!("Failed to parse upsert response: {}", e))
        })?;

        Ok(parsed.upserted_count)
    }

    fn list_url(&self, prefix: &str, token: Option<&str>) -> Result<String, DomainError> {
        let mut params = vec![("prefix", prefix)];
        if !self.namespace.is_empty() {
            params.push(("namespace", self.namespace.as_str()));
        }
        if let Some(token) = token {
            params.push(("paginationToken", token));
        }

        Url::parse_with_params(&format!("{}/vectors/list", self.host), &params)
            .map(String::from)
            .map_err(|e| DomainError::vector_store(format!("Invalid list URL: {}", e)))
    }

    /// Page through every id starting with `prefix`
    async fn list_ids(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let mut ids = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let url = self.list_url(prefix, token.as_deref())?;
            let response = self
                .client
                .get_json(&url, self.headers())
                .await
                .map_err(|e| DomainError::vector_store(format!("List failed: {}", e)))?;

            let page: ListResponse = serde_json::from_value(response).map_err(|e| {
                DomainError::vector_store(format!("Failed to parse list response: {}", e))
            })?;

            ids.extend(page.vectors.into_iter().map(|v| v.id));

            match page.pagination.and_then(|p| p.next) {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        Ok(ids)
    }

    async fn delete_ids(&self, ids: &[String]) -> Result<(), DomainError> {
        let body = serde_json::json!({
            "ids": ids,
            "namespace": self.namespace,
        });

        self.client
            .post_json(&format!("{}/vectors/delete", self.host), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store(format!("Delete failed: {}", e)))?;

        Ok(())
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for PineconeVectorStore<C> {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<UpsertResult, DomainError> {
        let mut result = UpsertResult::default();

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let upserted = self.upsert_batch(batch).await?;
            debug!(index = %self.index_name, upserted, "Upserted batch");
            result = result.merge(UpsertResult::new(upserted));
        }

        Ok(result)
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<ScoredChunk>, DomainError> {
        if top_k == 0 {
            return Ok(vec![]);
        }

        let body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "namespace": self.namespace,
        });

        let response = self
            .client
            .post_json(&format!("{}/query", self.host), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store(format!("Query failed: {}", e)))?;

        let parsed: QueryResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::vector_store(format!("Failed to parse query response: {}", e))
        })?;

        let mut results: Vec<ScoredChunk> =
            parsed.matches.into_iter().map(QueryMatch::into_chunk).collect();

        sort_by_score(&mut results);
        results.truncate(top_k);

        Ok(results)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let ids = self.list_ids(prefix).await?;

        for batch in ids.chunks(DELETE_BATCH_SIZE) {
            self.delete_ids(batch).await?;
        }

        if !ids.is_empty() {
            debug!(index = %self.index_name, prefix, deleted = ids.len(), "Deleted vectors by prefix");
        }

        Ok(ids.len())
    }

    fn collection_name(&self) -> String {
        self.index_name.clone()
    }
}

// Pinecone API types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    vectors: Vec<ListedVector>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct ListedVector {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

/// Metadata values come back loosely typed, so fields are read by hand
#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl QueryMatch {
    fn field(&self, key: &str) -> String {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    fn into_chunk(self) -> ScoredChunk {
        ScoredChunk::new(
            self.id.clone(),
            self.field("text"),
            self.field("source"),
            self.field("title"),
            self.score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::ChunkRecordMetadata;
    use crate::infrastructure::llm::{HttpClient, MockHttpClient};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HOST: &str = "https://safety-index-abc.svc.pinecone.io";

    fn record(i: usize) -> VectorRecord {
        VectorRecord {
            id: format!("doc-{}", i),
            values: vec![0.1, 0.2],
            metadata: ChunkRecordMetadata {
                text: "Lock your doors".into(),
                source: "https://www.tps.ca/".into(),
                title: "TPS".into(),
                chunk_index: i,
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_is_batched() {
        let url = format!("{}/vectors/upsert", HOST);
        let client = MockHttpClient::new()
            .with_response(url.clone(), serde_json::json!({"upsertedCount": 100}))
            .with_response(url.clone(), serde_json::json!({"upsertedCount": 100}))
            .with_response(url.clone(), serde_json::json!({"upsertedCount": 50}));
        let store = PineconeVectorStore::new(client, "key", "toronto-safety", HOST)
            .with_namespace("plans");

        let result = store.upsert((0..250).map(record).collect()).await.unwrap();

        assert_eq!(result.upserted, 250);
        let bodies = store.client.bodies_for(&url);
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[0]["vectors"].as_array().unwrap().len(), 100);
        assert_eq!(bodies[2]["vectors"].as_array().unwrap().len(), 50);
        assert_eq!(bodies[0]["namespace"], "plans");
        assert_eq!(bodies[0]["vectors"][0]["metadata"]["source"], "https://www.tps.ca/");
    }

    #[tokio::test]
    async fn test_query_maps_metadata() {
        let url = format!("{}/query", HOST);
        let client = MockHttpClient::new().with_response(
            url.clone(),
            serde_json::json!({
                "matches": [
                    {"id": "b", "score": 0.4, "metadata": {"text": "second", "source": "https://b", "chunk_index": 2.0}},
                    {"id": "a", "score": 0.9, "metadata": {"text": "first", "source": "https://a", "title": "A"}},
                    {"id": "c", "score": 0.1}
                ],
                "namespace": ""
            }),
        );
        let store = PineconeVectorStore::new(client, "key", "toronto-safety", HOST);

        let results = store.query(vec![0.5, 0.5], 10).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].title, "A");
        assert_eq!(results[1].content, "second");
        assert_eq!(results[1].title, "");
        assert_eq!(results[2].source_url, "");

        let body = &store.client.bodies_for(&url)[0];
        assert_eq!(body["topK"], 10);
        assert_eq!(body["includeMetadata"], true);
    }

    #[tokio::test]
    async fn test_query_error_is_vector_store_error() {
        let client = MockHttpClient::new().with_error(format!("{}/query", HOST), "unavailable");
        let store = PineconeVectorStore::new(client, "key", "idx", HOST);

        let err = store.query(vec![1.0], 3).await.unwrap_err();
        assert!(matches!(err, DomainError::VectorStore { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_delete_prefix_lists_then_deletes() {
        let first_page = format!("{}/vectors/list?prefix=abcd-&namespace=plans", HOST);
        let second_page = format!(
            "{}/vectors/list?prefix=abcd-&namespace=plans&paginationToken=tok2",
            HOST
        );
        let delete_url = format!("{}/vectors/delete", HOST);
        let client = MockHttpClient::new()
            .with_response(
                first_page.clone(),
                serde_json::json!({
                    "vectors": [{"id": "abcd-01-0"}, {"id": "abcd-01-1"}],
                    "pagination": {"next": "tok2"},
                    "namespace": "plans"
                }),
            )
            .with_response(
                second_page.clone(),
                serde_json::json!({"vectors": [{"id": "abcd-01-2"}], "namespace": "plans"}),
            )
            .with_response(delete_url.clone(), serde_json::json!({}));
        let store = PineconeVectorStore::new(client, "key", "toronto-safety", HOST)
            .with_namespace("plans");

        let deleted = store.delete_prefix("abcd-").await.unwrap();

        assert_eq!(deleted, 3);
        let bodies = store.client.bodies_for(&delete_url);
        assert_eq!(bodies.len(), 1);
        assert_eq!(
            bodies[0]["ids"],
            serde_json::json!(["abcd-01-0", "abcd-01-1", "abcd-01-2"])
        );
        assert_eq!(bodies[0]["namespace"], "plans");
        assert_eq!(store.client.bodies_for(&second_page).len(), 1);
    }

    #[tokio::test]
    async fn test_delete_prefix_with_no_matches_skips_delete() {
        let list_url = format!("{}/vectors/list?prefix=ffff-", HOST);
        let client = MockHttpClient::new()
            .with_response(list_url, serde_json::json!({"vectors": [], "namespace": ""}));
        let store = PineconeVectorStore::new(client, "key", "idx", HOST);

        assert_eq!(store.delete_prefix("ffff-").await.unwrap(), 0);
        assert!(store.client.bodies_for(&format!("{}/vectors/delete", HOST)).is_empty());
    }

    #[tokio::test]
    async fn test_connect_resolves_host() {
        let client = MockHttpClient::new().with_response(
            "https://api.pinecone.io/indexes/toronto-safety",
            serde_json::json!({"name": "toronto-safety", "host": "toronto-safety-xyz.svc.pinecone.io"}),
        );

        let store = PineconeVectorStore::connect(client, "key", "toronto-safety", PINECONE_CONTROL_PLANE_URL)
            .await
            .unwrap();

        assert_eq!(store.host(), "https://toronto-safety-xyz.svc.pinecone.io");
        assert_eq!(store.collection_name(), "toronto-safety");
    }

    #[tokio::test]
    async fn test_connect_without_host_fails() {
        let client = MockHttpClient::new()
            .with_response("https://api.pinecone.io/indexes/x", serde_json::json!({"name": "x"}));

        let result = PineconeVectorStore::connect(client, "key", "x", PINECONE_CONTROL_PLANE_URL).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_query_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Api-Key", "pc-key"))
            .and(body_partial_json(serde_json::json!({"topK": 2, "includeMetadata": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [{"id": "x", "score": 0.7, "metadata": {"text": "t", "source": "s", "title": "T"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = PineconeVectorStore::new(HttpClient::new(), "pc-key", "idx", server.uri());
        let results = store.query(vec![0.1, 0.2], 2).await.unwrap();

        assert_eq!(results, vec![ScoredChunk::new("x", "t", "s", "T", 0.7)]);
    }

    #[tokio::test]
    async fn test_delete_prefix_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vectors/list"))
            .and(query_param("prefix", "abcd-"))
            .and(header("Api-Key", "pc-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "vectors": [{"id": "abcd-01-0"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/vectors/delete"))
            .and(body_partial_json(serde_json::json!({"ids": ["abcd-01-0"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = PineconeVectorStore::new(HttpClient::new(), "pc-key", "idx", server.uri());

        assert_eq!(store.delete_prefix("abcd-").await.unwrap(), 1);
    }
}
