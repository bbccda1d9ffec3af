//! End-to-end safety plan generation

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::safety_plan::{
    retry_stage, FormattedQuery, GeneratedPlan, GeneratorConfig, PlanStages, SafetyPlan,
    SafetyPlanRequest,
};
use crate::domain::vector_store::{ScoredChunk, VectorStore};
use crate::domain::DomainError;

/// Format, retrieve, analyze, synthesize and assemble
pub struct SafetyPlanGenerator<E, V, S>
where
    E: EmbeddingProvider,
    V: VectorStore,
    S: PlanStages,
{
    embedder: Arc<E>,
    store: Arc<V>,
    stages: Arc<S>,
    config: GeneratorConfig,
}

impl<E, V, S> SafetyPlanGenerator<E, V, S>
where
    E: EmbeddingProvider,
    V: VectorStore,
    S: PlanStages,
{
    pub fn new(embedder: Arc<E>, store: Arc<V>, stages: Arc<S>, config: GeneratorConfig) -> Self {
        Self {
            embedder,
            store,
            stages,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Embed the query and return the `top_k` most similar chunks
    pub async fn retrieve(
        &self,
        query: &FormattedQuery,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        retrieve_context(
            self.embedder.as_ref(),
            self.store.as_ref(),
            &self.config.embedding_model,
            self.config.embedding_dimensions,
            query.as_str(),
            top_k,
        )
        .await
    }

    pub async fn generate(&self, request: &SafetyPlanRequest) -> Result<SafetyPlan, DomainError> {
        Ok(self.generate_with_context(request).await?.plan)
    }

    /// Generate a plan and keep the query, analysis and retrieved chunks
    pub async fn generate_with_context(
        &self,
        request: &SafetyPlanRequest,
    ) -> Result<GeneratedPlan, DomainError> {
        request.validate()?;

        info!(neighbourhood = %request.neighbourhood, "Generating safety plan");
        let query = request.format_query();

        let contexts = self.retrieve(&query, self.config.top_k).await?;

        let retry = &self.config.retry;
        let analysis = retry_stage(retry, "analysis", || {
            self.stages.analyze(&query, &contexts)
        })
        .await?;
        debug!(len = analysis.as_str().len(), "Analysis complete");

        let body = retry_stage(retry, "synthesis", || {
            self.stages.synthesize(&query, &analysis)
        })
        .await?;

        let plan = SafetyPlan::assemble(request, &body, &contexts);

        if !plan.has_complete_sections() {
            warn!(
                missing = ?plan.missing_sections(),
                out_of_order = !plan.sections_in_order(),
                "Plan body does not contain every section once in order"
            );
        }

        info!(
            sources = plan.sources.len(),
            contexts = contexts.len(),
            "Safety plan generated"
        );

        Ok(GeneratedPlan {
            plan,
            query,
            analysis,
            contexts,
        })
    }
}

/// Embed `query` with `model` and return the `top_k` nearest chunks from `store`
pub async fn retrieve_context<E, V>(
    embedder: &E,
    store: &V,
    model: &str,
    dimensions: Option<usize>,
    query: &str,
    top_k: usize,
) -> Result<Vec<ScoredChunk>, DomainError>
where
    E: EmbeddingProvider + ?Sized,
    V: VectorStore + ?Sized,
{
    let request = EmbeddingRequest::single(model, query).with_dimensions(dimensions);

    let vector = embedder
        .embed(request)
        .await?
        .into_vectors()
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::provider(embedder.provider_name(), "No embedding returned"))?;

    let chunks = store.query(vector, top_k).await?;
    debug!(retrieved = chunks.len(), top_k, "Retrieved context");

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::safety_plan::{MockPlanStages, RetryConfig, PLAN_FOOTER};
    use crate::domain::vector_store::{ChunkRecordMetadata, MockVectorStore, VectorRecord};
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    const BODY: &str = "1. NEIGHBOURHOOD-SPECIFIC ASSESSMENT:\nLow risk.\n\n\
        2. TARGETED SAFETY RECOMMENDATIONS:\n- Lock doors.\n\n\
        3. PERSONAL SAFETY PROTOCOL:\n- Save 416-808-2222.\n\n\
        4. PREVENTIVE MEASURES:\n- Join neighbourhood watch.";

    fn request() -> SafetyPlanRequest {
        SafetyPlanRequest::new(
            "Agincourt North (129)",
            vec![
                "Assault: Low".to_string(),
                "Auto Theft: Medium".to_string(),
                "Break and Enter: Low".to_string(),
                "Robbery: Medium;".to_string(),
            ],
        )
        .with_context(vec![
            "Q: Do you have a car?".to_string(),
            "A: Yes, parked on the street".to_string(),
        ])
    }

    async fn seeded_store(embedder: &MockEmbeddingProvider) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new("toronto-safety"));
        let pages = [
            ("a", "auto theft car parked street", "Auto Theft", "https://www.tps.ca/auto/"),
            ("b", "auto theft keys car", "Auto Theft", "https://www.tps.ca/auto/"),
            ("c", "assault robbery personal safety", "Personal Safety", "https://www.tps.ca/personal/"),
            ("d", "unrelated bylaw text", "Bylaws", ""),
        ];

        let records = pages
            .iter()
            .map(|(id, text, title, url)| VectorRecord {
                id: id.to_string(),
                values: embedder.vector_for(text),
                metadata: ChunkRecordMetadata {
                    text: text.to_string(),
                    source: url.to_string(),
                    title: title.to_string(),
                    chunk_index: 0,
                },
            })
            .collect();
        store.upsert(records).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_generate_assembles_full_plan() {
        let embedder = MockEmbeddingProvider::new(64);
        let store = seeded_store(&embedder).await;
        let stages = Arc::new(MockPlanStages::new("analysis", BODY));

        let generator = SafetyPlanGenerator::new(
            Arc::new(embedder),
            store,
            stages.clone(),
            GeneratorConfig::default(),
        );

        let generated = generator.generate_with_context(&request()).await.unwrap();
        let text = generated.plan.render();

        assert!(text.starts_with(
            "CITY OF TORONTO SERVICE SAFETY PLAN\n\
             Neighbourhood: Agincourt North (129)\n\
             Primary Concerns: Assault: Low, Auto Theft: Medium, Break and Enter: Low, Robbery: Medium\n\n\
             1. NEIGHBOURHOOD-SPECIFIC ASSESSMENT:"
        ));
        assert!(text.ends_with(PLAN_FOOTER));
        assert!(text.contains("- Auto Theft (https://www.tps.ca/auto/)\n"));
        assert_eq!(text.matches("(https://www.tps.ca/auto/)").count(), 1);
        assert!(!text.contains("Bylaws"));
        assert!(generated.plan.has_complete_sections());

        assert_eq!(generated.contexts.len(), 4);
        assert_eq!(stages.seen_context()[0].len(), 4);
        assert_eq!(stages.seen_analysis(), vec!["analysis"]);
        assert!(generated.query.as_str().starts_with("LOCATION: Agincourt North (129)"));
    }

    #[tokio::test]
    async fn test_top_k_limits_context() {
        let embedder = MockEmbeddingProvider::new(64);
        let store = seeded_store(&embedder).await;
        let stages = Arc::new(MockPlanStages::new("analysis", BODY));

        let generator = SafetyPlanGenerator::new(
            Arc::new(embedder),
            store,
            stages.clone(),
            GeneratorConfig::default().with_top_k(2),
        );

        let generated = generator.generate_with_context(&request()).await.unwrap();

        assert_eq!(generated.contexts.len(), 2);
        assert!(generated.contexts[0].score >= generated.contexts[1].score);
        assert_eq!(generated.context_texts().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_retrieval() {
        let embedder = Arc::new(MockEmbeddingProvider::new(8));
        let mut store = MockVectorStore::new();
        store.expect_query().never();

        let generator = SafetyPlanGenerator::new(
            embedder.clone(),
            Arc::new(store),
            Arc::new(MockPlanStages::new("a", BODY)),
            GeneratorConfig::default(),
        );

        let result = generator
            .generate(&SafetyPlanRequest::new(" ", vec!["Assault: Low".into()]))
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_retrieval_still_produces_plan() {
        let mut store = MockVectorStore::new();
        store
            .expect_query()
            .withf(|_, top_k| *top_k == 10)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let generator = SafetyPlanGenerator::new(
            Arc::new(MockEmbeddingProvider::new(8)),
            Arc::new(store),
            Arc::new(MockPlanStages::new("a", BODY)),
            GeneratorConfig::default(),
        );

        let plan = generator.generate(&request()).await.unwrap();

        assert!(plan.sources.is_empty());
        assert!(plan.render().contains("- No sources retrieved"));
    }

    #[tokio::test]
    async fn test_stage_failure_propagates_without_retries() {
        let embedder = MockEmbeddingProvider::new(16);
        let store = seeded_store(&embedder).await;
        let stages = Arc::new(MockPlanStages::new("a", BODY).failing_analyze(1));

        let generator = SafetyPlanGenerator::new(
            Arc::new(embedder),
            store,
            stages.clone(),
            GeneratorConfig::default(),
        );

        let result = generator.generate(&request()).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert!(stages.seen_analysis().is_empty());
    }

    #[tokio::test]
    async fn test_stage_is_retried_when_configured() {
        let embedder = MockEmbeddingProvider::new(16);
        let store = seeded_store(&embedder).await;
        let stages = Arc::new(MockPlanStages::new("a", BODY).failing_analyze(2));
        let config = GeneratorConfig::default()
            .with_retry(RetryConfig::new(2).with_initial_delay(1).with_max_delay(2));

        let generator = SafetyPlanGenerator::new(Arc::new(embedder), store, stages.clone(), config);

        let plan = generator.generate(&request()).await.unwrap();

        assert_eq!(stages.seen_context().len(), 3);
        assert!(plan.has_complete_sections());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let mut store = MockVectorStore::new();
        store.expect_query().never();

        let generator = SafetyPlanGenerator::new(
            Arc::new(MockEmbeddingProvider::new(8).with_error("quota")),
            Arc::new(store),
            Arc::new(MockPlanStages::new("a", BODY)),
            GeneratorConfig::default(),
        );

        assert!(generator.generate(&request()).await.is_err());
    }
}
