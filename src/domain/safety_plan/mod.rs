//! Safety plan domain - requests, generation stages and plan assembly

mod config;
mod plan;
mod request;
mod retry;
mod stages;

pub use config::GeneratorConfig;
pub use plan::{
    collect_sources, strip_model_sources, GeneratedPlan, SafetyPlan, Source, PLAN_FOOTER,
    PLAN_TITLE, REQUIRED_SECTIONS, SOURCES_HEADING,
};
pub use request::{FormattedQuery, SafetyPlanRequest};
pub use retry::{retry_stage, RetryConfig};
pub use stages::{Analysis, PlanBody, PlanStages};

#[cfg(test)]
pub use stages::mock::MockPlanStages;
