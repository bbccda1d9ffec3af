//! Safety plan generation backed by embedding, retrieval and chat providers

mod generator;
mod llm_stages;

pub use generator::{retrieve_context, SafetyPlanGenerator};
pub use llm_stages::{format_context, LlmPlanStages};
