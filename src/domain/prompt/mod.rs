//! Prompt domain - named templates with slot substitution

mod library;
mod registry;
mod template;

pub use library::{
    builtin_registry, judge_format, ANALYSIS_TEMPLATE, ANSWER_RELEVANCY_TEMPLATE,
    CONTEXT_PRECISION_TEMPLATE, CONTEXT_RECALL_TEMPLATE, EXAMPLE_SAFETY_PLAN,
    FAITHFULNESS_TEMPLATE, SYNTHESIS_TEMPLATE, TEST_SET_GROUND_TRUTH_TEMPLATE,
    TEST_SET_SEED_TEMPLATE, TEST_SET_STRUCTURE_TEMPLATE,
};
pub use registry::TemplateRegistry;
pub use template::{PromptTemplate, PromptVariable, TemplateError};
