//! Evaluation question sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::safety_plan::SafetyPlanRequest;

pub const TEST_SET_VERSION: &str = "v2";

/// Scenario families a generated test set covers
pub const SCENARIO_TYPES: [&str; 5] = [
    "residential_safety",
    "vehicle_security",
    "transit_safety",
    "personal_public_safety",
    "night_safety",
];

/// Accept either a bare string or a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

/// The request a test case was generated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredInput {
    pub neighbourhood: String,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub crime_type: Vec<String>,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub user_context: Vec<String>,
}

impl StructuredInput {
    pub fn to_request(&self) -> SafetyPlanRequest {
        SafetyPlanRequest::new(self.neighbourhood.clone(), self.crime_type.clone())
            .with_context(self.user_context.clone())
    }
}

impl From<&SafetyPlanRequest> for StructuredInput {
    fn from(request: &SafetyPlanRequest) -> Self {
        Self {
            neighbourhood: request.neighbourhood.clone(),
            crime_type: request.crime_concerns.clone(),
            user_context: request.user_context.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseMetadata {
    pub structured_input: StructuredInput,
    #[serde(default)]
    pub question_type: String,
}

/// One question with its reference answer and reference context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub question: String,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub ground_truth: Vec<String>,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub ground_truth_context: Vec<String>,
    pub metadata: TestCaseMetadata,
}

impl TestCase {
    pub fn to_request(&self) -> SafetyPlanRequest {
        self.metadata.structured_input.to_request()
    }

    pub fn ground_truth_text(&self) -> String {
        self.ground_truth.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSetMetadata {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub total_cases: usize,
    #[serde(default)]
    pub scenario_types: Vec<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    TEST_SET_VERSION.to_string()
}

/// A persisted question set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSet {
    pub metadata: TestSetMetadata,
    pub questions: Vec<TestCase>,
}

impl TestSet {
    pub fn new(model: impl Into<String>, questions: Vec<TestCase>) -> Self {
        Self {
            metadata: TestSetMetadata {
                generated_at: Utc::now(),
                model: model.into(),
                total_cases: questions.len(),
                scenario_types: SCENARIO_TYPES.iter().map(|s| s.to_string()).collect(),
                version: default_version(),
            },
            questions,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
