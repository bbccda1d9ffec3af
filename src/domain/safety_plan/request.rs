//! Safety plan request and query formatting

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Caller-supplied description of who needs a plan and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyPlanRequest {
    pub neighbourhood: String,
    /// Ordered `"crime: severity"` entries
    pub crime_concerns: Vec<String>,
    /// Ordered free-form lines, conventionally alternating `Q:` and `A:`
    #[serde(default)]
    pub user_context: Vec<String>,
}

impl SafetyPlanRequest {
    pub fn new(neighbourhood: impl Into<String>, crime_concerns: Vec<String>) -> Self {
        Self {
            neighbourhood: neighbourhood.into(),
            crime_concerns,
            user_context: Vec::new(),
        }
    }

    pub fn with_context(mut self, user_context: Vec<String>) -> Self {
        self.user_context = user_context;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.neighbourhood.trim().is_empty() {
            return Err(DomainError::validation("Neighbourhood cannot be empty"));
        }

        if self.crime_concerns.is_empty() {
            return Err(DomainError::validation(
                "At least one crime concern is required",
            ));
        }

        if self.crime_concerns.iter().any(|c| c.trim().is_empty()) {
            return Err(DomainError::validation("Crime concerns cannot be blank"));
        }

        Ok(())
    }

    /// Concerns joined for display, with trailing semicolons removed
    pub fn concerns_line(&self) -> String {
        self.crime_concerns
            .join(", ")
            .trim_end_matches(';')
            .to_string()
    }

    /// The single plain-text query sent to retrieval and both model passes
    pub fn format_query(&self) -> FormattedQuery {
        FormattedQuery(format!(
            "LOCATION: {}\n\nSAFETY CONCERNS:\n- {}\n\nADDITIONAL USER CONTEXT:\n{}",
            self.neighbourhood,
            self.concerns_line(),
            self.user_context.join("\n")
        ))
    }
}

/// Query text built from a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormattedQuery(String);

impl FormattedQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormattedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agincourt() -> SafetyPlanRequest {
        SafetyPlanRequest::new(
            "Agincourt North (129)",
            vec!["Assault: Low".into(), "Auto Theft: Medium".into()],
        )
        .with_context(vec!["Q: Parking lighting?".into(), "A: Well-lit".into()])
    }

    #[test]
    fn test_format_query_layout() {
        let query = agincourt().format_query();

        assert_eq!(
            query.as_str(),
            "LOCATION: Agincourt North (129)\n\n\
             SAFETY CONCERNS:\n\
             - Assault: Low, Auto Theft: Medium\n\n\
             ADDITIONAL USER CONTEXT:\n\
             Q: Parking lighting?\n\
             A: Well-lit"
        );
    }

    #[test]
    fn test_format_query_is_byte_identical() {
        let request = agincourt();
        assert_eq!(
            request.format_query().as_str().as_bytes(),
            request.clone().format_query().as_str().as_bytes()
        );
    }

    #[test]
    fn test_trailing_semicolons_are_stripped() {
        let request = SafetyPlanRequest::new(
            "Rosedale",
            vec!["Robbery: High".into(), "Theft: Low;;".into()],
        );
        assert_eq!(request.concerns_line(), "Robbery: High, Theft: Low");
    }

    #[test]
    fn test_empty_context_keeps_heading() {
        let request = SafetyPlanRequest::new("Annex", vec!["Assault: Low".into()]);
        assert!(request
            .format_query()
            .as_str()
            .ends_with("ADDITIONAL USER CONTEXT:\n"));
    }

    #[test]
    fn test_validation() {
        assert!(agincourt().validate().is_ok());
        assert!(SafetyPlanRequest::new("  ", vec!["Assault: Low".into()])
            .validate()
            .is_err());
        assert!(SafetyPlanRequest::new("Annex", vec![]).validate().is_err());
        assert!(SafetyPlanRequest::new("Annex", vec![" ".into()])
            .validate()
            .is_err());
    }

    #[test]
    fn test_request_deserializes_without_context() {
        let request: SafetyPlanRequest = serde_json::from_str(
            r#"{"neighbourhood": "Annex", "crime_concerns": ["Assault: Low"]}"#,
        )
        .unwrap();
        assert!(request.user_context.is_empty());
    }
}
