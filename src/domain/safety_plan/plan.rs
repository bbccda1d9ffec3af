//! Final plan assembly

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::{Analysis, FormattedQuery, PlanBody, SafetyPlanRequest};
use crate::domain::vector_store::ScoredChunk;

pub const PLAN_TITLE: &str = "CITY OF TORONTO SERVICE SAFETY PLAN";
pub const SOURCES_HEADING: &str = "Sources Consulted:";
pub const PLAN_FOOTER: &str = "Note: This safety plan is generated based on Toronto Police Service resources and general safety guidelines. For emergencies, always call 911. For non-emergency police matters, call 416-808-2222.";

/// Section headings every plan body must contain once, in this order
pub const REQUIRED_SECTIONS: [&str; 4] = [
    "NEIGHBOURHOOD-SPECIFIC ASSESSMENT",
    "TARGETED SAFETY RECOMMENDATIONS",
    "PERSONAL SAFETY PROTOCOL",
    "PREVENTIVE MEASURES",
];

const UNTITLED: &str = "Untitled";

/// A cited page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Source {
    pub title: String,
    pub source_url: String,
}

impl Source {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_title(), self.source_url)
    }
}

/// Distinct (title, url) pairs of the retrieved chunks, in retrieval order
pub fn collect_sources(retrieved: &[ScoredChunk]) -> Vec<Source> {
    let mut seen = HashSet::new();

    retrieved
        .iter()
        .filter(|chunk| !chunk.source_url.is_empty())
        .map(|chunk| Source {
            title: chunk.title.clone(),
            source_url: chunk.source_url.clone(),
        })
        .filter(|source| seen.insert(source.clone()))
        .collect()
}

/// Drop any source list the model wrote itself; only retrieved sources are cited
pub fn strip_model_sources(body: &str) -> &str {
    body.split(SOURCES_HEADING).next().unwrap_or_default().trim()
}

/// An assembled safety plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyPlan {
    pub neighbourhood: String,
    pub concerns_line: String,
    pub body: String,
    pub sources: Vec<Source>,
}

impl SafetyPlan {
    pub fn assemble(request: &SafetyPlanRequest, body: &PlanBody, retrieved: &[ScoredChunk]) -> Self {
        Self {
            neighbourhood: request.neighbourhood.clone(),
            concerns_line: request.concerns_line(),
            body: strip_model_sources(body.as_str()).to_string(),
            sources: collect_sources(retrieved),
        }
    }

    /// Required headings that do not appear exactly once in the body
    pub fn missing_sections(&self) -> Vec<&'static str> {
        REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|heading| self.body.matches(heading).count() != 1)
            .collect()
    }

    /// Whether the headings found in the body follow the fixed order
    pub fn sections_in_order(&self) -> bool {
        let positions: Vec<usize> = REQUIRED_SECTIONS
            .iter()
            .filter_map(|heading| self.body.find(heading))
            .collect();

        positions.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// All four headings present once each and in the fixed order
    pub fn has_complete_sections(&self) -> bool {
        self.missing_sections().is_empty() && self.sections_in_order()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SafetyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", PLAN_TITLE)?;
        writeln!(f, "Neighbourhood: {}", self.neighbourhood)?;
        writeln!(f, "Primary Concerns: {}", self.concerns_line)?;
        writeln!(f)?;
        writeln!(f, "{}", self.body)?;
        writeln!(f)?;
        writeln!(f, "{}", SOURCES_HEADING)?;

        if self.sources.is_empty() {
            writeln!(f, "- No sources retrieved")?;
        }
        for source in &self.sources {
            writeln!(f, "- {}", source)?;
        }

        writeln!(f)?;
        writeln!(f, "----")?;
        writeln!(f)?;
        write!(f, "{}", PLAN_FOOTER)
    }
}

/// A plan together with the intermediate artifacts that produced it
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: SafetyPlan,
    pub query: FormattedQuery,
    pub analysis: Analysis,
    pub contexts: Vec<ScoredChunk>,
}

impl GeneratedPlan {
    pub fn context_texts(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.content.clone()).collect()
    }
}
