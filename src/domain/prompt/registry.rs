//! Named template registry

use std::collections::HashMap;

use super::template::{PromptTemplate, TemplateError};

/// Collection of parsed templates addressed by name
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, PromptTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a template, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let template = PromptTemplate::parse(content)?;
        self.templates.insert(name.into(), template);
        Ok(())
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        self.register(name, content)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Render a named template with a slot to value map
    pub fn render(
        &self,
        name: &str,
        values: &HashMap<String, String>,
    ) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })?
            .render(values)
    }

    /// Render a named template from borrowed slot pairs
    pub fn render_with(&self, name: &str, slots: &[(&str, &str)]) -> Result<String, TemplateError> {
        let values: HashMap<String, String> = slots
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.render(name, &values)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
