//! Builds the agent instructions from request parameters.

use super::QuoteRequest;
use crate::config::Prompts;
use std::collections::HashMap;

/// Grade level that selects the generic-audience clause.
const GENERAL_GRADE_LEVEL: &str = "General";

/// Rendered prompt for one quote request.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePrompt {
    /// System instruction block.
    pub system: String,
    /// Base request, also sent as the user message.
    pub user_request: String,
}

/// Formats prompt templates with request parameters.
///
/// Parameters are interpolated verbatim.
pub struct PromptBuilder<'a> {
    prompts: &'a Prompts,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(prompts: &'a Prompts) -> Self {
        Self { prompts }
    }

    pub fn build(&self, request: &QuoteRequest) -> QuotePrompt {
        let templates = &self.prompts.quote;
        let mut vars = HashMap::new();

        let (user_request, context_instruction) = match request.topic() {
            Some(topic) => {
                vars.insert("topic".to_string(), topic.to_string());
                (
                    self.prompts.render_with_custom(&templates.topic_request, &vars),
                    self.prompts.render_with_custom(&templates.topic_instruction, &vars),
                )
            }
            None => (
                self.prompts
                    .render_with_custom(&templates.default_request, &vars),
                String::new(),
            ),
        };

        let grade_level_instruction = match request.grade_level() {
            Some(GENERAL_GRADE_LEVEL) => templates.general_audience_instruction.clone(),
            Some(level) => {
                vars.insert("grade_level".to_string(), level.to_string());
                self.prompts
                    .render_with_custom(&templates.grade_level_instruction, &vars)
            }
            None => String::new(),
        };

        // Rendered clauses are inserted as values so user text is never re-expanded
        let mut system_vars = HashMap::new();
        system_vars.insert("input".to_string(), user_request.clone());
        system_vars.insert("context_instruction".to_string(), context_instruction);
        system_vars.insert("grade_level_instruction".to_string(), grade_level_instruction);
        system_vars.insert(
            "format_instruction".to_string(),
            templates.format_instruction.clone(),
        );

        QuotePrompt {
            system: self.prompts.render_with_custom(&templates.system, &system_vars),
            user_request,
        }
    }
}
