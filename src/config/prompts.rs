//! Prompt templates for qotd.
//!
//! Prompts can be customized by placing a `quote.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub quote: QuotePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts used to find a quote and identify its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotePrompts {
    /// System prompt for the agent. Receives `input`, `context_instruction`,
    /// `grade_level_instruction` and `format_instruction`.
    pub system: String,
    /// Base request when no topic is given.
    pub default_request: String,
    /// Base request when a topic is given. Receives `topic`.
    pub topic_request: String,
    /// Relevance clause. Receives `topic`.
    pub topic_instruction: String,
    /// Audience clause for a specific grade level. Receives `grade_level`.
    pub grade_level_instruction: String,
    /// Audience clause for the "General" grade level.
    pub general_audience_instruction: String,
    /// Output format the parser understands first.
    pub format_instruction: String,
    /// Fallback author inference. Receives `quote_text`.
    pub author: String,
}

impl Default for QuotePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful AI assistant specialized in finding and generating inspiring quotes.
When asked for a quote, you can either search for one or generate a new one.
If you search, try to extract the quote and author clearly.
Always provide a quote and its author if possible.

User Request: {{input}}

{{context_instruction}}
{{grade_level_instruction}}

{{format_instruction}}"#
                .to_string(),

            default_request: "Give me an inspiring quote of the day.".to_string(),

            topic_request: "Find an inspiring quote about {{topic}}.".to_string(),

            topic_instruction: "The quote should be relevant to the topic: '{{topic}}'.".to_string(),

            grade_level_instruction:
                "The quote should be appropriate and understandable for a '{{grade_level}}' audience."
                    .to_string(),

            general_audience_instruction: "The quote should be suitable for a general audience."
                .to_string(),

            format_instruction: r#"Answer with exactly two lines and nothing else:
QUOTE: <the quote text>
AUTHOR: <the author's name, or Unknown>"#
                .to_string(),

            author: "The following text is a quote: '{{quote_text}}'. Can you identify the author? If not, state 'Unknown'."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let quote_path = custom_path.join("quote.toml");
            if quote_path.exists() {
                let content = std::fs::read_to_string(&quote_path)?;
                prompts.quote = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single pass: substituted values are not scanned again, and unknown
    /// placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key.trim()) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.quote.system.contains("{{input}}"));
        assert!(prompts.quote.author.contains("{{quote_text}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let mut vars = HashMap::new();
        vars.insert("a".to_string(), "{{b}}".to_string());
        vars.insert("b".to_string(), "oops".to_string());

        assert_eq!(Prompts::render("[{{a}}] {{missing}} {{", &vars), "[{{b}}] {{missing}} {{");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("school".to_string(), "Hillside".to_string());
        custom.insert("topic".to_string(), "ignored".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "kindness".to_string());

        let rendered = prompts.render_with_custom("{{topic}} at {{school}}", &vars);
        assert_eq!(rendered, "kindness at Hillside");
    }

    #[test]
    fn test_custom_dir_overrides_quote_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("quote.toml")).unwrap();
        writeln!(file, "default_request = \"One short proverb, please.\"").unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.quote.default_request, "One short proverb, please.");
        // Fields absent from the file keep their defaults
        assert!(prompts.quote.author.contains("identify the author"));
    }
}
