//! Quote model, prompt building and answer parsing.

mod parser;
mod prompt;

pub use parser::{accept_inferred_author, parse_output, ParsedOutput, MAX_AUTHOR_CHARS};
pub use prompt::{PromptBuilder, QuotePrompt};

use serde::{Deserialize, Serialize};

/// Author used when none can be determined.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A quote with its text and optional author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The text of the quote.
    pub text: String,
    /// The author of the quote, if known.
    pub author: Option<String>,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: Some(author.into()),
        }
    }

    /// Quote whose author could not be determined.
    pub fn unattributed(text: impl Into<String>) -> Self {
        Self::new(text, UNKNOWN_AUTHOR)
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.text)?;
        if let Some(author) = &self.author {
            write!(f, " - {}", author)?;
        }
        Ok(())
    }
}

/// Parameters of a quote request. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequest {
    pub topic: Option<String>,
    pub grade_level: Option<String>,
}

impl QuoteRequest {
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().filter(|t| !t.is_empty())
    }

    pub fn grade_level(&self) -> Option<&str> {
        self.grade_level.as_deref().filter(|g| !g.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_serializes_text_and_author() {
        let quote = Quote::new("Be yourself.", "Oscar Wilde");
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "text": "Be yourself.", "author": "Oscar Wilde" })
        );
    }

    #[test]
    fn test_missing_author_serializes_as_null() {
        let quote = Quote {
            text: "Anonymous wisdom.".to_string(),
            author: None,
        };
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json["author"].is_null());
    }

    #[test]
    fn test_empty_params_are_absent() {
        let request = QuoteRequest {
            topic: Some(String::new()),
            grade_level: Some("Pre-K".to_string()),
        };
        assert_eq!(request.topic(), None);
        assert_eq!(request.grade_level(), Some("Pre-K"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Quote::unattributed("Keep going.").to_string(),
            "\"Keep going.\" - Unknown"
        );
    }
}
