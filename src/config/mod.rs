//! Configuration module for qotd.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuotePrompts};
pub use settings::{
    AgentSettings, LlmSettings, PromptSettings, SearchSettings, ServerSettings, Settings,
};
