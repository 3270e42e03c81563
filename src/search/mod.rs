//! Web search providers available to the agent.

mod duckduckgo;

pub use duckduckgo::DuckDuckGoSearch;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for web search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a free-text query and return the results as plain text.
    async fn search(&self, query: &str) -> Result<String>;
}
