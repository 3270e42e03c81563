//! qotd - Quote of the Day AI
//!
//! A small HTTP service that answers `GET /quote` with an inspiring quote.
//! Quotes are found by a local language model (served by Ollama) that can
//! search the web, and the model's free-form answer is parsed into a quote
//! and an author.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - OpenAI-compatible chat client for the local model
//! - `search` - Web search providers (DuckDuckGo)
//! - `agent` - Tool-calling agent loop
//! - `quote` - Prompt construction and output parsing
//! - `orchestrator` - One quote request, end to end
//! - `cli` - Command line and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use qotd::config::Settings;
//! use qotd::orchestrator::Orchestrator;
//! use qotd::quote::QuoteRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::connect(&settings).await?;
//!
//!     let request = QuoteRequest {
//!         topic: Some("perseverance".to_string()),
//!         grade_level: Some("High School".to_string()),
//!     };
//!     let quote = orchestrator.get_quote(&request).await?;
//!     println!("{}", quote);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod quote;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{QotdError, Result};
