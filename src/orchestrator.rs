//! Quote pipeline orchestrator.
//!
//! Coordinates one request from prompt building through the agent run to
//! the parsed quote.

use crate::agent::{Agent, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::{QotdError, Result};
use crate::llm::{ChatModel, OllamaModel};
use crate::quote::{
    accept_inferred_author, parse_output, ParsedOutput, PromptBuilder, Quote, QuoteRequest,
    UNKNOWN_AUTHOR,
};
use crate::search::{DuckDuckGoSearch, SearchProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// The main orchestrator for the quote pipeline.
///
/// Holds only read-only handles, so one instance serves any number of
/// concurrent requests.
pub struct Orchestrator {
    prompts: Prompts,
    model: Arc<dyn ChatModel>,
    search: Arc<dyn SearchProvider>,
    max_iterations: usize,
    timeout: Duration,
}

impl Orchestrator {
    /// Build the orchestrator from settings, connecting to the model server.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model: Arc<dyn ChatModel> =
            Arc::new(OllamaModel::connect(&settings.llm, settings.agent.temperature).await?);
        let search: Arc<dyn SearchProvider> = Arc::new(DuckDuckGoSearch::new(&settings.search)?);

        Ok(Self::with_components(settings, prompts, model, search))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: Prompts,
        model: Arc<dyn ChatModel>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            prompts,
            model,
            search,
            max_iterations: settings.agent.max_iterations,
            timeout: Duration::from_secs(settings.agent.timeout_secs),
        }
    }

    /// Override the time budget for a whole request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Identifier of the model in use.
    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Find a quote for the request within the time budget.
    #[instrument(skip(self), fields(topic = ?request.topic(), grade_level = ?request.grade_level()))]
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote> {
        tokio::time::timeout(self.timeout, self.run_pipeline(request))
            .await
            .map_err(|_| QotdError::Timeout(self.timeout))?
    }

    async fn run_pipeline(&self, request: &QuoteRequest) -> Result<Quote> {
        let prompt = PromptBuilder::new(&self.prompts).build(request);
        debug!("System prompt:\n{}", prompt.system);

        let agent = Agent::new(
            ToolContext::new(self.search.clone()),
            self.model.clone(),
            &prompt.system,
        )
        .with_max_iterations(self.max_iterations);

        let response = agent.run(&prompt.user_request).await?;
        info!(
            "Agent finished in {} iteration(s) with {} tool call(s)",
            response.iterations,
            response.tool_calls.len()
        );

        match parse_output(&response.output) {
            ParsedOutput::Complete(quote) => Ok(quote),
            ParsedOutput::NeedsAuthor(text) => {
                let author = self.infer_author(&text).await?;
                Ok(Quote::new(text, author))
            }
        }
    }

    /// Ask the model once who said the quote.
    async fn infer_author(&self, quote_text: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("quote_text".to_string(), quote_text.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.quote.author, &vars);

        let reply = self.model.complete(&prompt).await?;
        debug!("Author inference replied: {}", reply.trim());

        Ok(accept_inferred_author(&reply).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()))
    }
}
