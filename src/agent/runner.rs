//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::error::{QotdError, Result};
use crate::llm::{ChatModel, ToolInvocation};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Output used when the model ends without any text.
pub const NO_OUTPUT: &str = "No quote found or generated.";

/// Agent that can call the search tool before answering.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent with the given tool context and model.
    pub fn new(tools: ToolContext, model: Arc<dyn ChatModel>, system_prompt: &str) -> Self {
        Self {
            model,
            tools,
            max_iterations: 8,
            system_prompt: system_prompt.to_string(),
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run the agent with a user task.
    pub async fn run(&self, task: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| QotdError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(task.to_string())
                .build()
                .map_err(|e| QotdError::Agent(e.to_string()))?
                .into(),
        ];

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(QotdError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let reply = self.model.chat(messages.clone(), tool_definitions()).await?;

            if reply.tool_calls.is_empty() {
                let output = reply
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| NO_OUTPUT.to_string());

                return Ok(AgentResponse {
                    output,
                    tool_calls: tool_calls_made,
                    iterations,
                });
            }

            // Add assistant message with tool calls to history
            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(
                    reply
                        .tool_calls
                        .iter()
                        .map(ToolInvocation::to_message_call)
                        .collect::<Vec<_>>(),
                )
                .build()
                .map_err(|e| QotdError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in &reply.tool_calls {
                let record = self.execute_tool_call(tool_call).await?;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(tool_call.id.clone())
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| QotdError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Malformed or unknown tool calls are reported back to the model as text.
    /// Errors from the tool itself end the run.
    async fn execute_tool_call(&self, tool_call: &ToolInvocation) -> Result<ToolCallRecord> {
        info!(
            "Agent calling tool: {} with args: {}",
            tool_call.name, tool_call.arguments
        );

        let result = match parse_tool_call(&tool_call.name, &tool_call.arguments) {
            Ok(tool) => self.tools.execute(&tool).await?,
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        Ok(ToolCallRecord {
            name: tool_call.name.clone(),
            arguments: tool_call.arguments.clone(),
            result,
        })
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final answer text.
    pub output: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::SEARCH_TOOL_NAME;
    use crate::testing::{FailingSearch, ScriptedModel, StaticSearch};

    fn agent(model: Arc<ScriptedModel>, search: Arc<StaticSearch>) -> Agent {
        Agent::new(ToolContext::new(search), model, "You find quotes.")
    }

    #[tokio::test]
    async fn test_final_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new().reply("QUOTE: Be yourself.\nAUTHOR: Oscar Wilde"));
        let search = Arc::new(StaticSearch::new("unused"));

        let response = agent(model.clone(), search.clone()).run("Give me a quote.").await.unwrap();

        assert_eq!(response.output, "QUOTE: Be yourself.\nAUTHOR: Oscar Wilde");
        assert_eq!(response.iterations, 1);
        assert!(response.tool_calls.is_empty());
        assert_eq!(search.queries().len(), 0);

        // System and user message, one tool on offer
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages, 2);
        assert_eq!(calls[0].tools, 1);
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let model = Arc::new(
            ScriptedModel::new()
                .tool_call(SEARCH_TOOL_NAME, r#"{"query": "courage quotes"}"#)
                .reply("Courage is grace under pressure. - Ernest Hemingway"),
        );
        let search = Arc::new(StaticSearch::new("Courage is grace under pressure."));

        let response = agent(model.clone(), search.clone()).run("Find a quote.").await.unwrap();

        assert_eq!(response.iterations, 2);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].result, "Courage is grace under pressure.");
        assert_eq!(search.queries(), vec!["courage quotes".to_string()]);
        // Second turn sees assistant tool call and tool result
        assert_eq!(model.calls()[1].messages, 4);
    }

    #[tokio::test]
    async fn test_search_failure_ends_the_run() {
        let model = Arc::new(
            ScriptedModel::new()
                .tool_call(SEARCH_TOOL_NAME, r#"{"query": "x"}"#)
                .reply("Be yourself. - Oscar Wilde"),
        );
        let agent = Agent::new(
            ToolContext::new(Arc::new(FailingSearch)),
            model.clone(),
            "You find quotes.",
        );

        let err = agent.run("Find a quote.").await.unwrap_err();
        assert!(matches!(err, QotdError::Search(_)));
        // The model is not consulted again after the failed search
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_tool_call_is_reported_to_model() {
        let model = Arc::new(
            ScriptedModel::new()
                .tool_call(SEARCH_TOOL_NAME, "not json")
                .tool_call("get_weather", r#"{"city": "Oslo"}"#)
                .reply("Done."),
        );
        let search = Arc::new(StaticSearch::new("unused"));

        let response = agent(model, search.clone()).run("Find a quote.").await.unwrap();
        assert_eq!(response.tool_calls.len(), 2);
        assert!(response.tool_calls[0].result.starts_with("Failed to parse tool call:"));
        assert!(response.tool_calls[1].result.contains("Unknown tool"));
        assert_eq!(response.output, "Done.");
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_answer_uses_placeholder() {
        let model = Arc::new(ScriptedModel::new().reply("   "));
        let response = agent(model, Arc::new(StaticSearch::new("")))
            .run("Find a quote.")
            .await
            .unwrap();
        assert_eq!(response.output, NO_OUTPUT);
    }

    #[tokio::test]
    async fn test_iteration_budget_is_enforced() {
        let model = Arc::new(
            ScriptedModel::new()
                .tool_call(SEARCH_TOOL_NAME, r#"{"query": "a"}"#)
                .tool_call(SEARCH_TOOL_NAME, r#"{"query": "b"}"#)
                .tool_call(SEARCH_TOOL_NAME, r#"{"query": "c"}"#),
        );
        let agent = agent(model, Arc::new(StaticSearch::new("nothing"))).with_max_iterations(2);

        let err = agent.run("Find a quote.").await.unwrap_err();
        assert!(matches!(err, QotdError::Agent(_)));
        assert!(err.to_string().contains("maximum iterations"));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Arc::new(ScriptedModel::new().fail("connection refused"));
        let err = agent(model, Arc::new(StaticSearch::new("")))
            .run("Find a quote.")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: SEARCH_TOOL_NAME.to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "Found results".to_string(),
        };
        assert_eq!(
            format!("{}", record),
            r#"search_for_quotes({"query": "test"})"#
        );
    }
}
