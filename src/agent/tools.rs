//! Tool definitions and implementations for the agent system.

use crate::error::{QotdError, Result};
use crate::search::SearchProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name under which the search tool is exposed to the model.
pub const SEARCH_TOOL_NAME: &str = "search_for_quotes";

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the web for quotes.
    SearchForQuotes { query: String },
}

/// Tool execution context with access to the search provider.
pub struct ToolContext {
    pub search: Arc<dyn SearchProvider>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self { search }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::SearchForQuotes { query } => self.search.search(query).await,
        }
    }
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: SEARCH_TOOL_NAME.to_string(),
            description: Some(
                "Searches the web for quotes based on a given query. \
                Useful for finding quotes on specific topics or by certain authors."
                    .to_string(),
            ),
            parameters: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            })),
            strict: None,
        },
    }]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)?;

    match name {
        SEARCH_TOOL_NAME => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| QotdError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            Ok(ToolCall::SearchForQuotes { query })
        }
        _ => Err(QotdError::Agent(format!("Unknown tool: {}", name))),
    }
}
