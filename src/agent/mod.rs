//! Agent system for finding quotes with tool calling.
//!
//! Provides an LLM agent that can search the web for quotes before giving
//! its final answer.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord, NO_OUTPUT};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext, SEARCH_TOOL_NAME};
