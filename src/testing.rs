//! Scripted collaborators for unit tests.

use crate::error::{QotdError, Result};
use crate::llm::{ChatModel, ModelReply, ToolInvocation};
use crate::search::SearchProvider;
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionTool};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

enum Step {
    Reply(ModelReply),
    Fail(String),
}

/// What the model was sent on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: usize,
    pub tools: usize,
    /// Text content of the last message.
    pub last_content: String,
}

/// Model that plays back a fixed sequence of turns.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, content: &str) -> Self {
        self.push(Step::Reply(ModelReply {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }))
    }

    pub fn tool_call(self, name: &str, arguments: &str) -> Self {
        let id = format!("call_{}", self.steps.lock().unwrap().len());
        self.push(Step::Reply(ModelReply {
            content: None,
            tool_calls: vec![ToolInvocation {
                id,
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        }))
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Step::Fail(message.to_string()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn push(self, step: Step) -> Self {
        self.steps.lock().unwrap().push_back(step);
        self
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ModelReply> {
        let last_content = messages
            .last()
            .and_then(|m| serde_json::to_value(m).ok())
            .and_then(|v| v["content"].as_str().map(str::to_string))
            .unwrap_or_default();

        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.len(),
            tools: tools.len(),
            last_content,
        });

        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fail(message)) => Err(QotdError::Llm(message)),
            None => Err(QotdError::Llm("script exhausted".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Model that never answers.
pub struct StalledModel;

#[async_trait]
impl ChatModel for StalledModel {
    async fn chat(
        &self,
        _messages: Vec<ChatCompletionRequestMessage>,
        _tools: Vec<ChatCompletionTool>,
    ) -> Result<ModelReply> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(ModelReply::default())
    }

    fn model_name(&self) -> &str {
        "stalled"
    }
}

/// Search provider returning the same text for every query.
pub struct StaticSearch {
    result: String,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(result: &str) -> Self {
        Self {
            result: result.to_string(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.result.clone())
    }
}

/// Search provider that always fails.
pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str) -> Result<String> {
        Err(QotdError::Search("provider unreachable".to_string()))
    }
}
