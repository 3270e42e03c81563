//! Language model access through an OpenAI-compatible chat API.
//!
//! Ollama exposes the chat completions API under `/v1`, so the same client
//! works against a local model server or any other compatible endpoint.

use crate::config::LlmSettings;
use crate::error::{QotdError, Result};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Create a client for the configured model server.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(settings, Duration::from_secs(settings.request_timeout_secs))
}

/// Create a client with a custom per-request timeout.
pub fn create_client_with_timeout(
    settings: &LlmSettings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.base_url.trim_end_matches('/'))
        .with_api_key(settings.api_key.clone());

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as sent by the model.
    pub arguments: String,
}

impl ToolInvocation {
    /// Convert back into the wire type for the assistant message history.
    pub fn to_message_call(&self) -> ChatCompletionMessageToolCall {
        ChatCompletionMessageToolCall {
            id: self.id.clone(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: self.name.clone(),
                arguments: self.arguments.clone(),
            },
        }
    }
}

/// One model turn.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

/// Trait for chat-capable language models.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a conversation (and the tools the model may call) and get one turn back.
    async fn chat(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ModelReply>;

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;

    /// Send a single user prompt without tools and return the text answer.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| QotdError::Llm(e.to_string()))?;

        let reply = self.chat(vec![message.into()], Vec::new()).await?;
        Ok(reply.content.unwrap_or_default())
    }
}

/// Chat model served by Ollama (or any OpenAI-compatible server).
pub struct OllamaModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OllamaModel {
    /// Create a model handle without contacting the server.
    pub fn new(settings: &LlmSettings, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature,
        })
    }

    /// Create a model handle, checking availability first when configured to.
    pub async fn connect(settings: &LlmSettings, temperature: f32) -> Result<Self> {
        let model = Self::new(settings, temperature)?;
        if settings.verify_on_startup {
            model.verify().await?;
        }
        info!("Language model {} ready at {}", model.model, settings.base_url);
        Ok(model)
    }

    /// Ask the server whether the configured model is available.
    pub async fn verify(&self) -> Result<()> {
        self.client
            .models()
            .retrieve(&self.model)
            .await
            .map_err(|e| QotdError::Llm(format!("Model {} is not available: {}", self.model, e)))?;
        Ok(())
    }
}

#[async_trait]
impl ChatModel for OllamaModel {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn chat(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ModelReply> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature);

        // Some servers reject an empty tool list
        if !tools.is_empty() {
            builder.tools(tools);
        }

        let request = builder.build().map_err(|e| QotdError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| QotdError::Llm(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QotdError::Llm("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect::<Vec<_>>();

        debug!("Model replied with {} tool call(s)", tool_calls.len());

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_invocation_round_trips_to_wire_call() {
        let call = ToolInvocation {
            id: "call_1".to_string(),
            name: "search_for_quotes".to_string(),
            arguments: r#"{"query": "courage quotes"}"#.to_string(),
        };
        let wire = call.to_message_call();
        assert_eq!(wire.id, "call_1");
        assert_eq!(wire.function.name, "search_for_quotes");
        assert_eq!(wire.function.arguments, call.arguments);
    }

    #[test]
    fn test_new_does_not_contact_server() {
        let settings = LlmSettings {
            base_url: "http://127.0.0.1:9/v1/".to_string(),
            ..LlmSettings::default()
        };
        let model = OllamaModel::new(&settings, 0.2).unwrap();
        assert_eq!(model.model_name(), "gemma:2b");
    }
}
