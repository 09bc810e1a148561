//! Hosted chat-completion backend.

use crate::error::{Result, VaaniError};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message sent to a chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat-completion service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model name, for logs.
    fn name(&self) -> &str;

    /// Complete the conversation and return the assistant's reply text.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

/// OpenAI chat completions.
pub struct OpenAiChat {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    json_mode: bool,
}

impl OpenAiChat {
    pub fn new(model: &str, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            temperature,
            json_mode: false,
        })
    }

    /// Ask the model for a single JSON object reply.
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    fn to_request_message(message: ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content)
                .build()
                .map_err(|e| VaaniError::Chat(e.to_string()))?
                .into(),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content)
                .build()
                .map_err(|e| VaaniError::Chat(e.to_string()))?
                .into(),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content)
                .build()
                .map_err(|e| VaaniError::Chat(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let messages = messages
            .into_iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if self.json_mode {
            builder.response_format(ResponseFormat::JsonObject);
        }
        let request = builder
            .build()
            .map_err(|e| VaaniError::Chat(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            VaaniError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!("Received {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, ChatRole::System);
        assert_eq!(ChatMessage::user("u").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").content, "a");
    }

    #[test]
    fn test_to_request_message() {
        let msg = OpenAiChat::to_request_message(ChatMessage::user("hello")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::User(_)));
    }
}
