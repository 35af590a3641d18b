//! services/api/src/adapters/insights_llm.rs
//!
//! This module contains the adapter for the coaching LLM.
//! It implements the `InsightGenerationService` port from the `core` crate
//! against any OpenAI-compatible chat-completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use studentflow_core::ports::{InsightGenerationService, PortError, PortResult};
use tracing::debug;

const ADVICE_SYSTEM_PROMPT: &str = "You are a friendly study coach for university students. \
Answer concisely in 2 sentences.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InsightGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightsAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiInsightsAdapter {
    /// Creates a new `OpenAiInsightsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    /// Sends one chat completion and returns the text of the first choice.
    /// Expiry of the configured timeout is reported like any provider failure.
    async fn complete(&self, request: CreateChatCompletionRequest) -> PortResult<String> {
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unavailable(format!(
                    "AI provider did not answer within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unavailable(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unavailable("AI provider response contained no text content.".to_string())
            })?;
        debug!("AI provider returned {} bytes", content.len());
        Ok(content)
    }
}

//=========================================================================================
// `InsightGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InsightGenerationService for OpenAiInsightsAdapter {
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some("Habit insights and a schedule for today".to_string()),
                    name: "student_insight".to_string(),
                    schema: Some(schema.clone()),
                    strict: None,
                },
            })
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.complete(request).await
    }

    async fn quick_advice(&self, query: &str, context: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(ADVICE_SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Context: {}\n\nUser Question: {}", context, query))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(self.complete(request).await?.trim().to_string())
    }
}
