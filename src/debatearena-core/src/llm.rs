//! Chat-completion client for OpenAI-compatible providers (xAI, OpenRouter).

use std::time::Duration;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::DebateError;

/// A provider that turns a system + user prompt into generated text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Issue one completion request. Implementations must not retry.
    async fn complete(&self, system: &str, user: &str) -> Result<String, DebateError>;
}

/// Chat client speaking the `/chat/completions` protocol.
pub struct OpenAiCompatibleChat {
    http: reqwest::Client,
    provider: &'static str,
    api_base: String,
    api_key: Option<String>,
    key_var: &'static str,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleChat {
    pub fn new(
        provider: &'static str,
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DebateError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DebateError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            provider,
            api_base: api_base.into(),
            api_key,
            key_var: "API key",
            model: model.into(),
            temperature: crate::config::DEFAULT_TEMPERATURE,
        })
    }

    /// Build the client for whichever provider the settings select.
    pub fn from_settings(settings: &Settings) -> Result<Self, DebateError> {
        let provider = settings.llm_provider;
        Ok(Self::new(
            provider.display_name(),
            &settings.llm_api_base,
            settings.llm_api_key().map(String::from),
            &settings.llm_model,
            settings.upstream_timeout,
        )?
        .with_key_var(provider.key_var())
        .with_temperature(settings.llm_temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Name reported when the credential is missing.
    pub fn with_key_var(mut self, key_var: &'static str) -> Self {
        self.key_var = key_var;
        self
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompatibleChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, DebateError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DebateError::ConfigError(format!("Missing {}", self.key_var)))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: system.to_string().into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: user.to_string().into(),
                name: None,
            }),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .response_format(ResponseFormat::JsonObject)
            .messages(messages)
            .build()?;

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        tracing::debug!(provider = self.provider, model = %self.model, "requesting chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = self.provider, status = status.as_u16(), "chat completion rejected");
            return Err(DebateError::ApiStatus {
                provider: self.provider,
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionEnvelope = response.json().await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Only the parts of a completion body we read; providers differ on the rest.
#[derive(Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}
