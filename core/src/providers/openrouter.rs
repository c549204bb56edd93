use crate::traits::{ChatMessage, Provider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Model families that reject a separate system message.
const NO_SYSTEM_ROLE_MODELS: &[&str] = &["gemma"];

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: Vec<OpenRouterMessage<'a>>,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenRouterMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Vec<OpenRouterChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponseMessage {
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

impl OpenRouterResponseMessage {
    /// Reasoning models may leave `content` blank and put the reply in
    /// `reasoning_content`.
    fn into_text(self) -> Option<String> {
        match self.content {
            Some(c) if !c.trim().is_empty() => Some(c),
            _ => self.reasoning_content,
        }
    }
}

pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: super::http_client(super::DEFAULT_TIMEOUT),
            api_key: api_key.into(),
            model: "deepseek/deepseek-r1-0528-qwen3-8b:free".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            temperature: 0.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = super::http_client(timeout);
        self
    }

    fn convert_messages<'a>(&self, messages: &'a [ChatMessage]) -> Vec<OpenRouterMessage<'a>> {
        messages
            .iter()
            .map(|m| OpenRouterMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect()
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let openrouter_request = OpenRouterRequest {
            model: &self.model,
            messages: self.convert_messages(messages),
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", "rea")
            .json(&openrouter_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "OpenRouter API error ({}): {}",
                status,
                error_text
            ));
        }

        let openrouter_response: OpenRouterResponse = response.json().await?;

        let message = openrouter_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow::anyhow!("No response from OpenRouter"))?;

        message
            .into_text()
            .ok_or_else(|| anyhow::anyhow!("Empty response from OpenRouter"))
    }

    fn supports_system_role(&self) -> bool {
        let model = self.model.to_lowercase();
        !NO_SYSTEM_ROLE_MODELS
            .iter()
            .any(|family| model.contains(family))
    }
}
