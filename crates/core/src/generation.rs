use crate::error::ExtractionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// The external text-generation service. One call per run; the backend is
/// treated as unreliable and its output as unconstrained text.
#[async_trait]
pub trait GenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError>;
}

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct-v0.2";

/// OpenAI-compatible chat-completions client (OpenRouter by default).
#[derive(Debug, Clone)]
pub struct OpenRouterBackend {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
}

impl OpenRouterBackend {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bounds the backend call; expiry surfaces as `GenerationTimeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self) -> Result<Url, ExtractionError> {
        let mut endpoint = self.base_url.clone();
        {
            let mut segments = endpoint.path_segments_mut().map_err(|()| {
                ExtractionError::Generation(format!(
                    "base url cannot have segments appended: {}",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push("chat").push("completions");
        }
        Ok(endpoint)
    }

    async fn request(&self, prompt: &str) -> Result<String, ExtractionError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(self.endpoint()?)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Generation(format!(
                "backend returned {status}: {body}"
            )));
        }

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ExtractionError::Generation("backend response has no choices".to_string())
            })
    }
}

#[async_trait]
impl GenerationBackend for OpenRouterBackend {
    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.request(prompt))
                .await
                .map_err(|_| ExtractionError::GenerationTimeout(limit))?,
            None => self.request(prompt).await,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
