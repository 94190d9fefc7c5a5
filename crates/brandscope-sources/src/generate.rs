//! Text generation for AI insights.
//!
//! Generation never returns an error: callers get a [`GenerationOutcome`]
//! and decide how to degrade.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use brandscope_core::AppConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailureKind {
    Timeout,
    Unreachable,
    BadResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub kind: GenerationFailureKind,
    pub detail: String,
}

impl GenerationFailure {
    fn new(kind: GenerationFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            GenerationFailureKind::Timeout => "timed out",
            GenerationFailureKind::Unreachable => "service unreachable",
            GenerationFailureKind::BadResponse => "unusable response",
        };
        write!(f, "{kind}: {}", self.detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(String),
    Failed(GenerationFailure),
}

pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = GenerationOutcome> + Send;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsGenerator {
    /// # Errors
    ///
    /// Returns [`SourceError::Disabled`] when no LLM URL is configured, or
    /// [`SourceError::Http`] if the client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let base_url = config
            .llm_url
            .as_deref()
            .ok_or(SourceError::Disabled("text generation"))?;
        Self::new(
            base_url,
            config.llm_api_key.as_deref(),
            &config.llm_model,
            config.llm_timeout_secs,
        )
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.map(str::to_owned),
            model: model.to_owned(),
        })
    }

    async fn request(&self, prompt: &str, temperature: f32) -> Result<String, GenerationFailure> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationFailure::new(
                GenerationFailureKind::BadResponse,
                format!("HTTP {status}"),
            ));
        }
        let parsed: ChatResponse = response.json().await.map_err(classify)?;
        parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                GenerationFailure::new(GenerationFailureKind::BadResponse, "empty completion")
            })
    }
}

fn classify(err: reqwest::Error) -> GenerationFailure {
    let kind = if err.is_timeout() {
        GenerationFailureKind::Timeout
    } else if err.is_connect() || err.is_request() {
        GenerationFailureKind::Unreachable
    } else {
        GenerationFailureKind::BadResponse
    };
    GenerationFailure::new(kind, err.to_string())
}

impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &str, temperature: f32) -> GenerationOutcome {
        match self.request(prompt, temperature).await {
            Ok(text) => GenerationOutcome::Generated(text),
            Err(failure) => {
                tracing::warn!(error = %failure, "text generation failed");
                GenerationOutcome::Failed(failure)
            }
        }
    }
}

/// Stand-in used when text generation is not configured.
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> GenerationOutcome {
        GenerationOutcome::Failed(GenerationFailure::new(
            GenerationFailureKind::Unreachable,
            "text generation is not configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display_names_the_kind() {
        let failure = GenerationFailure::new(GenerationFailureKind::Timeout, "after 120s");
        assert_eq!(failure.to_string(), "timed out: after 120s");
    }

    #[tokio::test]
    async fn disabled_generator_always_fails() {
        let outcome = DisabledGenerator.generate("prompt", 0.7).await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Failed(GenerationFailure {
                kind: GenerationFailureKind::Unreachable,
                ..
            })
        ));
    }
}
