//! Completion client: one prompt in, one raw completion text out.
//!
//! [`CompletionClient`] carries the HTTP client, the provider [`Backend`],
//! the model, and the fixed sampling settings. It is built once and injected
//! into the [`Recommender`](crate::engine::Recommender); tests swap in a
//! [`MockBackend`](crate::backend::MockBackend).

use crate::backend::{Backend, CompletionRequest, OpenAiBackend};
use crate::error::{RecommendError, Result};
use crate::prompt::RenderedPrompt;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Sampling configuration sent with every completion request.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate. Three short recommendations fit in 300.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 300,
        }
    }
}

impl LlmConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Sends a rendered prompt to the completion service.
///
/// # Example
///
/// ```
/// use booklog_recs::{CompletionClient, MockBackend};
/// use std::sync::Arc;
///
/// let client = CompletionClient::builder("http://unused")
///     .backend(Arc::new(MockBackend::fixed("[]")))
///     .build()
///     .unwrap();
/// assert_eq!(client.model(), "gpt-3.5-turbo");
/// ```
pub struct CompletionClient {
    http: Client,
    base_url: String,
    backend: Arc<dyn Backend>,
    model: String,
    config: LlmConfig,
}

impl CompletionClient {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> CompletionClientBuilder {
        CompletionClientBuilder {
            http: None,
            base_url: base_url.into(),
            backend: None,
            model: DEFAULT_MODEL.to_string(),
            config: LlmConfig::default(),
            timeout: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Send the system + user messages and return the first choice's text.
    ///
    /// Exactly one outbound call. Transport and service errors are returned
    /// unchanged; retrying is the caller's decision.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String> {
        let request = CompletionRequest::chat(
            self.model.clone(),
            &prompt.system,
            &prompt.user,
            self.config.clone(),
        );

        let response = self
            .backend
            .complete(&self.http, &self.base_url, &request)
            .await
            .inspect_err(|e| {
                tracing::warn!(backend = self.backend.name(), error = %e, "Completion call failed");
            })?;

        tracing::debug!(
            backend = self.backend.name(),
            status = response.status,
            chars = response.text.len(),
            "Completion received"
        );
        Ok(response.text)
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`CompletionClient`].
pub struct CompletionClientBuilder {
    http: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    model: String,
    config: LlmConfig,
    timeout: Option<Duration>,
}

impl CompletionClientBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Set the backend. Default: [`OpenAiBackend`] without authentication.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the OpenAI backend with API key authentication.
    pub fn openai_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(OpenAiBackend::new().with_api_key(api_key)));
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the request timeout. Default: 60 seconds.
    ///
    /// Ignored when a custom client is supplied via [`http_client`](Self::http_client).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CompletionClient> {
        if self.model.trim().is_empty() {
            return Err(RecommendError::InvalidConfig("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(RecommendError::InvalidConfig(format!(
                "temperature {} outside 0.0-2.0",
                self.config.temperature
            )));
        }
        if self.config.max_tokens == 0 {
            return Err(RecommendError::InvalidConfig("max_tokens must be positive".into()));
        }

        let http = match self.http {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(Duration::from_secs(60)))
                .build()?,
        };

        Ok(CompletionClient {
            http,
            base_url: normalize_base_url(&self.base_url),
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(OpenAiBackend::new())),
            model: self.model,
            config: self.config,
        })
    }
}

/// Strip known provider path suffixes so the backend can append its own.
/// e.g. "https://api.openai.com/v1" -> "https://api.openai.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for suffix in ["/v1/chat/completions", "/v1/chat", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, MockReply};

    fn mock_client(mock: Arc<MockBackend>) -> CompletionClient {
        CompletionClient::builder("http://unused")
            .backend(mock)
            .build()
            .unwrap()
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 300);
    }

    #[test]
    fn test_llm_config_builder() {
        let config = LlmConfig::default()
            .with_temperature(0.3)
            .with_max_tokens(512);
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 512);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://api.openai.com/v1/"), "https://api.openai.com");
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1/chat/completions"),
            "https://api.openai.com"
        );
        assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_build_rejects_bad_config() {
        let err = CompletionClient::builder("http://x").model(" ").build().unwrap_err();
        assert!(matches!(err, RecommendError::InvalidConfig(_)));

        let err = CompletionClient::builder("http://x")
            .config(LlmConfig::default().with_temperature(3.5))
            .build()
            .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidConfig(_)));

        let err = CompletionClient::builder("http://x")
            .config(LlmConfig::default().with_max_tokens(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidConfig(_)));
    }

    #[test]
    fn test_default_backend_is_openai() {
        let client = CompletionClient::builder("https://api.openai.com/v1")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.backend_name(), "openai");
        assert_eq!(client.base_url(), "https://api.openai.com");
    }

    #[tokio::test]
    async fn test_complete_returns_raw_text() {
        let mock = Arc::new(MockBackend::fixed("raw model text"));
        let client = mock_client(mock.clone());
        let prompt = RenderedPrompt::split("system line\nuser body");
        assert_eq!(client.complete(&prompt).await.unwrap(), "raw model text");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_complete_propagates_service_error_without_retry() {
        let mock = Arc::new(MockBackend::new(vec![
            MockReply::http_error(500, "boom"),
            MockReply::text("never reached"),
        ]));
        let client = mock_client(mock.clone());
        let prompt = RenderedPrompt::split("s\nu");
        let err = client.complete(&prompt).await.unwrap_err();
        assert!(matches!(err, RecommendError::HttpError { status: 500, .. }));
        assert_eq!(mock.calls(), 1);
    }
}
