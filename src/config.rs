use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::OpenAiBackend;
use crate::client::{CompletionClient, LlmConfig, DEFAULT_MODEL};
use crate::engine::Recommender;
use crate::error::Result;
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Engine settings loaded from environment variables
#[derive(Deserialize, Clone)]
pub struct EngineSettings {
    /// API key for the completion service
    pub openai_api_key: String,

    /// Base URL of the OpenAI-compatible service
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    /// Chat model identifier
    #[serde(default = "default_model")]
    pub recommend_model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub recommend_temperature: f64,

    /// Output token budget
    #[serde(default = "default_max_tokens")]
    pub recommend_max_tokens: u32,

    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub recommend_max_attempts: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub recommend_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    300
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_timeout_secs() -> u64 {
    60
}

impl std::fmt::Debug for EngineSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSettings")
            .field("openai_api_key", &"***")
            .field("openai_base_url", &self.openai_base_url)
            .field("recommend_model", &self.recommend_model)
            .field("recommend_temperature", &self.recommend_temperature)
            .field("recommend_max_tokens", &self.recommend_max_tokens)
            .field("recommend_max_attempts", &self.recommend_max_attempts)
            .field("recommend_timeout_secs", &self.recommend_timeout_secs)
            .finish()
    }
}

impl EngineSettings {
    /// Load settings from the environment, reading a `.env` file first if present
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load settings from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, EngineSettings>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig::default()
            .with_temperature(self.recommend_temperature)
            .with_max_tokens(self.recommend_max_tokens)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.recommend_max_attempts)
    }

    /// Build an OpenAI-backed completion client from these settings
    pub fn completion_client(&self) -> Result<CompletionClient> {
        CompletionClient::builder(&self.openai_base_url)
            .backend(Arc::new(
                OpenAiBackend::new().with_api_key(&self.openai_api_key),
            ))
            .model(&self.recommend_model)
            .config(self.llm_config())
            .timeout(Duration::from_secs(self.recommend_timeout_secs))
            .build()
    }

    /// Wire the full engine
    pub fn into_recommender(self) -> Result<Recommender> {
        let client = self.completion_client()?;
        Ok(Recommender::new(client).with_retry(self.retry_policy()))
    }
}
