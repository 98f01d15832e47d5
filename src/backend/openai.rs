//! Backend for OpenAI-compatible chat-completions APIs.
//!
//! Endpoint: `POST {base}/v1/chat/completions`. The recommendation engine
//! only needs the non-streaming call and the first choice's content.

use super::{Backend, CompletionRequest, CompletionResponse};
use crate::error::{RecommendError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Backend for any OpenAI-compatible API.
///
/// # Example
///
/// ```
/// use booklog_recs::backend::OpenAiBackend;
///
/// let backend = OpenAiBackend::new().with_api_key("sk-...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone)]
pub struct OpenAiBackend {
    /// Optional API key. If set, sent as `Authorization: Bearer {key}`.
    pub(crate) api_key: Option<String>,
    /// Optional organization ID. If set, sent as `OpenAI-Organization: {org}`.
    pub(crate) organization: Option<String>,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|k| match k.get(..6) {
                    Some(prefix) if k.len() > 6 => format!("{}***", prefix),
                    _ => "***".to_string(),
                }),
            )
            .field("organization", &self.organization)
            .finish()
    }
}

impl OpenAiBackend {
    /// Create a backend without authentication (local OpenAI-compatible servers).
    pub fn new() -> Self {
        Self {
            api_key: None,
            organization: None,
        }
    }

    /// Set the API key for authentication.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the organization ID header.
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the request body for `/v1/chat/completions`.
    fn build_body(request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        // No `response_format`: JSON mode forces a top-level object and the
        // reply must be a bare array.
        json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.config.temperature,
            "max_tokens": request.config.max_tokens,
            "stream": false,
        })
    }

    /// Parse a `Retry-After` header value as seconds.
    fn parse_retry_after(value: &str) -> Option<std::time::Duration> {
        value
            .trim()
            .parse::<u64>()
            .ok()
            .map(std::time::Duration::from_secs)
    }

    fn build_http_request(
        &self,
        client: &Client,
        url: &str,
        body: &Value,
    ) -> reqwest::RequestBuilder {
        let mut req = client.post(url).json(body);

        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        if let Some(ref org) = self.organization {
            req = req.header("OpenAI-Organization", org.as_str());
        }

        req
    }

    /// Text of `choices[0].message.content`, or empty when missing.
    fn first_choice_text(json_resp: &Value) -> String {
        json_resp
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
        let body = Self::build_body(request);

        tracing::debug!(url = %url, model = %request.model, "Sending chat completion request");

        let resp = self.build_http_request(client, &url, &body).send().await?;
        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(Self::parse_retry_after);
            let text = resp.text().await.unwrap_or_default();
            return Err(RecommendError::HttpError {
                status,
                body: text,
                retry_after,
            });
        }

        let json_resp: Value = resp.json().await?;

        Ok(CompletionResponse {
            text: Self::first_choice_text(&json_resp),
            status,
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LlmConfig;

    fn test_request() -> CompletionRequest {
        CompletionRequest::chat(
            "gpt-3.5-turbo",
            "You are a librarian.",
            "Recommend three books.",
            LlmConfig::default(),
        )
    }

    #[test]
    fn test_body_carries_fixed_sampling_settings() {
        let body = OpenAiBackend::build_body(&test_request());

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["stream"], false);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_body_messages_in_order() {
        let body = OpenAiBackend::build_body(&test_request());
        let messages = body["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are a librarian.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Recommend three books.");
    }

    #[test]
    fn test_first_choice_text() {
        let resp = json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [
                {"message": {"role": "assistant", "content": "[1, 2, 3]"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"total_tokens": 42}
        });
        assert_eq!(OpenAiBackend::first_choice_text(&resp), "[1, 2, 3]");
    }

    #[test]
    fn test_first_choice_missing_is_empty() {
        assert_eq!(OpenAiBackend::first_choice_text(&json!({"choices": []})), "");
        assert_eq!(OpenAiBackend::first_choice_text(&json!({})), "");
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            OpenAiBackend::parse_retry_after(" 30 "),
            Some(std::time::Duration::from_secs(30))
        );
        assert_eq!(
            OpenAiBackend::parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            None
        );
    }

    #[test]
    fn test_auth_headers() {
        let backend = OpenAiBackend::new()
            .with_api_key("sk-test123")
            .with_organization("org-abc");

        let client = Client::new();
        let req = backend
            .build_http_request(&client, "https://api.openai.com/v1/chat/completions", &json!({}))
            .build()
            .expect("build request");

        assert_eq!(req.headers().get("Authorization").expect("auth"), "Bearer sk-test123");
        assert_eq!(req.headers().get("OpenAI-Organization").expect("org"), "org-abc");
    }

    #[test]
    fn test_no_auth_headers() {
        let client = Client::new();
        let req = OpenAiBackend::new()
            .build_http_request(&client, "http://localhost:8080/v1/chat/completions", &json!({}))
            .build()
            .expect("build request");
        assert!(req.headers().get("Authorization").is_none());
        assert!(req.headers().get("OpenAI-Organization").is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let backend = OpenAiBackend::new().with_api_key("sk-1234567890abcdef");
        let debug_output = format!("{:?}", backend);
        assert!(!debug_output.contains("1234567890abcdef"));
        assert!(debug_output.contains("sk-123***"));
    }
}
