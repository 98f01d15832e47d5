//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over completion providers, translating a
//! normalized [`CompletionRequest`] into a provider HTTP call and the reply
//! back into a [`CompletionResponse`]. Built-in implementations:
//! [`OpenAiBackend`] for chat-completions APIs and [`MockBackend`] for tests.
//!
//! ```text
//! CompletionClient ──► CompletionRequest ──► Backend::complete() ──► CompletionResponse
//!                                                   │
//!                                        ┌──────────┴──────────┐
//!                                  OpenAiBackend           MockBackend
//!                              /v1/chat/completions      scripted replies
//! ```

pub mod mock;
pub mod openai;

pub use mock::{MockBackend, MockReply};
pub use openai::OpenAiBackend;

use crate::client::LlmConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// A normalized completion request, independent of provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. `"gpt-3.5-turbo"`).
    pub model: String,

    /// Conversation sent to the model, in order.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature and output token budget.
    pub config: LlmConfig,
}

impl CompletionRequest {
    /// The two-message exchange used for recommendations: a system
    /// instruction followed by the user prompt. An empty system text is
    /// left out.
    pub fn chat(
        model: impl Into<String>,
        system: &str,
        user: &str,
        config: LlmConfig,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage::new(Role::System, system));
        }
        messages.push(ChatMessage::new(Role::User, user));
        Self {
            model: model.into(),
            messages,
            config,
        }
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,
    /// The message content.
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A normalized completion response.
#[derive(Debug)]
pub struct CompletionResponse {
    /// Text of the first completion choice.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,
}

/// Abstraction over completion providers.
///
/// One call to [`complete`](Backend::complete) is one outbound request.
/// Implementations must not retry internally; a failure is returned as-is.
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a single non-streaming completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_has_system_then_user() {
        let req = CompletionRequest::chat("gpt-3.5-turbo", "Be a librarian.", "Recommend.", LlmConfig::default());
        assert_eq!(req.model, "gpt-3.5-turbo");
        assert_eq!(
            req.messages,
            vec![
                ChatMessage::new(Role::System, "Be a librarian."),
                ChatMessage::new(Role::User, "Recommend."),
            ]
        );
    }

    #[test]
    fn test_chat_request_skips_empty_system() {
        let req = CompletionRequest::chat("m", "", "hi", LlmConfig::default());
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, Role::User);
    }

    #[test]
    fn test_role_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
    }
}
