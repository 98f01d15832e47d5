//! Scripted backend for testing without a live completion service.
//!
//! [`MockBackend`] plays back pre-configured replies in order and counts
//! calls, so tests can assert exactly how many attempts the engine made.
//!
//! # Example
//!
//! ```
//! use booklog_recs::backend::{MockBackend, MockReply};
//!
//! let mock = MockBackend::new(vec![
//!     MockReply::text("not json"),
//!     MockReply::http_error(503, "overloaded"),
//! ]);
//! assert_eq!(mock.calls(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, CompletionRequest, CompletionResponse};
use crate::error::{RecommendError, Result};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A successful completion with this text.
    Text(String),
    /// A non-success HTTP status from the service.
    HttpError { status: u16, body: String },
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn http_error(status: u16, body: impl Into<String>) -> Self {
        MockReply::HttpError {
            status,
            body: body.into(),
        }
    }
}

/// A test backend that returns scripted replies in order.
///
/// Once the script is exhausted the last reply repeats, so a single-reply
/// mock behaves like a fixed response.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<MockReply>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Create a mock with the given script. Panics on an empty script.
    pub fn new(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "MockBackend requires at least one reply");
        Self {
            replies,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always returns the same text.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::new(vec![MockReply::text(text)])
    }

    /// Create a mock that returns the given texts in order.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(MockReply::text).collect())
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies[idx.min(self.replies.len() - 1)].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        match self.next_reply() {
            MockReply::Text(text) => Ok(CompletionResponse {
                text,
                status: 200,
            }),
            MockReply::HttpError { status, body } => Err(RecommendError::HttpError {
                status,
                body,
                retry_after: None,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
