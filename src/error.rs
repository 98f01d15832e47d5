use std::time::Duration;
use thiserror::Error;

use crate::output::OutputError;

/// Errors produced by the recommendation engine and its completion client.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The completion service returned a body that is not valid JSON.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations when
    /// the provider returns a non-success status code. The engine never
    /// retries these; they surface to the caller immediately.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 401, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// Every attempt produced malformed output.
    #[error("unable to obtain valid recommendations after {attempts} attempts (last error: {last_error})")]
    Exhausted {
        /// Number of pipeline runs that were made.
        attempts: u32,
        /// Why the final attempt was rejected.
        last_error: OutputError,
    },

    /// Invalid configuration detected at build or load time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl RecommendError {
    /// True for the terminal exhaustion error.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RecommendError::Exhausted { .. })
    }

    /// True for failures that came from talking to the completion service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RecommendError::Request(_) | RecommendError::HttpError { .. } | RecommendError::Json(_)
        )
    }
}

impl From<anyhow::Error> for RecommendError {
    fn from(err: anyhow::Error) -> Self {
        RecommendError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
