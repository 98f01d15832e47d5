//! The recommendation engine: validate entries, build the prompt, call the
//! model, validate the reply, and retry the whole run on malformed output.
//!
//! Each attempt repeats every step from raw entries onward, so a retry takes
//! exactly the same path as the first try. Validation and prompt building
//! are pure and cheap; the completion call dominates.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::client::CompletionClient;
use crate::entry::{validate_history, validate_to_read, BookEntry, ToReadEntry};
use crate::error::{RecommendError, Result};
use crate::events::{emit, Event, EventHandler};
use crate::output::{validate_output, OutputError};
use crate::prompt::{PromptBuilder, PromptStyle, QuizAnswer, RenderedPrompt};
use crate::retry::RetryPolicy;
use crate::types::RecommendationSet;

/// Produces exactly three validated recommendations per request.
///
/// Holds no per-request state, so one instance can be shared (e.g. behind
/// an `Arc`) across concurrent requests.
///
/// # Example
///
/// ```
/// use booklog_recs::{CompletionClient, MockBackend, Recommender};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let reply = json!([
///     {"title": "Brave New World", "author": "Aldous Huxley", "description": "A sibling dystopia."},
///     {"title": "Fahrenheit 451", "author": "Ray Bradbury", "description": "Books as resistance."},
///     {"title": "The Handmaid's Tale", "author": "Margaret Atwood", "description": "Control of bodies."}
/// ]);
/// let client = CompletionClient::builder("http://unused")
///     .backend(Arc::new(MockBackend::fixed(reply.to_string())))
///     .build()?;
/// let engine = Recommender::new(client);
///
/// let history = vec![json!({"book_name": "1984", "author_name": "George Orwell",
///                           "reflection": "surveillance and control"})];
/// let recs = engine.get_recommendations(&history, &[]).await?;
/// assert_eq!(recs.len(), 3);
/// # Ok::<(), booklog_recs::RecommendError>(())
/// # }).unwrap();
/// ```
pub struct Recommender {
    client: CompletionClient,
    retry: RetryPolicy,
    style: PromptStyle,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Recommender {
    /// Engine with the default policy (3 attempts) and librarian prompt.
    pub fn new(client: CompletionClient) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            style: PromptStyle::default(),
            event_handler: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    /// Recommend from raw history and to-read rows.
    ///
    /// Invalid rows are skipped. Returns the terminal
    /// [`RecommendError::Exhausted`] once every attempt produced malformed
    /// output; upstream service errors are returned on first occurrence.
    #[instrument(skip_all, fields(history = history.len(), to_read = to_read.len()))]
    pub async fn get_recommendations(
        &self,
        history: &[Value],
        to_read: &[Value],
    ) -> Result<RecommendationSet> {
        self.run(history, to_read, &[]).await
    }

    /// Same as [`get_recommendations`](Self::get_recommendations), with quiz
    /// answers rendered into the prompt alongside the history.
    #[instrument(skip_all, fields(history = history.len(), to_read = to_read.len(), quiz = quiz.len()))]
    pub async fn get_recommendations_with_quiz(
        &self,
        history: &[Value],
        to_read: &[Value],
        quiz: &[QuizAnswer],
    ) -> Result<RecommendationSet> {
        self.run(history, to_read, quiz).await
    }

    /// Recommend from already-typed entries.
    pub async fn recommend(
        &self,
        history: &[BookEntry],
        to_read: &[ToReadEntry],
    ) -> Result<RecommendationSet> {
        let history: Vec<Value> = history.iter().map(Value::from).collect();
        let to_read: Vec<Value> = to_read.iter().map(Value::from).collect();
        self.get_recommendations(&history, &to_read).await
    }

    async fn run(
        &self,
        history: &[Value],
        to_read: &[Value],
        quiz: &[QuizAnswer],
    ) -> Result<RecommendationSet> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            emit(&self.event_handler, Event::AttemptStart { attempt });

            match self.attempt(attempt, history, to_read, quiz).await? {
                Ok(set) => {
                    tracing::info!(attempt, "Recommendations validated");
                    emit(&self.event_handler, Event::Completed { attempts: attempt });
                    return Ok(set);
                }
                Err(e) => {
                    tracing::warn!(attempt, max_attempts, reason = %e, "Malformed recommendation output");
                    emit(
                        &self.event_handler,
                        Event::AttemptFailed {
                            attempt,
                            reason: e.to_string(),
                        },
                    );

                    if attempt >= max_attempts {
                        tracing::error!(attempts = attempt, "Recommendation attempts exhausted");
                        emit(&self.event_handler, Event::Exhausted { attempts: attempt });
                        return Err(RecommendError::Exhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                }
            }
        }
    }

    /// One full pipeline run. The outer `Result` carries fatal errors, the
    /// inner one malformed output.
    async fn attempt(
        &self,
        attempt: u32,
        history: &[Value],
        to_read: &[Value],
        quiz: &[QuizAnswer],
    ) -> Result<std::result::Result<RecommendationSet, OutputError>> {
        let history = validate_history(history);
        let to_read = validate_to_read(to_read);

        let prompt = PromptBuilder::new()
            .with_style(self.style)
            .with_quiz(quiz.to_vec())
            .build(&history, &to_read);
        tracing::debug!(attempt, chars = prompt.len(), "Prompt built");
        emit(
            &self.event_handler,
            Event::PromptBuilt {
                attempt,
                prompt: prompt.clone(),
            },
        );

        let raw = self.client.complete(&RenderedPrompt::split(&prompt)).await?;
        Ok(validate_output(&raw))
    }
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("client", &self.client)
            .field("retry", &self.retry)
            .field("style", &self.style)
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}
