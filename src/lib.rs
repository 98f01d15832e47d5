//! # BookLog+ Recommendations
//!
//! The recommendation engine behind BookLog+: given a reader's finished
//! books (with reflections) and to-read queue, ask a chat model for three
//! book suggestions and return them only if they honor a strict contract.
//!
//! ## Pipeline
//!
//! ```text
//! raw rows ─► entry ─► prompt ─► client/backend ─► output ─► RecommendationSet
//!    ▲                                               │
//!    └──────────── retry (malformed output) ─────────┘
//! ```
//!
//! - **[`entry`]**: validates raw storage rows into [`BookEntry`] /
//!   [`ToReadEntry`], skipping bad rows.
//! - **[`prompt`]**: deterministic prompt text with an explicit output format.
//! - **[`CompletionClient`]**: one chat-completion call through a [`Backend`].
//! - **[`output`]**: parses the reply, requires exactly three complete
//!   records, strips unverifiable links.
//! - **[`Recommender`]**: runs the pipeline up to [`RetryPolicy::max_attempts`]
//!   times, failing with [`RecommendError::Exhausted`] when the model never
//!   produces a valid reply.
//!
//! ## Quick Start
//!
//! ```no_run
//! use booklog_recs::EngineSettings;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = EngineSettings::from_env()?.into_recommender()?;
//!
//!     let history = vec![json!({
//!         "book_name": "1984",
//!         "author_name": "George Orwell",
//!         "reflection": "surveillance and control"
//!     })];
//!     let recs = engine.get_recommendations(&history, &[]).await?;
//!     for rec in &recs {
//!         println!("{} by {}: {}", rec.title, rec.author, rec.description);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod events;
pub mod link;
pub mod output;
pub mod prompt;
pub mod retry;
pub mod types;

pub use backend::{Backend, MockBackend, MockReply, OpenAiBackend};
pub use client::{CompletionClient, CompletionClientBuilder, LlmConfig};
pub use config::EngineSettings;
pub use engine::Recommender;
pub use entry::{BookEntry, ToReadEntry};
pub use error::{RecommendError, Result};
pub use events::{Event, EventHandler, FnEventHandler};
pub use link::is_goodreads_link;
pub use output::{validate_output, OutputError};
pub use prompt::{build_prompt, PromptBuilder, PromptStyle, QuizAnswer, RenderedPrompt};
pub use retry::RetryPolicy;
pub use types::{RecommendationRecord, RecommendationSet};
