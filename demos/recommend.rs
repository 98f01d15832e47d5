//! Ask for three recommendations from a history file.
//!
//! ```text
//! OPENAI_API_KEY=sk-... cargo run --example recommend -- history.json [to_read.json]
//! ```
//!
//! Both files hold a JSON array of rows as stored by the app. Set
//! `RUST_LOG=booklog_recs=debug` to see each attempt.

use anyhow::Context;
use booklog_recs::EngineSettings;
use serde_json::Value;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn read_rows(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let history_path = args
        .next()
        .context("usage: recommend <history.json> [to_read.json]")?;
    let history = read_rows(Path::new(&history_path))?;
    let to_read = match args.next() {
        Some(path) => read_rows(Path::new(&path))?,
        None => Vec::new(),
    };

    let engine = EngineSettings::from_env()?.into_recommender()?;

    println!("Requesting recommendations...");
    let recs = engine.get_recommendations(&history, &to_read).await?;

    println!("{}", serde_json::to_string_pretty(&recs)?);
    Ok(())
}
