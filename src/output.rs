//! Validation of the model's raw reply against the recommendation contract.
//!
//! A reply is accepted only if it parses as a JSON array of exactly three
//! objects, each carrying non-empty `title`, `author`, and `description`
//! strings. `link` is soft-validated: anything that is not a Goodreads book
//! URL is dropped from the record instead of failing the reply.
//!
//! Models often wrap JSON in `<think>` blocks, markdown fences, or a line of
//! prose, so the array is located before parsing. No repair is attempted;
//! broken JSON is left to the retry loop.

use serde_json::{Map, Value};

use crate::entry::type_name;
use crate::link::is_goodreads_link;
use crate::types::{RecommendationRecord, RecommendationSet, RECOMMENDATION_COUNT};

/// Why a reply was rejected. Every variant is recoverable by retrying.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The reply was empty or whitespace-only.
    #[error("empty completion")]
    EmptyResponse,

    /// No JSON could be parsed out of the reply.
    #[error("could not parse JSON from completion: {reason} (text: {text})")]
    Unparseable {
        /// The serde error message.
        reason: String,
        /// A truncated copy of the cleaned reply (max 200 chars).
        text: String,
    },

    /// JSON parsed, but the top level is not an array.
    #[error("expected a JSON array of recommendations, got {0}")]
    NotAnArray(&'static str),

    /// The array does not hold exactly the expected number of elements.
    #[error("expected {expected} recommendations, found {found}")]
    WrongCount { expected: usize, found: usize },

    /// An element of the array is not an object.
    #[error("recommendation {index} is not an object (got {found})")]
    NotAnObject { index: usize, found: &'static str },

    /// A required field is absent, null, not a string, or blank.
    #[error("recommendation {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// Parse and validate a raw completion.
///
/// # Examples
///
/// ```
/// use booklog_recs::output::validate_output;
///
/// let raw = r#"[
///   {"title": "Brave New World", "author": "Aldous Huxley", "description": "Another classic dystopia."},
///   {"title": "Fahrenheit 451", "author": "Ray Bradbury", "description": "Censorship and control.",
///    "link": "https://www.goodreads.com/book/show/4381"},
///   {"title": "We", "author": "Yevgeny Zamyatin", "description": "The dystopia that started it.",
///    "link": "https://example.com/we"}
/// ]"#;
/// let set = validate_output(raw).unwrap();
/// assert_eq!(set.len(), 3);
/// assert!(set.as_slice()[1].link.is_some());
/// assert!(set.as_slice()[2].link.is_none());
/// ```
pub fn validate_output(raw: &str) -> Result<RecommendationSet, OutputError> {
    let value = parse_reply(raw)?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(OutputError::NotAnArray(type_name(&other))),
    };

    if items.len() != RECOMMENDATION_COUNT {
        return Err(OutputError::WrongCount {
            expected: RECOMMENDATION_COUNT,
            found: items.len(),
        });
    }

    let records = items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_record(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    // Length was checked above.
    RecommendationSet::try_from(records).map_err(|records| OutputError::WrongCount {
        expected: RECOMMENDATION_COUNT,
        found: records.len(),
    })
}

fn validate_record(index: usize, item: &Value) -> Result<RecommendationRecord, OutputError> {
    let obj = item.as_object().ok_or(OutputError::NotAnObject {
        index,
        found: type_name(item),
    })?;

    Ok(RecommendationRecord {
        title: required_string(obj, index, "title")?,
        author: required_string(obj, index, "author")?,
        description: required_string(obj, index, "description")?,
        link: checked_link(obj, index),
    })
}

fn required_string(
    obj: &Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<String, OutputError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(OutputError::MissingField { index, field })
}

fn checked_link(obj: &Map<String, Value>, index: usize) -> Option<String> {
    let raw = obj.get("link")?;
    let candidate = raw.as_str().map(str::trim);
    if is_goodreads_link(candidate) {
        return candidate.map(str::to_string);
    }
    tracing::warn!(index, link = %raw, "Stripping link that is not a Goodreads book URL");
    None
}

/// Locate and parse the JSON payload in a reply.
///
/// Strategies (in order):
/// 1. The whole reply as-is
/// 2. The whole reply, after removing `<think>` blocks
/// 3. A `` ```json `` fenced block
/// 4. Any fenced block that starts with `[` or `{`
/// 5. The last bracket-matched `[...]` region that parses as an array
fn parse_reply(raw: &str) -> Result<Value, OutputError> {
    if let Ok(v) = serde_json::from_str::<Value>(raw.trim()) {
        return Ok(v);
    }

    let cleaned = strip_think_tags(raw);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(OutputError::EmptyResponse);
    }

    let direct_err = match serde_json::from_str::<Value>(cleaned) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };

    let fenced = extract_code_block_for(cleaned, "json").or_else(|| {
        extract_code_block(cleaned).filter(|c| c.starts_with('[') || c.starts_with('{'))
    });
    if let Some(c) = fenced {
        return serde_json::from_str::<Value>(c).map_err(|e| unparseable(e, c));
    }

    let mut last_err = None;
    for region in bracketed_regions(cleaned, '[', ']').into_iter().rev() {
        match serde_json::from_str::<Value>(region) {
            Ok(v @ Value::Array(_)) => return Ok(v),
            Ok(_) => {}
            Err(e) => {
                last_err.get_or_insert((e, region));
            }
        }
    }

    Err(match last_err {
        Some((e, region)) => unparseable(e, region),
        None => unparseable(direct_err, cleaned),
    })
}

fn unparseable(err: serde_json::Error, text: &str) -> OutputError {
    OutputError::Unparseable {
        reason: err.to_string(),
        text: truncate(text, 200),
    }
}

/// Strip all `<think>...</think>` and `<thinking>...</thinking>` blocks.
/// An unclosed block swallows the rest of the text.
pub fn strip_think_tags(text: &str) -> String {
    let result = strip_tag_variant(text, "<think>", "</think>");
    strip_tag_variant(&result, "<thinking>", "</thinking>")
}

fn strip_tag_variant(text: &str, open: &str, close: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find(open) {
        match result[start..].find(close) {
            Some(end_offset) => {
                let end = start + end_offset + close.len();
                result.replace_range(start..end, "");
            }
            None => {
                result.truncate(start);
                break;
            }
        }
    }
    result
}

/// Content of the first fenced block tagged with `lang`.
fn extract_code_block_for<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    fenced_blocks(text)
        .find(|(tag, _)| tag.eq_ignore_ascii_case(lang))
        .map(|(_, content)| content)
}

/// Content of the first fenced block, whatever its tag.
fn extract_code_block(text: &str) -> Option<&str> {
    fenced_blocks(text).next().map(|(_, content)| content)
}

/// Iterate `(language_tag, trimmed_content)` over closed ``` fences.
fn fenced_blocks(text: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let open = rest.find("```")?;
        let after = &rest[open + 3..];
        let line_end = after.find('\n')?;
        let tag = after[..line_end].trim();
        let body = &after[line_end + 1..];
        let close = body.find("```")?;
        let content = body[..close].trim();
        rest = &body[close + 3..];
        Some((tag, content))
    })
}

/// Every top-level region delimited by `open`/`close`, in order, skipping
/// delimiters inside JSON strings. An unclosed region ends the scan.
fn bracketed_regions(text: &str, open: char, close: char) -> Vec<&str> {
    let mut regions = Vec::new();
    let mut scan_from = 0;

    while let Some(offset) = text[scan_from..].find(open) {
        let start = scan_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape_next = false;
        let mut found_end = None;

        for (i, ch) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }
            match ch {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                c if c == open => depth += 1,
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        found_end = Some(start + i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match found_end {
            Some(end) => {
                regions.push(&text[start..=end]);
                scan_from = end + close.len_utf8();
            }
            None => break,
        }
    }
    regions
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
