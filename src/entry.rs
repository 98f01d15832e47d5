//! Reading-history and to-read entries, validated from raw storage rows.
//!
//! Rows arrive as loosely-typed JSON mappings. Each row is checked against
//! a fixed field set; extra keys are ignored and rows missing a required
//! string field are skipped with a warning instead of failing the request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A finished book plus the reader's free-text impression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub book_name: String,
    pub author_name: String,
    pub reflection: String,
}

/// A queued, not-yet-read book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToReadEntry {
    pub book_name: String,
    pub author_name: String,
}

/// Why a single raw row was rejected.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// The row is not a JSON object.
    #[error("entry is not an object (got {0})")]
    NotAnObject(&'static str),

    /// A required field is absent or null.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A required field holds something other than a string.
    #[error("field '{field}' must be a string (got {found})")]
    WrongType {
        field: &'static str,
        found: &'static str,
    },
}

impl BookEntry {
    const FIELDS: &'static [&'static str] = &["book_name", "author_name", "reflection"];

    /// Validate a raw row. Unknown keys are dropped.
    ///
    /// ```
    /// use booklog_recs::entry::BookEntry;
    /// use serde_json::json;
    ///
    /// let row = json!({"book_name": "1984", "author_name": "George Orwell",
    ///                  "reflection": "surveillance", "user_id": "u1"});
    /// let entry = BookEntry::from_value(&row).unwrap();
    /// assert_eq!(entry.book_name, "1984");
    /// ```
    pub fn from_value(raw: &Value) -> Result<Self, EntryError> {
        load(raw, Self::FIELDS)
    }
}

impl ToReadEntry {
    const FIELDS: &'static [&'static str] = &["book_name", "author_name"];

    /// Validate a raw row. Unknown keys are dropped.
    pub fn from_value(raw: &Value) -> Result<Self, EntryError> {
        load(raw, Self::FIELDS)
    }
}

impl From<&BookEntry> for Value {
    fn from(entry: &BookEntry) -> Self {
        serde_json::json!({
            "book_name": entry.book_name,
            "author_name": entry.author_name,
            "reflection": entry.reflection,
        })
    }
}

impl From<&ToReadEntry> for Value {
    fn from(entry: &ToReadEntry) -> Self {
        serde_json::json!({
            "book_name": entry.book_name,
            "author_name": entry.author_name,
        })
    }
}

/// Keep the valid history rows, in order, skipping the rest.
pub fn validate_history(raw: &[Value]) -> Vec<BookEntry> {
    validate_all(raw, "history", BookEntry::from_value)
}

/// Keep the valid to-read rows, in order, skipping the rest.
pub fn validate_to_read(raw: &[Value]) -> Vec<ToReadEntry> {
    validate_all(raw, "to_read", ToReadEntry::from_value)
}

fn validate_all<T>(
    raw: &[Value],
    kind: &'static str,
    load: impl Fn(&Value) -> Result<T, EntryError>,
) -> Vec<T> {
    let entries: Vec<T> = raw
        .iter()
        .enumerate()
        .filter_map(|(index, row)| match load(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(kind, index, reason = %e, "Skipping invalid entry");
                None
            }
        })
        .collect();

    tracing::debug!(
        kind,
        received = raw.len(),
        accepted = entries.len(),
        "Validated entries"
    );
    entries
}

/// Check the required fields by hand (for precise errors), then let serde
/// build the struct from just those fields.
fn load<T: DeserializeOwned>(raw: &Value, fields: &[&'static str]) -> Result<T, EntryError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| EntryError::NotAnObject(type_name(raw)))?;

    let mut picked = serde_json::Map::with_capacity(fields.len());
    for &field in fields {
        match obj.get(field) {
            None | Some(Value::Null) => return Err(EntryError::MissingField(field)),
            Some(v @ Value::String(_)) => {
                picked.insert(field.to_string(), v.clone());
            }
            Some(other) => {
                return Err(EntryError::WrongType {
                    field,
                    found: type_name(other),
                })
            }
        }
    }

    // Every field was checked above, so this only fails if `fields` and the
    // struct definition drift apart.
    serde_json::from_value(Value::Object(picked)).map_err(|_| EntryError::MissingField(fields[0]))
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
