//! Value coercion between raw field strings and typed JSON values
//!
//! Fields carry their values as strings; the declared field type decides how
//! a raw string becomes a JSON value on extraction and how a JSON value is
//! rendered back into a string on insertion.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Declared type of a field's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// Detect the best fit: JSON literal if the raw text parses, else string
    #[default]
    Auto,
    /// Keep the value as a string
    String,
    /// Truthiness of the raw value (any non-empty string is true)
    Boolean,
    /// Parse as a floating point number
    Number,
    /// Strict JSON; a malformed literal is an error
    Json,
    /// Parse as a delimited list of values
    List,
}

/// How list-typed values are split and joined
#[derive(Debug, Clone, Default)]
pub struct ListFormat {
    /// Explicit separator; when absent the separator is guessed from the text
    pub separator: Option<String>,
    /// Trim whitespace from each element (default true via `Options`)
    pub trim: bool,
}

/// Coercion errors
#[derive(Debug, Error)]
pub enum CoerceError {
    /// The author declared `type = "json"` and the raw text is not valid JSON.
    /// Deliberately propagated verbatim rather than falling back to a string.
    #[error("invalid JSON value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coerce a raw field string into a JSON value per the declared type.
///
/// Non-numeric input under `Number` yields NaN, which JSON cannot carry;
/// it is encoded as `null` in the output tree.
pub fn coerce(raw: &str, tag: TypeTag, list: &ListFormat) -> Result<Value, CoerceError> {
    let value = match tag {
        TypeTag::Auto => match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => Value::String(raw.to_string()),
        },
        TypeTag::Boolean => Value::Bool(!raw.is_empty()),
        TypeTag::Number => serde_json::Number::from_f64(parse_number(raw))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TypeTag::List => Value::Array(
            parse_list(raw, list)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        TypeTag::Json => serde_json::from_str(raw)?,
        TypeTag::String => Value::String(raw.to_string()),
    };
    Ok(value)
}

/// Render a JSON value back into a raw field string per the declared type.
pub fn format(value: &Value, tag: TypeTag) -> String {
    match tag {
        TypeTag::Json => value.to_string(),
        TypeTag::List => listify(value),
        _ => scalar_text(value),
    }
}

/// Parse the leading numeric portion of a string, NaN when there is none.
fn parse_number(raw: &str) -> f64 {
    let re = Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
    match re.find(raw.trim_start()) {
        Some(m) => m.as_str().parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Parse a string as a list of items.
///
/// Separator preference when none is configured: line breaks if the text
/// contains any, else commas if the text contains any, else runs of
/// whitespace.
pub fn parse_list(text: &str, list: &ListFormat) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let parts: Vec<String> = match &list.separator {
        Some(sep) => text.split(sep.as_str()).map(str::to_string).collect(),
        None if text.contains('\n') => text
            .split('\n')
            .map(|part| part.strip_suffix('\r').unwrap_or(part).to_string())
            .collect(),
        None if text.contains(',') => text.split(',').map(str::to_string).collect(),
        None => text.split_whitespace().map(str::to_string).collect(),
    };

    if list.trim {
        parts.into_iter().map(|part| part.trim().to_string()).collect()
    } else {
        parts
    }
}

/// Serialize an array into a parsable list string.
///
/// Chooses the least intrusive delimiter that still reconstructs cleanly:
/// single spaces when the joined text has no whitespace or commas, `", "`
/// when it has no commas, newlines as the last resort. Non-array input
/// passes through as its plain string form.
pub fn listify(value: &Value) -> String {
    let Value::Array(items) = value else {
        return scalar_text(value);
    };
    let texts: Vec<String> = items.iter().map(scalar_text).collect();
    let cat = texts.concat();
    if !cat.contains(|c: char| c.is_whitespace() || c == ',') {
        texts.join(" ")
    } else if !cat.contains(',') {
        texts.join(", ")
    } else {
        texts.join("\n")
    }
}

/// Plain string form of a value: strings unquoted, everything else as JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
