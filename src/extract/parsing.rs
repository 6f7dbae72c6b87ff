//! Model output parsing and prompt budgeting

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{ExtractError, SupplierListing};
use crate::crawler::truncate_chars;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\n?(.*?)```").expect("fence regex is valid")
    })
}

/// Contents of the first Markdown code fence, or the whole text when there is none
///
/// Prose before or after the fenced block is ignored.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse the model's answer as JSON, tolerating a code fence
pub fn parse_json(text: &str) -> Result<Value, ExtractError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ExtractError::Parse("empty model response".to_string()));
    }
    Ok(serde_json::from_str(body)?)
}

/// Decode supplier listings from the model's answer
///
/// Accepts a bare array, an object wrapping the array under `suppliers`,
/// `results` or `data`, or a single listing object.
pub fn parse_listings(text: &str) -> Result<Vec<SupplierListing>, ExtractError> {
    let value = parse_json(text)?;
    let array = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => {
            let wrapped = ["suppliers", "results", "data"]
                .iter()
                .find_map(|key| map.remove(*key).filter(Value::is_array));
            match wrapped {
                Some(array) => array,
                None if map.contains_key("products") => Value::Array(vec![Value::Object(map)]),
                None => {
                    return Err(ExtractError::Parse(
                        "expected a list of supplier listings".to_string(),
                    ));
                }
            }
        }
        other => {
            return Err(ExtractError::Parse(format!(
                "expected a list of supplier listings, got {}",
                other
            )));
        }
    };
    Ok(serde_json::from_value(array)?)
}

/// Rough token count used for prompt budgeting (about four characters per token)
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Encode page sections for the prompt, truncating when over the token budget
pub fn bound_sections(sections: &[String], token_budget: usize, max_chars: usize) -> String {
    let encoded = serde_json::to_string(sections).unwrap_or_default();
    if estimate_tokens(&encoded) > token_budget {
        truncate_chars(&encoded, max_chars).to_string()
    } else {
        encoded
    }
}
