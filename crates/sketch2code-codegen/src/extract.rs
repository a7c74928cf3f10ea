//! Recover a [`GenerationResult`] from free-form model output.
//!
//! Search order:
//! 1. balanced, string-aware scan from each `{`, preferring the first object
//!    that carries an `html` or `css` key, else the first object that parses;
//! 2. the greedy span from the first `{` to the last `}`;
//! 3. the interior of a fenced ```` ```json ```` block.
//!
//! The scan gives up after [`MAX_SCAN_CANDIDATES`] opening braces that do not
//! close into a parsable object, which keeps brace-heavy garbage linear.
//! The greedy fallback is known to break when prose before the payload
//! contains braces; it only runs when the scan found nothing.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use sketch2code_core::types::GenerationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Failed to parse AI response")]
    ParseFailure,

    #[error("Invalid response format from AI")]
    InvalidFormat,
}

/// Concatenate the textual parts of a message's content.
///
/// Content is either a string or an array whose items are strings or
/// `{"type": "text", "text": ...}` parts. Anything else contributes nothing.
pub fn message_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.as_str(),
                Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("text") => {
                    obj.get("text").and_then(Value::as_str).unwrap_or_default()
                }
                _ => "",
            })
            .collect(),
        _ => String::new(),
    }
}

pub fn extract_from_content(content: &Value) -> Result<GenerationResult, ExtractionError> {
    extract_result(&message_text(content))
}

pub fn extract_result(raw: &str) -> Result<GenerationResult, ExtractionError> {
    if raw.trim().is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let object = find_json_object(raw).ok_or(ExtractionError::ParseFailure)?;

    Ok(GenerationResult {
        html: required_field(&object, "html")?,
        css: required_field(&object, "css")?,
        react_component: optional_field(&object, "reactComponent"),
        react_css: optional_field(&object, "reactCss"),
    })
}

fn find_json_object(text: &str) -> Option<Map<String, Value>> {
    if let Some(object) = scan_balanced(text) {
        return Some(object);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Some(object) = parse_object(&text[start..=end]) {
                debug!("JSON recovered from greedy brace span");
                return Some(object);
            }
        }
    }

    let fenced = fenced_json(text)?;
    let object = parse_object(fenced)?;
    debug!("JSON recovered from fenced block");
    Some(object)
}

/// Failed `{` candidates tried before the balanced scan stops.
pub const MAX_SCAN_CANDIDATES: usize = 64;

fn scan_balanced(text: &str) -> Option<Map<String, Value>> {
    let mut first = None;
    let mut misses = 0;
    for (start, _) in text.match_indices('{') {
        if misses >= MAX_SCAN_CANDIDATES {
            debug!(misses, "Balanced scan stopped early");
            break;
        }
        let Some(object) = balanced_end(text, start).and_then(|end| parse_object(&text[start..=end]))
        else {
            misses += 1;
            continue;
        };
        if object.contains_key("html") || object.contains_key("css") {
            return Some(object);
        }
        if first.is_none() {
            first = Some(object);
        }
    }
    first
}

/// Index of the `}` closing the object that opens at `start`, skipping braces
/// inside string literals.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().copied().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn fenced_json(text: &str) -> Option<&str> {
    let open = text.find("```json")?;
    let body = &text[open + "```json".len()..];
    let close = body.find("```")?;
    let inner = body[..close].trim();
    (inner.starts_with('{') && inner.ends_with('}')).then_some(inner)
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn required_field(object: &Map<String, Value>, key: &str) -> Result<String, ExtractionError> {
    match object.get(key).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ExtractionError::InvalidFormat),
    }
}

fn optional_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
