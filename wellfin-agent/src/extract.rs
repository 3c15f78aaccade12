//! Pulls the first JSON object out of free-form model text.
//!
//! Models wrap JSON in prose or markdown fences. The scanner makes one pass
//! over the text tracking brace depth, string state and escapes, so braces
//! inside string values never end a span early. A balanced span that does not
//! parse is skipped and the search resumes after it. When an opening brace is
//! never closed, the complete objects nested under it are still candidates.
//!
//! String state is tracked from the first brace onward, so a stray quote in an
//! unclosed prefix hides the objects after it.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// No balanced `{...}` span exists.
    NotFound,
    /// Balanced spans exist but none is a JSON object; carries the last parse error.
    Invalid(String),
}

/// An opening brace and the balanced spans completed directly inside it.
struct Open {
    start: usize,
    children: Vec<(usize, usize)>,
}

pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let mut stack: Vec<Open> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut last_error = None;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if !stack.is_empty() => in_string = true,
            '{' => stack.push(Open { start: i, children: Vec::new() }),
            '}' => {
                let Some(open) = stack.pop() else { continue };
                let span = (open.start, i + c.len_utf8());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(span),
                    None => match parse_span(text, span) {
                        Ok(map) => return Ok(map),
                        Err(e) => last_error = e.or(last_error),
                    },
                }
            }
            _ => {}
        }
    }

    // Braces left open: try what completed inside them, in text order.
    let mut leftovers: Vec<(usize, usize)> = stack.into_iter().flat_map(|open| open.children).collect();
    leftovers.sort_unstable();
    for span in leftovers {
        match parse_span(text, span) {
            Ok(map) => return Ok(map),
            Err(e) => last_error = e.or(last_error),
        }
    }

    match last_error {
        Some(message) => Err(ExtractError::Invalid(message)),
        None => Err(ExtractError::NotFound),
    }
}

/// `Err(None)` when the span is valid JSON but not an object.
fn parse_span(text: &str, (start, end): (usize, usize)) -> Result<Map<String, Value>, Option<String>> {
    match serde_json::from_str::<Value>(&text[start..end]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(None),
        Err(e) => Err(Some(e.to_string())),
    }
}
