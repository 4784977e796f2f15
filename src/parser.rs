//! Layered-fallback recovery of structured records from model output.
//!
//! Model responses are structurally unreliable: broken JSON, single-quoted
//! keys, trailing prose around the object. Rather than discarding a page on
//! the first syntax defect, parsing degrades through three tiers, each
//! attempted only when the previous one fails:
//!
//! 1. strict: strip markdown code fences, parse the remainder as JSON
//! 2. quote repair: rewrite single-quoted object keys, retry strict
//! 3. field extraction: pull each known field out independently by regex
//!
//! `parse_page` never fails; total failure across all tiers yields a record
//! with `parse_succeeded == false` that the merge step ignores.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::models::{FeedbackPair, PageRecord};

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)```json|```").expect("fence regex"))
}

fn quoted_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{,])\s*'([^']+)'\s*:").expect("quoted key regex"))
}

fn json_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("json object regex"))
}

fn question_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)"question"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("question regex"))
}

fn answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)"answer"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("answer regex"))
}

fn word_limit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""word_limit"\s*:\s*(\d+)"#).expect("word limit regex"))
}

fn max_marks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""maximum_marks"\s*:\s*(\d+)"#).expect("max marks regex"))
}

fn total_marks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""total_marks"\s*:\s*"([^"]*)""#).expect("total marks regex"))
}

fn feedback_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\[\s*"((?:[^"\\]|\\.)*)"\s*,\s*"((?:[^"\\]|\\.)*)"\s*\]"#)
            .expect("feedback pair regex")
    })
}

/// Remove markdown code-fence markers and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    fence_re().replace_all(raw, "").trim().to_string()
}

/// Locate the outermost JSON-object-looking span inside free text.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    json_object_re().find(raw).map(|m| m.as_str())
}

/// Tier 1: strict JSON parse of fence-stripped text.
///
/// Only objects qualify; a bare scalar or array cannot carry a page record.
pub fn parse_strict(clean: &str) -> Result<Value, ParseError> {
    let value: Value =
        serde_json::from_str(clean).map_err(|source| ParseError::InvalidJson { source })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ParseError::NoJsonObject)
    }
}

/// Tier 2 rewrite: single-quoted object keys become double-quoted.
///
/// Pattern: a key preceded by `{` or `,` and wrapped in single quotes.
pub fn repair_quoted_keys(clean: &str) -> String {
    quoted_key_re().replace_all(clean, "$1 \"$2\":").to_string()
}

/// Turn one raw model response into a best-effort page record.
///
/// Never fails; a record with `parse_succeeded == false` marks total
/// extraction failure for the page.
pub fn parse_page(raw: &str) -> PageRecord {
    let clean = strip_code_fences(raw);
    if clean.is_empty() {
        return PageRecord::failed();
    }

    // Tier 1: strict parse
    match parse_strict(&clean) {
        Ok(value) => return record_from_value(&value),
        Err(e) => debug!("strict JSON parse failed: {}", e),
    }

    // Tier 2: quote repair, then strict again
    let repaired = repair_quoted_keys(&clean);
    match parse_strict(&repaired) {
        Ok(value) => return record_from_value(&value),
        Err(e) => debug!("quote-repaired parse failed: {}", e),
    }

    // Tier 3: per-field regex extraction
    match extract_fields(&clean) {
        Ok(record) => {
            debug!("recovered record via field extraction");
            record
        }
        Err(e) => {
            debug!("field extraction failed: {}", e);
            PageRecord::failed()
        }
    }
}

/// Build a page record from a decoded JSON object.
///
/// Lenient on shape: unknown keys are ignored, malformed feedback entries
/// are skipped, numbers are accepted where the schema asks for them.
pub fn record_from_value(value: &Value) -> PageRecord {
    let question = value.get("question").and_then(Value::as_str).map(str::to_string);
    let answer = value.get("answer").and_then(Value::as_str).map(str::to_string);
    let word_limit = value
        .get("word_limit")
        .and_then(Value::as_u64)
        .map(|n| n as u32);
    let maximum_marks = value
        .get("maximum_marks")
        .and_then(Value::as_u64)
        .map(|n| n as u32);
    let total_marks = match value.get("total_marks") {
        Some(Value::String(s)) => Some(s.clone()),
        // An evaluator writing "8" may come back as a bare number
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let feedback = value
        .get("feedback")
        .and_then(Value::as_array)
        .map(|items| feedback_from_items(items))
        .unwrap_or_default();

    PageRecord {
        question,
        answer,
        feedback,
        word_limit,
        maximum_marks,
        total_marks,
        parse_succeeded: true,
    }
}

fn feedback_from_items(items: &[Value]) -> Vec<FeedbackPair> {
    items
        .iter()
        .filter_map(|item| {
            let pair = item.as_array()?;
            let related = pair.first()?.as_str()?;
            let comment = pair.get(1)?.as_str()?;
            Some(FeedbackPair(related.to_string(), comment.to_string()))
        })
        .collect()
}

/// Tier 3: extract each known field independently by regex.
///
/// Failure to find one field does not block the others, but a record that
/// recovered neither question nor answer is useless to the merge and is
/// reported as a failure.
pub fn extract_fields(clean: &str) -> Result<PageRecord, ParseError> {
    let question = question_re()
        .captures(clean)
        .map(|c| unescape(&c[1]));
    let answer = answer_re().captures(clean).map(|c| unescape(&c[1]));
    let word_limit = word_limit_re()
        .captures(clean)
        .and_then(|c| c[1].parse::<u32>().ok());
    let maximum_marks = max_marks_re()
        .captures(clean)
        .and_then(|c| c[1].parse::<u32>().ok());
    let total_marks = total_marks_re().captures(clean).map(|c| c[1].to_string());
    let feedback = extract_feedback_array(clean)
        .map(|slice| parse_feedback_slice(&slice))
        .unwrap_or_default();

    if question.is_none() && answer.is_none() {
        return Err(ParseError::NoKeyFields);
    }

    Ok(PageRecord {
        question,
        answer,
        feedback,
        word_limit,
        maximum_marks,
        total_marks,
        parse_succeeded: true,
    })
}

/// Slice out the balanced `[...]` following `"feedback":`.
///
/// A lazy regex stops at the first `]`, which closes the first inner pair
/// rather than the outer array, so this walks brackets by hand. String
/// state is tracked so brackets inside quoted text do not shift the depth.
fn extract_feedback_array(clean: &str) -> Option<String> {
    let key_pos = clean.find("\"feedback\"")?;
    let after_key = &clean[key_pos..];
    let open = after_key.find('[')?;
    let slice = &after_key[open..];

    let mut depth = 0usize;
    let mut string_delim: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in slice.char_indices() {
        if let Some(delim) = string_delim {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == delim {
                string_delim = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => string_delim = Some(ch),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(slice[..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a feedback array slice: strict JSON, then single-quote repair,
/// then pairwise regex extraction of `["x", "y"]` tuples.
fn parse_feedback_slice(slice: &str) -> Vec<FeedbackPair> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(slice) {
        return feedback_from_items(&items);
    }
    let requoted = slice.replace('\'', "\"");
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&requoted) {
        return feedback_from_items(&items);
    }
    feedback_pair_re()
        .captures_iter(slice)
        .map(|c| FeedbackPair(unescape(&c[1]), unescape(&c[2])))
        .collect()
}

/// Undo the escapes the string-capture regexes leave in place.
fn unescape(captured: &str) -> String {
    captured
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}
