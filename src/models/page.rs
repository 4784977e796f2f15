//! Per-page input and extraction types.

use serde::{Deserialize, Serialize};

/// One unit of per-page input at pipeline entry.
///
/// Either a base64-encoded scan of an answer-sheet page, or OCR text that
/// was already extracted upstream. Constructed once, never mutated.
#[derive(Debug, Clone)]
pub enum PageInput {
    /// Base64-encoded JPEG/PNG image bytes
    Image(String),
    /// Pre-supplied OCR text (extraction is the identity function)
    Text(String),
}

/// Position-based category of a page within a submission.
///
/// The role decides which instruction template the extraction call sends
/// and which fields the page is expected to own: the first page carries
/// `question`/`word_limit`/`maximum_marks`, the last page carries
/// `total_marks`, middle pages only continue `answer`/`feedback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    /// The only page of a single-page submission
    Single,
    First,
    Middle,
    Last,
}

impl PageRole {
    /// Assign a role from a page's index within the submission.
    pub fn assign(index: usize, total: usize) -> Self {
        if total <= 1 {
            PageRole::Single
        } else if index == 0 {
            PageRole::First
        } else if index == total - 1 {
            PageRole::Last
        } else {
            PageRole::Middle
        }
    }
}

/// One evaluator feedback pair: (related answer text, comment).
///
/// Serializes as a two-element JSON array, matching the wire format the
/// extraction prompts request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPair(pub String, pub String);

/// Structured result of parsing one page's raw OCR text.
///
/// All fields are optional: which ones a legitimate page carries depends on
/// its role, and a degraded parse may recover only some of them. A record
/// with `parse_succeeded == false` contributes nothing to the merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRecord {
    pub question: Option<String>,
    /// Answer body with embedded layout markers ([PARAGRAPH], [HEADING], ...)
    pub answer: Option<String>,
    pub feedback: Vec<FeedbackPair>,
    pub word_limit: Option<u32>,
    pub maximum_marks: Option<u32>,
    /// Free text such as "7/10"
    pub total_marks: Option<String>,
    /// Whether any parser tier recovered usable body text
    pub parse_succeeded: bool,
}

impl PageRecord {
    /// A record marking total extraction failure for one page.
    pub fn failed() -> Self {
        Self::default()
    }
}
