//! Document-level merged answer.

use serde::{Deserialize, Serialize};

use crate::models::page::FeedbackPair;

/// The document-level record produced by merging per-page extractions.
///
/// Fields that stayed at their empty default after the merge are omitted
/// from the serialized output entirely rather than emitted as placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedAnswer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_marks: Option<u32>,
    /// All page answers in forward order, joined with the page-break marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// All page feedback in forward order, duplicates preserved verbatim
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub feedback: Vec<FeedbackPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<String>,
}

impl MergedAnswer {
    /// Whether the merge recovered nothing at all.
    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.answer.is_none()
            && self.feedback.is_empty()
            && self.word_limit.is_none()
            && self.maximum_marks.is_none()
            && self.total_marks.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_omitted_from_json() {
        let merged = MergedAnswer {
            answer: Some("[PARAGRAPH] text".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&merged).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj.contains_key("answer"));
    }

    #[test]
    fn default_is_empty() {
        assert!(MergedAnswer::default().is_empty());
    }
}
