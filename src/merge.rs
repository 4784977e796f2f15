//! Combination of per-page records into one document-level answer.
//!
//! Field ownership follows page position: the first page that defines
//! `question`/`word_limit`/`maximum_marks` wins (scanned forward), the last
//! page that defines `total_marks` wins (scanned backward), and `answer`/
//! `feedback` concatenate across all pages in forward order.
//!
//! The merge is total: it never fails, and an input where every page failed
//! to parse produces an all-empty result. Failure is signaled upstream by
//! workflow status, not here.

use crate::models::{MergedAnswer, PageRecord};

/// Marker joining per-page answer bodies so downstream consumers can still
/// identify page boundaries.
pub const PAGE_BREAK: &str = "\n\n--- NEXT PAGE ---\n\n";

/// Merge an ordered sequence of page records into one document record.
///
/// Records with `parse_succeeded == false` contribute nothing.
pub fn merge(records: &[PageRecord]) -> MergedAnswer {
    let parsed: Vec<&PageRecord> = records.iter().filter(|r| r.parse_succeeded).collect();

    let mut merged = MergedAnswer::default();

    // Forward scan, first-found-wins. In practice the first page owns these
    // fields, but a first page that omits one is tolerated.
    for record in &parsed {
        if merged.question.is_none() {
            merged.question = non_empty(record.question.as_deref());
        }
        if merged.word_limit.is_none() {
            merged.word_limit = record.word_limit.filter(|n| *n > 0);
        }
        if merged.maximum_marks.is_none() {
            merged.maximum_marks = record.maximum_marks.filter(|n| *n > 0);
        }
    }

    // Backward scan for total marks: the last page that declares one wins.
    for record in parsed.iter().rev() {
        if let Some(marks) = non_empty(record.total_marks.as_deref()) {
            merged.total_marks = Some(marks);
            break;
        }
    }

    // Answers concatenate in forward order with an explicit page break.
    let answers: Vec<&str> = parsed
        .iter()
        .filter_map(|r| r.answer.as_deref())
        .filter(|a| !a.is_empty())
        .collect();
    if !answers.is_empty() {
        merged.answer = Some(answers.join(PAGE_BREAK));
    }

    // Feedback flattens in forward order, duplicates preserved verbatim.
    for record in &parsed {
        merged.feedback.extend(record.feedback.iter().cloned());
    }

    merged
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedbackPair;

    fn page(answer: &str) -> PageRecord {
        PageRecord {
            answer: Some(answer.to_string()),
            parse_succeeded: true,
            ..Default::default()
        }
    }

    #[test]
    fn first_page_owns_question_and_limits_last_owns_total() {
        let first = PageRecord {
            question: Some("Q".to_string()),
            answer: Some("A1".to_string()),
            word_limit: Some(250),
            maximum_marks: Some(15),
            parse_succeeded: true,
            ..Default::default()
        };
        let middle = page("A2");
        let last = PageRecord {
            answer: Some("A3".to_string()),
            total_marks: Some("7/10".to_string()),
            parse_succeeded: true,
            ..Default::default()
        };

        let merged = merge(&[first, middle, last]);
        assert_eq!(merged.question.as_deref(), Some("Q"));
        assert_eq!(merged.word_limit, Some(250));
        assert_eq!(merged.maximum_marks, Some(15));
        assert_eq!(merged.total_marks.as_deref(), Some("7/10"));
        assert_eq!(
            merged.answer.as_deref(),
            Some("A1\n\n--- NEXT PAGE ---\n\nA2\n\n--- NEXT PAGE ---\n\nA3")
        );
    }

    #[test]
    fn feedback_preserves_order_without_dedup() {
        let mut p1 = page("A1");
        p1.feedback = vec![FeedbackPair("A".to_string(), "b".to_string())];
        let mut p2 = page("A2");
        p2.feedback = vec![FeedbackPair("C".to_string(), "d".to_string())];
        let mut p3 = page("A3");
        p3.feedback = vec![FeedbackPair("E".to_string(), "f".to_string())];

        let merged = merge(&[p1, p2, p3]);
        assert_eq!(
            merged.feedback,
            vec![
                FeedbackPair("A".to_string(), "b".to_string()),
                FeedbackPair("C".to_string(), "d".to_string()),
                FeedbackPair("E".to_string(), "f".to_string()),
            ]
        );
    }

    #[test]
    fn identical_feedback_pairs_are_kept_verbatim() {
        let mut p1 = page("A1");
        p1.feedback = vec![FeedbackPair("General".to_string(), "Expand".to_string())];
        let mut p2 = page("A2");
        p2.feedback = vec![FeedbackPair("General".to_string(), "Expand".to_string())];

        let merged = merge(&[p1, p2]);
        assert_eq!(merged.feedback.len(), 2);
    }

    #[test]
    fn later_page_supplies_field_first_page_omitted() {
        let p1 = page("A1");
        let mut p2 = page("A2");
        p2.question = Some("Q from page 2".to_string());

        let merged = merge(&[p1, p2]);
        assert_eq!(merged.question.as_deref(), Some("Q from page 2"));
    }

    #[test]
    fn backward_scan_picks_last_declared_total() {
        let mut p1 = page("A1");
        p1.total_marks = Some("3/10".to_string());
        let mut p2 = page("A2");
        p2.total_marks = Some("7/10".to_string());
        let p3 = page("A3");

        let merged = merge(&[p1, p2, p3]);
        assert_eq!(merged.total_marks.as_deref(), Some("7/10"));
    }

    #[test]
    fn failed_pages_contribute_nothing() {
        let mut failed = PageRecord::failed();
        failed.answer = Some("ghost".to_string());
        let ok = page("real");

        let merged = merge(&[failed, ok]);
        assert_eq!(merged.answer.as_deref(), Some("real"));
    }

    #[test]
    fn all_failed_input_merges_to_empty_without_error() {
        let merged = merge(&[PageRecord::failed(), PageRecord::failed()]);
        assert!(merged.is_empty());
    }

    #[test]
    fn zero_limits_and_empty_strings_are_omitted() {
        let mut p = page("A");
        p.word_limit = Some(0);
        p.maximum_marks = Some(0);
        p.question = Some(String::new());
        p.total_marks = Some(String::new());

        let merged = merge(&[p]);
        assert!(merged.word_limit.is_none());
        assert!(merged.maximum_marks.is_none());
        assert!(merged.question.is_none());
        assert!(merged.total_marks.is_none());
    }

    #[test]
    fn empty_input_merges_to_empty() {
        assert!(merge(&[]).is_empty());
    }
}
