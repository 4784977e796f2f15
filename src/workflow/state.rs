//! Workflow state and status.
//!
//! One `WorkflowState` is created per submission, mutated by each stage,
//! and read by the caller once a terminal status is reached. No state is
//! shared across concurrent submissions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Closed set of workflow statuses.
///
/// Transitions:
/// `initialized -> verified -> formatted` (success path);
/// `initialized -> failed_verification`;
/// `verified -> failed_formatting`;
/// `verified -> skipped_formatting`.
/// Every status except `initialized` and `verified` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    Verified,
    Formatted,
    FailedVerification,
    FailedFormatting,
    SkippedFormatting,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Initialized => "initialized",
            WorkflowStatus::Verified => "verified",
            WorkflowStatus::Formatted => "formatted",
            WorkflowStatus::FailedVerification => "failed_verification",
            WorkflowStatus::FailedFormatting => "failed_formatting",
            WorkflowStatus::SkippedFormatting => "skipped_formatting",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowStatus::Initialized | WorkflowStatus::Verified)
    }
}

impl Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission-scoped pipeline state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    /// Raw per-page OCR texts, in page order
    pub ocr_texts: Vec<String>,
    pub is_relevant: bool,
    pub has_valid_format: bool,
    /// The final structured record, present only on success
    pub formatted_data: Option<JsonValue>,
    pub error: Option<String>,
    pub status: WorkflowStatus,
}

impl WorkflowState {
    pub fn new(ocr_texts: Vec<String>) -> Self {
        Self {
            ocr_texts,
            is_relevant: false,
            has_valid_format: false,
            formatted_data: None,
            error: None,
            status: WorkflowStatus::Initialized,
        }
    }

    /// Shape the caller-facing result.
    ///
    /// On success this is the formatted record itself; on any other
    /// terminal status it is a diagnostic object the caller must branch on
    /// before trusting `formatted_data`.
    pub fn into_response(self) -> JsonValue {
        if self.status == WorkflowStatus::Formatted {
            if let Some(data) = self.formatted_data {
                return data;
            }
        }
        json!({
            "status": self.status,
            "error": self.error,
            "ocr_texts": self.ocr_texts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::FailedVerification).unwrap(),
            "\"failed_verification\""
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(!WorkflowStatus::Initialized.is_terminal());
        assert!(!WorkflowStatus::Verified.is_terminal());
        assert!(WorkflowStatus::Formatted.is_terminal());
        assert!(WorkflowStatus::FailedVerification.is_terminal());
        assert!(WorkflowStatus::FailedFormatting.is_terminal());
        assert!(WorkflowStatus::SkippedFormatting.is_terminal());
    }

    #[test]
    fn success_response_is_the_formatted_record() {
        let mut state = WorkflowState::new(vec!["raw".to_string()]);
        state.status = WorkflowStatus::Formatted;
        state.formatted_data = Some(json!({"question": "Q"}));

        assert_eq!(state.into_response(), json!({"question": "Q"}));
    }

    #[test]
    fn failure_response_is_diagnostic() {
        let mut state = WorkflowState::new(vec!["raw".to_string()]);
        state.status = WorkflowStatus::FailedVerification;
        state.error = Some("No OCR text provided.".to_string());

        let response = state.into_response();
        assert_eq!(response["status"], "failed_verification");
        assert_eq!(response["error"], "No OCR text provided.");
        assert_eq!(response["ocr_texts"][0], "raw");
    }
}
