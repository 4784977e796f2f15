//! End-to-end flow tests over a scripted stub model.
//!
//! Each test scripts the exact sequence of model responses the flow should
//! consume; the stub counts calls so tests can also assert which stages
//! issued external calls at all.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::json;
use upsc_answer_formatter::{
    AnswerFlow, AppResult, ChatModel, Config, PageInput, WorkflowStatus,
};

struct StubModel {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl StubModel {
    fn scripted(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChatModel for StubModel {
    async fn invoke(
        &self,
        _user_message: &str,
        _system_message: Option<&str>,
        _images: &[String],
    ) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_default())
    }
}

const VERIFY_PASS: &str = r#"{"is_relevant": true, "has_valid_format": true, "reason": "ok"}"#;

fn text_pages(pages: &[&str]) -> Vec<PageInput> {
    pages.iter().map(|p| PageInput::Text(p.to_string())).collect()
}

fn flow(model: StubModel) -> AnswerFlow<StubModel> {
    AnswerFlow::new(model, &Config::default())
}

#[tokio::test]
async fn empty_input_fails_verification_without_any_call() {
    let model = StubModel::scripted(&[]);
    let flow = AnswerFlow::new(model, &Config::default());

    let state = flow.process(&[]).await;

    assert_eq!(state.status, WorkflowStatus::FailedVerification);
    assert_eq!(state.error.as_deref(), Some("No OCR text provided."));
    assert!(state.formatted_data.is_none());
    assert_eq!(flow.model_ref().call_count(), 0);
}

#[tokio::test]
async fn single_complete_page_bypasses_the_formatting_call() {
    let page = r#"{"question": "Q", "answer": "A", "feedback": []}"#;
    let model = StubModel::scripted(&[VERIFY_PASS]);
    let flow = flow(model);

    let state = flow.process(&text_pages(&[page])).await;

    assert_eq!(state.status, WorkflowStatus::Formatted);
    // The record comes back unchanged; only the verification call happened
    assert_eq!(
        state.formatted_data,
        Some(json!({"question": "Q", "answer": "A", "feedback": []}))
    );
    assert_eq!(flow_calls(&flow), 1);
}

#[tokio::test]
async fn failed_verification_halts_with_reason() {
    let verdict =
        r#"{"is_relevant": false, "has_valid_format": true, "reason": "Not an exam answer"}"#;
    let model = StubModel::scripted(&[verdict]);
    let flow = flow(model);

    let state = flow.process(&text_pages(&["some shopping list"])).await;

    assert_eq!(state.status, WorkflowStatus::FailedVerification);
    assert_eq!(state.error.as_deref(), Some("Not an exam answer"));
    assert!(!state.is_relevant);
    assert!(state.has_valid_format);
    assert!(state.formatted_data.is_none());
    assert_eq!(flow_calls(&flow), 1);
}

#[tokio::test]
async fn multi_page_records_merge_by_field_ownership() {
    let first = r#"{"question": "Q", "answer": "A1", "feedback": [["F1", "c1"]], "word_limit": 250, "maximum_marks": 15}"#;
    let middle = r#"{"answer": "A2", "feedback": [["F2", "c2"]]}"#;
    let last = r#"{"answer": "A3", "feedback": [["F3", "c3"]], "total_marks": "7/10"}"#;

    let model = StubModel::scripted(&[VERIFY_PASS]);
    let flow = flow(model);

    let state = flow.process(&text_pages(&[first, middle, last])).await;

    assert_eq!(state.status, WorkflowStatus::Formatted);
    let data = state.formatted_data.unwrap();
    assert_eq!(data["question"], "Q");
    assert_eq!(data["word_limit"], 250);
    assert_eq!(data["maximum_marks"], 15);
    assert_eq!(data["total_marks"], "7/10");
    assert_eq!(
        data["answer"],
        "A1\n\n--- NEXT PAGE ---\n\nA2\n\n--- NEXT PAGE ---\n\nA3"
    );
    assert_eq!(
        data["feedback"],
        json!([["F1", "c1"], ["F2", "c2"], ["F3", "c3"]])
    );
    // Merging is local: verification was the only external call
    assert_eq!(flow_calls(&flow), 1);
}

#[tokio::test]
async fn unparseable_page_contributes_nothing_but_merge_proceeds() {
    let good = r#"{"question": "Q", "answer": "A1", "feedback": []}"#;
    let bad = "OCR Error on page 2: connection reset";

    let model = StubModel::scripted(&[VERIFY_PASS]);
    let flow = flow(model);

    let state = flow.process(&text_pages(&[good, bad])).await;

    assert_eq!(state.status, WorkflowStatus::Formatted);
    let data = state.formatted_data.unwrap();
    assert_eq!(data["answer"], "A1");
    assert_eq!(flow_calls(&flow), 1);
}

#[tokio::test]
async fn all_pages_unparseable_falls_back_to_llm_formatter() {
    let formatter_response = r#"{"question": "Recovered Q", "answer": "Recovered A", "feedback": [["General", "ok"]]}"#;
    let model = StubModel::scripted(&[VERIFY_PASS, formatter_response]);
    let flow = flow(model);

    let state = flow
        .process(&text_pages(&["illegible scrawl", "more scrawl"]))
        .await;

    assert_eq!(state.status, WorkflowStatus::Formatted);
    let data = state.formatted_data.unwrap();
    assert_eq!(data["question"], "Recovered Q");
    assert_eq!(data["answer"], "Recovered A");
    // Omitted schema keys are defaulted
    assert_eq!(data["word_limit"], 150);
    assert_eq!(data["maximum_marks"], 10);
    assert_eq!(flow_calls(&flow), 2);
}

#[tokio::test]
async fn unusable_formatter_response_fails_formatting() {
    let model = StubModel::scripted(&[VERIFY_PASS, "I am sorry, I cannot help with that."]);
    let flow = flow(model);

    let state = flow
        .process(&text_pages(&["illegible scrawl", "more scrawl"]))
        .await;

    assert_eq!(state.status, WorkflowStatus::FailedFormatting);
    assert!(state.error.as_deref().unwrap().starts_with("Formatting error:"));
    assert!(state.formatted_data.is_none());
    assert_eq!(flow_calls(&flow), 2);
}

#[tokio::test]
async fn free_text_verification_verdict_is_interpreted_heuristically() {
    let page = r#"{"question": "Q", "answer": "A", "feedback": []}"#;
    let model = StubModel::scripted(&[
        "The text is clearly relevant and appears to be in valid format.",
    ]);
    let flow = flow(model);

    let state = flow.process(&text_pages(&[page])).await;

    assert_eq!(state.status, WorkflowStatus::Formatted);
}

#[tokio::test]
async fn diagnostic_response_carries_raw_texts_on_failure() {
    let verdict = r#"{"is_relevant": false, "has_valid_format": false, "reason": "noise"}"#;
    let model = StubModel::scripted(&[verdict]);
    let flow = flow(model);

    let state = flow.process(&text_pages(&["raw page text"])).await;
    let response = state.into_response();

    assert_eq!(response["status"], "failed_verification");
    assert_eq!(response["error"], "noise");
    assert_eq!(response["ocr_texts"], json!(["raw page text"]));
}

/// The flow owns the stub, so read the counter through it.
fn flow_calls(flow: &AnswerFlow<StubModel>) -> usize {
    flow.model_ref().call_count()
}
