//! Answer-formatting flow - workflow layer
//!
//! Sequences one submission through Verification -> (Formatting | Halt) and
//! owns the status/error surface. No failure mode crosses this boundary as
//! a raised fault: every outcome resolves to a terminal status plus an
//! advisory error string on the returned state.

use anyhow::Result;
use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use crate::config::Config;
use crate::merge;
use crate::models::{PageInput, PageRecord};
use crate::parser;
use crate::prompts::{DATA_FORMATTER_PROMPT, OCR_TEXT_SLOT};
use crate::services::verification::combine_pages;
use crate::services::{ChatModel, PageExtractor, VerificationGate};
use crate::utils::logging::truncate_text;
use crate::workflow::state::{WorkflowState, WorkflowStatus};

/// Fields a single-page extraction must already carry for the formatting
/// stage to be bypassed entirely.
const REQUIRED_FIELDS: [&str; 3] = ["question", "answer", "feedback"];

/// Defaults applied when the formatter-fallback response omits schema keys.
const DEFAULT_WORD_LIMIT: u32 = 150;
const DEFAULT_MAXIMUM_MARKS: u32 = 10;

enum NextStep {
    Format,
    End,
}

/// One submission's processing flow.
///
/// Owns the model client and the capability services; holds no per-request
/// state. Construct once, then call [`AnswerFlow::process`] per submission.
pub struct AnswerFlow<M> {
    model: M,
    extractor: PageExtractor,
    gate: VerificationGate,
    verbose_logging: bool,
}

impl<M: ChatModel> AnswerFlow<M> {
    pub fn new(model: M, config: &Config) -> Self {
        Self {
            model,
            extractor: PageExtractor::new(config),
            gate: VerificationGate::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// Access the underlying model.
    pub fn model_ref(&self) -> &M {
        &self.model
    }

    /// Run one submission start to finish. Always returns a state with a
    /// terminal status; never fails.
    pub async fn process(&self, inputs: &[PageInput]) -> WorkflowState {
        let ocr_texts = self.extractor.extract_all(&self.model, inputs).await;
        let mut state = WorkflowState::new(ocr_texts);

        self.verification_stage(&mut state).await;

        match self.decide_next_step(&state) {
            NextStep::Format => self.formatting_stage(&mut state).await,
            NextStep::End => {}
        }

        state
    }

    fn decide_next_step(&self, state: &WorkflowState) -> NextStep {
        match state.status {
            WorkflowStatus::Verified => NextStep::Format,
            _ => NextStep::End,
        }
    }

    async fn verification_stage(&self, state: &mut WorkflowState) {
        let outcome = self.gate.verify(&self.model, &state.ocr_texts).await;

        state.is_relevant = outcome.is_relevant;
        state.has_valid_format = outcome.has_valid_format;

        if outcome.passed() {
            info!("✓ verification passed");
            state.status = WorkflowStatus::Verified;
        } else {
            warn!("⚠️ verification failed: {}", outcome.reason);
            state.status = WorkflowStatus::FailedVerification;
            state.error = Some(outcome.reason);
        }
    }

    async fn formatting_stage(&self, state: &mut WorkflowState) {
        // Unreachable when the transition rule above holds, but the stage
        // guards its own precondition rather than trusting the caller.
        if !state.is_relevant || !state.has_valid_format {
            state.status = WorkflowStatus::SkippedFormatting;
            return;
        }

        match self.format_answer(&state.ocr_texts).await {
            Ok(data) => {
                info!("✓ formatting complete");
                state.formatted_data = Some(data);
                state.status = WorkflowStatus::Formatted;
            }
            Err(e) => {
                warn!("⚠️ formatting failed: {}", e);
                state.formatted_data = None;
                state.error = Some(format!("Formatting error: {}", e));
                state.status = WorkflowStatus::FailedFormatting;
            }
        }
    }

    async fn format_answer(&self, ocr_texts: &[String]) -> Result<JsonValue> {
        // Single-page shortcut: when extraction already produced a complete
        // structured record, emit it as-is and skip the formatting call.
        if ocr_texts.len() == 1 {
            if let Some(complete) = complete_single_page(&ocr_texts[0]) {
                info!("✓ single page already fully structured, bypassing formatter");
                return Ok(complete);
            }
        }

        // Parse every page with the layered-fallback parser and merge.
        let records: Vec<PageRecord> = ocr_texts
            .iter()
            .map(|text| parser::parse_page(text))
            .collect();

        let parsed_count = records.iter().filter(|r| r.parse_succeeded).count();
        info!("parsed {}/{} pages", parsed_count, records.len());
        if self.verbose_logging {
            for (i, record) in records.iter().enumerate() {
                info!(
                    "  page {}: parsed={} answer={:?}",
                    i + 1,
                    record.parse_succeeded,
                    record.answer.as_deref().map(|a| truncate_text(a, 60))
                );
            }
        }

        if parsed_count > 0 {
            let merged = merge::merge(&records);
            return Ok(serde_json::to_value(merged)?);
        }

        // No page yielded a record: hand the combined raw text back to the
        // model with the formatter template.
        warn!("⚠️ no page parsed, falling back to LLM formatter");
        self.format_via_llm(ocr_texts).await
    }

    async fn format_via_llm(&self, ocr_texts: &[String]) -> Result<JsonValue> {
        let combined = combine_pages(ocr_texts, None);
        let prompt = DATA_FORMATTER_PROMPT.replace(OCR_TEXT_SLOT, &combined);

        let response = self.model.invoke(&prompt, None, &[]).await?;

        let record = parser::parse_page(&response);
        if !record.parse_succeeded {
            anyhow::bail!("formatter response contained no parseable record");
        }

        // Fill schema keys the model omitted, as the prompt contract allows.
        Ok(json!({
            "question": record.question,
            "answer": record.answer,
            "feedback": record.feedback,
            "word_limit": record.word_limit.unwrap_or(DEFAULT_WORD_LIMIT),
            "maximum_marks": record.maximum_marks.unwrap_or(DEFAULT_MAXIMUM_MARKS),
        }))
    }
}

/// Strict check for the single-page shortcut: the raw text must already
/// parse directly as JSON and carry all three required fields. Anything
/// less falls through to normal parsing; no repair tiers apply here.
fn complete_single_page(raw: &str) -> Option<JsonValue> {
    let json_str = parser::extract_json_object(raw)?;
    let value: JsonValue = serde_json::from_str(json_str).ok()?;
    if !value.is_object() {
        return None;
    }
    if REQUIRED_FIELDS.iter().all(|field| value.get(field).is_some()) {
        Some(value)
    } else {
        None
    }
}
