//! Relevance/format verification - capability layer
//!
//! Decides whether a set of raw OCR texts is a legitimate exam answer
//! before any formatting work happens. Oversized input is reduced
//! deterministically (order-preserving, never sampled at random) so
//! repeated calls on the same submission see the same reduced input.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::parser;
use crate::prompts::{DATA_VERIFICATION_PROMPT, OCR_TEXT_SLOT};
use crate::services::llm_service::ChatModel;

/// Marker between pages in combined verification/formatting input.
pub const IMAGE_SEPARATOR: &str = "\n\n--- IMAGE SEPARATION ---\n\n";

/// The gate's judgment on one submission.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub is_relevant: bool,
    pub has_valid_format: bool,
    pub reason: String,
}

impl VerificationOutcome {
    pub fn passed(&self) -> bool {
        self.is_relevant && self.has_valid_format
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_relevant: false,
            has_valid_format: false,
            reason: reason.into(),
        }
    }
}

pub struct VerificationGate {
    token_limit: usize,
    char_cap: usize,
}

impl VerificationGate {
    pub fn new(config: &Config) -> Self {
        Self {
            token_limit: config.verification_token_limit,
            char_cap: config.verification_char_cap,
        }
    }

    /// Ask the model whether the OCR texts are a relevant, well-formed
    /// exam answer. Empty input short-circuits without an external call.
    /// Uninterpretable responses fail closed.
    pub async fn verify<M: ChatModel>(
        &self,
        model: &M,
        ocr_texts: &[String],
    ) -> VerificationOutcome {
        if ocr_texts.is_empty() {
            return VerificationOutcome::rejected("No OCR text provided.");
        }

        let reduced = self.reduce_pages(ocr_texts);
        let combined = combine_pages(&reduced, Some(self.char_cap));
        let prompt = DATA_VERIFICATION_PROMPT.replace(OCR_TEXT_SLOT, &combined);

        let response = match model.invoke(&prompt, None, &[]).await {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️ verification call failed: {}", e);
                return VerificationOutcome::rejected(format!(
                    "Verification processing error: {}",
                    e
                ));
            }
        };

        let outcome = interpret_response(&response);
        info!(
            "verification: is_relevant={} has_valid_format={}",
            outcome.is_relevant, outcome.has_valid_format
        );
        outcome
    }

    /// Deterministic, order-preserving reduction of oversized input.
    ///
    /// Estimated tokens (total chars / 4) above the limit trigger either a
    /// first/middle/last subset (more than 3 pages) or a per-page character
    /// truncation.
    pub fn reduce_pages(&self, ocr_texts: &[String]) -> Vec<String> {
        let total_chars: usize = ocr_texts.iter().map(|t| t.len()).sum();
        let estimated_tokens = total_chars / 4;

        if estimated_tokens <= self.token_limit {
            return ocr_texts.to_vec();
        }

        if ocr_texts.len() > 3 {
            let subset = [0, ocr_texts.len() / 2, ocr_texts.len() - 1];
            info!(
                "input too large (~{} tokens), keeping pages {:?} of {}",
                estimated_tokens,
                subset,
                ocr_texts.len()
            );
            subset.iter().map(|&i| ocr_texts[i].clone()).collect()
        } else {
            info!(
                "input too large (~{} tokens), truncating each page to {} chars",
                estimated_tokens, self.char_cap
            );
            ocr_texts
                .iter()
                .map(|t| t.chars().take(self.char_cap).collect())
                .collect()
        }
    }
}

/// Concatenate pages with index headers and the explicit separator,
/// optionally capping each page's contribution.
pub fn combine_pages(ocr_texts: &[String], char_cap: Option<usize>) -> String {
    let total = ocr_texts.len();
    let blocks: Vec<String> = ocr_texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let body: String = match char_cap {
                Some(cap) => text.chars().take(cap).collect(),
                None => text.clone(),
            };
            format!("[Image {} of {}]\n{}", i + 1, total, body)
        })
        .collect();
    blocks.join(IMAGE_SEPARATOR)
}

/// Read the two booleans out of the model's response.
///
/// Preferred path: a JSON object with `is_relevant`/`has_valid_format`.
/// Fallback: substring matching on the free text. Anything still
/// inconclusive defaults to a rejection - never guess "pass".
fn interpret_response(response: &str) -> VerificationOutcome {
    if let Some(json_str) = parser::extract_json_object(response) {
        if let Ok(value) = serde_json::from_str::<Value>(json_str) {
            let is_relevant = value
                .get("is_relevant")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let has_valid_format = value
                .get("has_valid_format")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let reason = match value.get("reason") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "Failed verification check".to_string(),
            };
            return VerificationOutcome {
                is_relevant,
                has_valid_format,
                reason,
            };
        }
    }

    // Heuristic fallback over free text
    let lower = response.to_lowercase();
    VerificationOutcome {
        is_relevant: lower.contains("relevant") && !lower.contains("not relevant"),
        has_valid_format: lower.contains("valid format") && !lower.contains("invalid format"),
        reason: "Extracted from text content".to_string(),
    }
}
