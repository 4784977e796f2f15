//! Per-page OCR extraction - capability layer
//!
//! Turns each input page into a raw text block via one vision call with a
//! page-role-specific instruction template. Pre-supplied OCR text passes
//! through unchanged. A failed call is recorded as an error-tagged text
//! string rather than raised, so downstream parsing treats it uniformly as
//! unparseable content and the rest of the batch continues.

use tracing::{info, warn};

use crate::config::Config;
use crate::models::{PageInput, PageRole};
use crate::prompts::{self, OCR_SYSTEM_PROMPT};
use crate::services::llm_service::ChatModel;

pub struct PageExtractor {
    max_images: usize,
    char_cap: usize,
}

impl PageExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            max_images: config.max_images_per_submission,
            char_cap: config.extraction_char_cap,
        }
    }

    /// Extract raw text from every page, in order, sequentially.
    ///
    /// Inputs beyond the batch cap are dropped with a warning. One page's
    /// call failure does not abort the batch; its slot carries an
    /// error-tagged string instead.
    pub async fn extract_all<M: ChatModel>(
        &self,
        model: &M,
        inputs: &[PageInput],
    ) -> Vec<String> {
        let inputs = if inputs.len() > self.max_images {
            warn!(
                "⚠️ processing only {} of {} pages to avoid token limits",
                self.max_images,
                inputs.len()
            );
            &inputs[..self.max_images]
        } else {
            inputs
        };

        let total = inputs.len();
        let mut results = Vec::with_capacity(total);

        for (idx, input) in inputs.iter().enumerate() {
            match input {
                // Extraction over pre-supplied text is the identity function
                PageInput::Text(text) => results.push(text.clone()),
                PageInput::Image(encoded) => {
                    let role = PageRole::assign(idx, total);
                    let prompt = prompts::extraction_prompt(role);

                    match model
                        .invoke(prompt, Some(OCR_SYSTEM_PROMPT), std::slice::from_ref(encoded))
                        .await
                    {
                        Ok(text) => {
                            info!(
                                "✓ page {}/{} extracted ({:?}, {} chars)",
                                idx + 1,
                                total,
                                role,
                                text.len()
                            );
                            results.push(self.cap_text(text));
                        }
                        Err(e) => {
                            warn!("⚠️ extraction failed on page {}: {}", idx + 1, e);
                            results.push(format!("OCR Error on page {}: {}", idx + 1, e));
                        }
                    }
                }
            }
        }

        results
    }

    fn cap_text(&self, text: String) -> String {
        if text.chars().count() > self.char_cap {
            let capped: String = text.chars().take(self.char_cap).collect();
            capped + "\n...[content truncated due to length]"
        } else {
            text
        }
    }
}
