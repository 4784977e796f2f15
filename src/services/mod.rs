pub mod llm_service;
pub mod page_extractor;
pub mod verification;

pub use llm_service::{ChatModel, LlmService};
pub use page_extractor::PageExtractor;
pub use verification::{VerificationGate, VerificationOutcome};
