//! # UPSC Answer Formatter
//!
//! Converts OCR output from scanned UPSC answer-sheet pages into one
//! normalized structured record: question, answer body with layout markers,
//! feedback pairs, word/mark limits, and total marks.
//!
//! ## Architecture
//!
//! The system is layered; data flows strictly forward:
//!
//! ### Data (`models/`)
//! - `PageInput` / `PageRole` - per-page input and its position category
//! - `PageRecord` - one page's structured extraction
//! - `MergedAnswer` - the document-level result
//!
//! ### Capabilities (`services/`)
//! - `LlmService` - chat/vision calls over an OpenAI-compatible endpoint
//! - `PageExtractor` - page-role-aware OCR extraction
//! - `VerificationGate` - relevance/format judgment with deterministic
//!   input reduction
//!
//! ### Recovery (`parser`, `merge`)
//! - `parser` - three-tier layered-fallback JSON recovery, never fails
//! - `merge` - field-ownership merge of per-page records, total function
//!
//! ### Flow (`workflow/`)
//! - `WorkflowState` / `WorkflowStatus` - submission-scoped state and the
//!   closed status set
//! - `AnswerFlow` - sequences Verification -> (Formatting | Halt)
//!
//! Images/text -> per-page raw text -> per-page record -> merged record ->
//! caller. One flow instance serves one submission at a time; concurrent
//! submissions each construct their own state.

pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod services;
pub mod utils;
pub mod workflow;

// Re-export the common types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{FeedbackPair, MergedAnswer, PageInput, PageRecord, PageRole};
pub use services::{ChatModel, LlmService, PageExtractor, VerificationGate};
pub use workflow::{AnswerFlow, WorkflowState, WorkflowStatus};
