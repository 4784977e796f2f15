pub mod answer;
pub mod page;

pub use answer::MergedAnswer;
pub use page::{FeedbackPair, PageInput, PageRecord, PageRole};
