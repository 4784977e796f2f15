pub mod answer_flow;
pub mod state;

pub use answer_flow::AnswerFlow;
pub use state::{WorkflowState, WorkflowStatus};
