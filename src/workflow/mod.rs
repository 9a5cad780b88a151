pub mod observer;
pub mod submission_ctx;
pub mod submission_flow;

pub use observer::{PipelineObserver, TracingObserver};
pub use submission_ctx::SubmissionCtx;
pub use submission_flow::{FlowOptions, ProcessResult, SubmissionFlow, SubmissionOutcome};
