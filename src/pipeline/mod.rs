pub mod context;
pub mod presence_pipeline;

pub use context::AppContext;
pub use presence_pipeline::{FrameOutcome, PresencePipeline, RunSummary};
