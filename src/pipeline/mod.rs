mod aws;
mod event;
mod execution;
pub mod links;

pub use aws::CodePipelineStore;
pub use event::{LifecycleState, PipelineEvent};
pub use execution::{ExecutionDetail, ExecutionStore};
