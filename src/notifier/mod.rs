mod actions;
mod context;
mod handler;

pub use context::{NotifierSettings, Repository};
pub use handler::{HandlerResponse, PipelineStatusHandler};
