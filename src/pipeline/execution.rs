use async_trait::async_trait;

use crate::error::Result;

/// Authoritative record of a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionDetail {
    /// Execution status as reported by CodePipeline (e.g., "InProgress", "Succeeded")
    pub status: String,
    /// Raw JSON trigger detail, carrying the pull request id for PR-triggered runs
    pub trigger_detail: Option<String>,
    /// Commit ids of the execution's source artifacts, in reported order
    pub revisions: Vec<String>,
}

/// Source of execution details, looked up by execution id.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `DetailLookup` when the execution cannot be fetched.
    async fn fetch(&self, pipeline_name: &str, execution_id: &str) -> Result<ExecutionDetail>;
}
