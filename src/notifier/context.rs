use crate::auth::Token;
use crate::pipeline::{links, ExecutionDetail, LifecycleState, PipelineEvent};

/// GitHub repository the pipeline builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

/// Validated settings the handler is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierSettings {
    pub repository: Repository,
    /// Secrets Manager name of the `{"token": ...}` secret
    pub token_secret_name: String,
    /// Deployment environment name (e.g., "development")
    pub environment: String,
    /// Commit status context (e.g., "continuous-integration/codepipeline")
    pub status_context: String,
    pub environment_url: Option<String>,
    /// AWS region used for console links
    pub region: String,
}

/// Everything one invocation knows about the execution it reports on.
///
/// Built once after the token is resolved and shared read-only by every action.
#[derive(Debug)]
pub struct NotificationContext<'a> {
    pub settings: &'a NotifierSettings,
    pub pipeline_name: String,
    pub execution_id: String,
    pub state: LifecycleState,
    pub execution_status: String,
    pub pull_request_id: String,
    pub execution_url: String,
    pub token: Token,
}

impl<'a> NotificationContext<'a> {
    pub fn new(
        settings: &'a NotifierSettings,
        event: &PipelineEvent,
        detail: &ExecutionDetail,
        pull_request_id: String,
        token: Token,
    ) -> Self {
        Self {
            settings,
            pipeline_name: event.pipeline_name.clone(),
            execution_id: event.execution_id.clone(),
            state: event.state.clone(),
            execution_status: detail.status.clone(),
            pull_request_id,
            execution_url: links::execution_url(
                &settings.region,
                &event.pipeline_name,
                &event.execution_id,
            ),
            token,
        }
    }

    /// API path under `/repos/{owner}/{repo}/`.
    pub fn repo_path(&self, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/{}",
            self.settings.repository.owner, self.settings.repository.name, suffix
        )
    }
}
