use std::sync::Arc;

use log::{debug, error, info};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::github::GitHubApi;
use crate::pipeline::{ExecutionStore, PipelineEvent};
use crate::secrets::{resolve_token, SecretStore};

use super::actions::{plan_actions, pull_request_commits, NotificationAction, Outcome, Revisions};
use super::context::{NotificationContext, NotifierSettings};

/// Result reported back to the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

/// What a successful invocation delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub pipeline_name: String,
    pub execution_id: String,
    pub execution_status: String,
    pub pull_request_id: String,
    /// Outbound GitHub requests issued, including lookups
    pub actions: usize,
}

/// Reacts to CodePipeline state changes by updating the triggering pull request.
///
/// Each invocation is independent: the execution detail is fetched, the token
/// resolved once, a comment posted, and then the state's actions are issued
/// one at a time. The first failure stops the sequence.
pub struct PipelineStatusHandler {
    executions: Arc<dyn ExecutionStore>,
    secrets: Arc<dyn SecretStore>,
    github: Arc<dyn GitHubApi>,
    settings: NotifierSettings,
}

impl PipelineStatusHandler {
    pub fn new(
        executions: Arc<dyn ExecutionStore>,
        secrets: Arc<dyn SecretStore>,
        github: Arc<dyn GitHubApi>,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            executions,
            secrets,
            github,
            settings,
        }
    }

    /// Entry point for the runtime. Never fails; errors become a 500 response.
    pub async fn handle(&self, payload: Value) -> HandlerResponse {
        match self.process(payload).await {
            Ok(delivery) => HandlerResponse {
                status_code: 200,
                body: json!({
                    "message": "GitHub pull request updated successfully",
                    "pipelineDetails": delivery,
                })
                .to_string(),
            },
            Err(e) => {
                error!("Error processing CodePipeline event: {e}");
                HandlerResponse {
                    status_code: 500,
                    body: json!({
                        "message": "Failed to update GitHub pull request",
                        "error": e.to_string(),
                    })
                    .to_string(),
                }
            }
        }
    }

    /// Runs one invocation to completion.
    ///
    /// # Errors
    ///
    /// Returns the first failure; actions after it are not attempted.
    pub async fn process(&self, payload: Value) -> Result<Delivery> {
        debug!("Event: {payload}");

        let event = PipelineEvent::from_value(payload)?;
        info!(
            "Pipeline {} execution {} is {}",
            event.pipeline_name, event.execution_id, event.state
        );

        let detail = self
            .executions
            .fetch(&event.pipeline_name, &event.execution_id)
            .await?;
        info!(
            "Execution {} has status {} and {} revisions",
            event.execution_id,
            detail.status,
            detail.revisions.len()
        );

        let pull_request_id = event.pull_request_id(&detail)?;

        let token = resolve_token(self.secrets.as_ref(), &self.settings.token_secret_name).await?;
        info!("Resolved GitHub token from {}", self.settings.token_secret_name);

        let ctx = NotificationContext::new(&self.settings, &event, &detail, pull_request_id, token);
        let api = self.github.as_ref();

        let mut issued = NotificationAction::Comment.execute(api, &ctx).await?;

        if Outcome::from_state(&ctx.state).is_some() {
            let mut revisions = Revisions::from_artifacts(detail.revisions.clone());
            if revisions.is_empty() {
                let (listed, requests) = pull_request_commits(api, &ctx).await?;
                issued += requests;
                revisions = listed;
            }

            for action in plan_actions(&ctx.state, &revisions) {
                issued += action.execute(api, &ctx).await?;
            }
        } else {
            info!("No further actions for state {}", ctx.state);
        }

        Ok(Delivery {
            pipeline_name: ctx.pipeline_name,
            execution_id: ctx.execution_id,
            execution_status: ctx.execution_status,
            pull_request_id: ctx.pull_request_id,
            actions: issued,
        })
    }
}
