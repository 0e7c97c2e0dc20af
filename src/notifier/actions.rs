use log::{info, warn};
use serde_json::Value;

use crate::error::Result;
use crate::github::{
    decode, ApiRequest, CommentRequest, CommitStatusRequest, Deployment,
    DeploymentRequest, DeploymentStatusRequest, GitHubApi, PullRequestCommit, ReviewEvent,
    ReviewRequest, StatusState,
};
use crate::pipeline::LifecycleState;

use super::context::NotificationContext;

/// GitHub rejects status descriptions longer than this.
const MAX_DESCRIPTION_CHARS: usize = 140;

/// Largest page GitHub serves for list endpoints.
const COMMITS_PER_PAGE: usize = 100;

/// The three outcomes GitHub's review tooling distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    InProgress,
    Failed,
}

impl Outcome {
    /// Collapses a lifecycle state; `None` for states that need no reaction.
    pub fn from_state(state: &LifecycleState) -> Option<Self> {
        match state {
            LifecycleState::Succeeded => Some(Self::Succeeded),
            LifecycleState::Started | LifecycleState::Superseded | LifecycleState::Resumed => {
                Some(Self::InProgress)
            }
            LifecycleState::Failed | LifecycleState::Stopped | LifecycleState::Canceled => {
                Some(Self::Failed)
            }
            LifecycleState::Unknown(_) => None,
        }
    }

    fn status_state(self) -> StatusState {
        match self {
            Self::Succeeded => StatusState::Success,
            Self::InProgress => StatusState::Pending,
            Self::Failed => StatusState::Failure,
        }
    }
}

/// Commits an execution reports on, plus the one treated as the PR head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revisions {
    pub ids: Vec<String>,
    pub head: Option<String>,
}

impl Revisions {
    /// Artifact revisions; the first one is the source commit.
    pub fn from_artifacts(ids: Vec<String>) -> Self {
        let ids = path_safe(ids);
        let head = ids.first().cloned();
        Self { ids, head }
    }

    /// Pull request commits, oldest first; the last one is the head.
    pub fn from_pull_request_commits(shas: Vec<String>) -> Self {
        let ids = path_safe(shas);
        let head = ids.last().cloned();
        Self { ids, head }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Revisions end up as a URL path segment; anything but a bare alphanumeric
/// id could redirect the request to another endpoint.
fn path_safe(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .filter(|id| {
            let safe = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric());
            if !safe {
                warn!("Ignoring revision {id:?}: not a commit id");
            }
            safe
        })
        .collect()
}

fn created_id(body: &Value) -> String {
    body.get("id")
        .and_then(Value::as_u64)
        .map_or_else(|| "(no id)".to_string(), |id| id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    Comment,
    Review { approved: bool, commit: Option<String> },
    CommitStatus { revision: String, state: StatusState },
    /// `reference` falls back to the pull request head ref when `None`.
    DeploymentCreate { reference: Option<String> },
    DeploymentStatusUpdate { state: StatusState },
}

/// Maps a lifecycle state to the ordered actions that follow the comment.
pub fn plan_actions(state: &LifecycleState, revisions: &Revisions) -> Vec<NotificationAction> {
    let Some(outcome) = Outcome::from_state(state) else {
        return Vec::new();
    };

    let statuses = revisions
        .ids
        .iter()
        .map(|revision| NotificationAction::CommitStatus {
            revision: revision.clone(),
            state: outcome.status_state(),
        });

    let mut actions = Vec::with_capacity(revisions.ids.len() + 2);
    match outcome {
        Outcome::Succeeded => {
            actions.push(NotificationAction::Review {
                approved: true,
                commit: revisions.head.clone(),
            });
            actions.extend(statuses);
            actions.push(NotificationAction::DeploymentStatusUpdate {
                state: StatusState::Success,
            });
        }
        Outcome::InProgress => {
            actions.extend(statuses);
            actions.push(NotificationAction::DeploymentCreate {
                reference: revisions.head.clone(),
            });
        }
        Outcome::Failed => {
            actions.extend(statuses);
            actions.push(NotificationAction::Review {
                approved: false,
                commit: revisions.head.clone(),
            });
            actions.push(NotificationAction::DeploymentStatusUpdate {
                state: StatusState::Failure,
            });
        }
    }
    actions
}

impl NotificationAction {
    /// Issues the action and returns how many requests went out.
    ///
    /// # Errors
    ///
    /// Propagates the first failing request; nothing after it is sent.
    pub async fn execute(&self, api: &dyn GitHubApi, ctx: &NotificationContext<'_>) -> Result<usize> {
        match self {
            Self::Comment => {
                let request = ApiRequest::post(
                    ctx.repo_path(&format!("issues/{}/comments", ctx.pull_request_id)),
                    &CommentRequest {
                        body: comment_body(ctx),
                    },
                )?;
                let created = api.send(&ctx.token, &request).await?;
                info!(
                    "Posted comment {} on pull request #{}",
                    created_id(&created),
                    ctx.pull_request_id
                );
                Ok(1)
            }
            Self::Review { approved, commit } => {
                let (event, body) = if *approved {
                    (
                        ReviewEvent::Approve,
                        format!("CodePipeline execution {} succeeded.", ctx.execution_id),
                    )
                } else {
                    (
                        ReviewEvent::RequestChanges,
                        format!(
                            "CodePipeline execution {} finished with state {}. See {}",
                            ctx.execution_id, ctx.state, ctx.execution_url
                        ),
                    )
                };
                let request = ApiRequest::post(
                    ctx.repo_path(&format!("pulls/{}/reviews", ctx.pull_request_id)),
                    &ReviewRequest {
                        commit_id: commit.clone(),
                        body,
                        event,
                    },
                )?;
                let created = api.send(&ctx.token, &request).await?;
                info!("Submitted review {} ({event:?})", created_id(&created));
                Ok(1)
            }
            Self::CommitStatus { revision, state } => {
                let request = ApiRequest::post(
                    ctx.repo_path(&format!("statuses/{revision}")),
                    &CommitStatusRequest {
                        state: *state,
                        target_url: ctx.execution_url.clone(),
                        description: describe(ctx),
                        context: ctx.settings.status_context.clone(),
                    },
                )?;
                api.send(&ctx.token, &request).await?;
                info!("Set commit status {} on {revision}", state.as_str());
                Ok(1)
            }
            Self::DeploymentCreate { reference } => {
                let ref_ = reference
                    .clone()
                    .unwrap_or_else(|| format!("refs/pull/{}/head", ctx.pull_request_id));
                let request = ApiRequest::post(
                    ctx.repo_path("deployments"),
                    &DeploymentRequest {
                        ref_,
                        environment: ctx.settings.environment.clone(),
                        description: truncate(format!(
                            "Deploying {} execution {}",
                            ctx.pipeline_name, ctx.execution_id
                        )),
                        auto_merge: false,
                        required_contexts: Vec::new(),
                    },
                )?;
                let created = api.send(&ctx.token, &request).await?;
                info!(
                    "Created deployment {} in {}",
                    created_id(&created),
                    ctx.settings.environment
                );
                Ok(1)
            }
            Self::DeploymentStatusUpdate { state } => {
                let lookup = ApiRequest::get(ctx.repo_path("deployments"))
                    .with_query("environment", &ctx.settings.environment)
                    .with_query("per_page", 1);
                let deployments: Vec<Deployment> =
                    decode(&lookup.path, api.send(&ctx.token, &lookup).await?)?;

                // TODO: match the deployment to this execution instead of trusting the newest one.
                let Some(deployment) = deployments.first() else {
                    warn!(
                        "No deployment found in {}; skipping status {}",
                        ctx.settings.environment,
                        state.as_str()
                    );
                    return Ok(1);
                };

                let request = ApiRequest::post(
                    ctx.repo_path(&format!("deployments/{}/statuses", deployment.id)),
                    &DeploymentStatusRequest {
                        state: *state,
                        log_url: ctx.execution_url.clone(),
                        description: describe(ctx),
                        environment: ctx.settings.environment.clone(),
                        environment_url: ctx.settings.environment_url.clone(),
                    },
                )?;
                api.send(&ctx.token, &request).await?;
                info!(
                    "Set deployment {} status {}",
                    deployment.id,
                    state.as_str()
                );
                Ok(2)
            }
        }
    }
}

/// Lists every commit of the pull request when the execution reports no revisions.
///
/// Pages through the listing until a short page comes back. Returns the
/// revisions together with the number of requests issued.
///
/// # Errors
///
/// Fails on a non-2xx response or an unexpected body shape.
pub async fn pull_request_commits(
    api: &dyn GitHubApi,
    ctx: &NotificationContext<'_>,
) -> Result<(Revisions, usize)> {
    let path = ctx.repo_path(&format!("pulls/{}/commits", ctx.pull_request_id));
    let mut shas = Vec::new();
    let mut page = 1;

    loop {
        let request = ApiRequest::get(path.as_str())
            .with_query("per_page", COMMITS_PER_PAGE)
            .with_query("page", page);
        let commits: Vec<PullRequestCommit> =
            decode(&request.path, api.send(&ctx.token, &request).await?)?;

        let fetched = commits.len();
        shas.extend(commits.into_iter().map(|commit| commit.sha));

        if fetched < COMMITS_PER_PAGE {
            break;
        }
        page += 1;
    }

    info!(
        "Resolved {} commits from pull request #{} in {page} page(s)",
        shas.len(),
        ctx.pull_request_id
    );

    Ok((Revisions::from_pull_request_commits(shas), page))
}

fn comment_body(ctx: &NotificationContext<'_>) -> String {
    format!(
        "CodePipeline Execution Update:\n\
         - Pipeline: {}\n\
         - Execution ID: {}\n\
         - State: {}\n\
         - Status: {}\n\
         - Details: {}",
        ctx.pipeline_name, ctx.execution_id, ctx.state, ctx.execution_status, ctx.execution_url
    )
}

fn describe(ctx: &NotificationContext<'_>) -> String {
    truncate(format!("{} {}", ctx.pipeline_name, ctx.state.as_str().to_lowercase()))
}

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text;
    }
    text.chars().take(MAX_DESCRIPTION_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revisions(ids: &[&str]) -> Revisions {
        Revisions::from_artifacts(ids.iter().map(ToString::to_string).collect())
    }

    fn status(revision: &str, state: StatusState) -> NotificationAction {
        NotificationAction::CommitStatus {
            revision: revision.to_string(),
            state,
        }
    }

    #[test]
    fn test_plan_succeeded() {
        let actions = plan_actions(&LifecycleState::Succeeded, &revisions(&["abc", "def"]));
        assert_eq!(
            actions,
            vec![
                NotificationAction::Review {
                    approved: true,
                    commit: Some("abc".to_string())
                },
                status("abc", StatusState::Success),
                status("def", StatusState::Success),
                NotificationAction::DeploymentStatusUpdate {
                    state: StatusState::Success
                },
            ]
        );
    }

    #[test]
    fn test_plan_in_progress_states() {
        for state in [
            LifecycleState::Started,
            LifecycleState::Superseded,
            LifecycleState::Resumed,
        ] {
            let actions = plan_actions(&state, &revisions(&["abc", "def"]));
            assert_eq!(
                actions,
                vec![
                    status("abc", StatusState::Pending),
                    status("def", StatusState::Pending),
                    NotificationAction::DeploymentCreate {
                        reference: Some("abc".to_string())
                    },
                ],
                "state {state}"
            );
        }
    }

    #[test]
    fn test_plan_failure_states() {
        for state in [
            LifecycleState::Failed,
            LifecycleState::Stopped,
            LifecycleState::Canceled,
        ] {
            let actions = plan_actions(&state, &revisions(&["xyz"]));
            assert_eq!(
                actions,
                vec![
                    status("xyz", StatusState::Failure),
                    NotificationAction::Review {
                        approved: false,
                        commit: Some("xyz".to_string())
                    },
                    NotificationAction::DeploymentStatusUpdate {
                        state: StatusState::Failure
                    },
                ],
                "state {state}"
            );
        }
    }

    #[test]
    fn test_plan_unknown_state_is_inert() {
        let state = LifecycleState::Unknown("SUPERSEDED_UNKNOWN".to_string());
        assert!(plan_actions(&state, &revisions(&["abc"])).is_empty());
        assert_eq!(Outcome::from_state(&state), None);
    }

    #[test]
    fn test_plan_without_revisions_keeps_deployment() {
        let actions = plan_actions(&LifecycleState::Started, &Revisions::default());
        assert_eq!(
            actions,
            vec![NotificationAction::DeploymentCreate { reference: None }]
        );
    }

    #[test]
    fn test_pull_request_commit_head_is_last() {
        let revisions =
            Revisions::from_pull_request_commits(vec!["c1".to_string(), "c2".to_string()]);
        assert_eq!(revisions.head.as_deref(), Some("c2"));
    }

    #[test]
    fn test_revisions_drop_path_unsafe_ids() {
        let revisions = Revisions::from_artifacts(vec![
            "../x".to_string(),
            "abc123".to_string(),
            "def?state=1".to_string(),
            String::new(),
        ]);
        assert_eq!(revisions.ids, vec!["abc123".to_string()]);
        assert_eq!(revisions.head.as_deref(), Some("abc123"));

        let commits = Revisions::from_pull_request_commits(vec!["c1".into(), "c2/..".into()]);
        assert_eq!(commits.head.as_deref(), Some("c1"));
    }

    #[test]
    fn test_created_id_is_optional() {
        assert_eq!(created_id(&serde_json::json!({"id": 12})), "12");
        assert_eq!(created_id(&serde_json::json!({"url": "x"})), "(no id)");
        assert_eq!(created_id(&Value::Null), "(no id)");
    }

    #[test]
    fn test_truncate_long_description() {
        let long = "x".repeat(200);
        assert_eq!(truncate(long).chars().count(), MAX_DESCRIPTION_CHARS);
        assert_eq!(truncate("short".to_string()), "short");
    }
}
