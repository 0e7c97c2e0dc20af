use serde::{Deserialize, Serialize};

/// State shared by commit statuses and deployment statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
}

impl StatusState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Approve,
    RequestChanges,
}

/// Body of `POST /repos/{owner}/{repo}/issues/{number}/comments`.
#[derive(Debug, Serialize)]
pub struct CommentRequest {
    pub body: String,
}

/// Body of `POST /repos/{owner}/{repo}/pulls/{number}/reviews`.
#[derive(Debug, Serialize)]
pub struct ReviewRequest {
    /// Omitted when no commit is known; GitHub then reviews the PR head.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    pub body: String,
    pub event: ReviewEvent,
}

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Serialize)]
pub struct CommitStatusRequest {
    pub state: StatusState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

/// Body of `POST /repos/{owner}/{repo}/deployments`.
#[derive(Debug, Serialize)]
pub struct DeploymentRequest {
    #[serde(rename = "ref")]
    pub ref_: String,
    pub environment: String,
    pub description: String,
    pub auto_merge: bool,
    pub required_contexts: Vec<String>,
}

/// Body of `POST /repos/{owner}/{repo}/deployments/{id}/statuses`.
#[derive(Debug, Serialize)]
pub struct DeploymentStatusRequest {
    pub state: StatusState,
    pub log_url: String,
    pub description: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,
}

/// Entry of `GET /repos/{owner}/{repo}/deployments`.
#[derive(Debug, Deserialize)]
pub struct Deployment {
    pub id: u64,
}

/// Entry of `GET /repos/{owner}/{repo}/pulls/{number}/commits`.
#[derive(Debug, Deserialize)]
pub struct PullRequestCommit {
    pub sha: String,
}
