mod client;
mod types;

pub use client::{decode, ApiRequest, GitHubApi, GitHubClient};
pub use types::{
    CommentRequest, CommitStatusRequest, Deployment, DeploymentRequest,
    DeploymentStatusRequest, PullRequestCommit, ReviewEvent, ReviewRequest, StatusState,
};
