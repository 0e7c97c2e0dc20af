use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Invalid pipeline event: {0}")]
    InvalidEvent(String),

    #[error("Pipeline execution lookup failed: {0}")]
    DetailLookup(String),

    #[error("Trigger detail carries no pull request id: {0}")]
    MalformedTrigger(String),

    #[error("GitHub token unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("GitHub API responded with status {status}: {body}")]
    ExternalService { status: u16, body: String },

    #[error("Failed to parse GitHub response for {path}: {message}")]
    ResponseParse { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotifierError>;
