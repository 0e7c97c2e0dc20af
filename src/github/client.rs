use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::Token;
use crate::error::{NotifierError, Result};

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// A single GitHub REST call, described without performing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API root (e.g., "/repos/owner/repo/statuses/abc")
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized to JSON.
    pub fn post(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }
}

/// Executes [`ApiRequest`]s against the GitHub REST API.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Issues `request` and returns the parsed JSON body (`Null` when empty).
    ///
    /// # Errors
    ///
    /// Returns `ExternalService` for any non-2xx status and `ResponseParse`
    /// when a 2xx body is not valid JSON.
    async fn send(&self, token: &Token, request: &ApiRequest) -> Result<Value>;
}

/// Decodes a JSON response body into `T`.
///
/// # Errors
///
/// Returns `ResponseParse` if the body does not have the expected shape.
pub fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| NotifierError::ResponseParse {
        path: path.to_owned(),
        message: e.to_string(),
    })
}

/// GitHub REST client. Holds no credentials; each call carries its own token.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `user_agent` - Value of the `User-Agent` header GitHub requires
    ///
    /// # Errors
    ///
    /// Returns `Config` if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| NotifierError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Trailing slash keeps any path prefix (GitHub Enterprise "/api/v3") on join.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let api_url = Url::parse(&normalized)
            .map_err(|e| NotifierError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self { client, api_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| NotifierError::Config(format!("Invalid API path {path}: {e}")))
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn send(&self, token: &Token, request: &ApiRequest) -> Result<Value> {
        let url = self.endpoint(&request.path)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(token.as_str());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(NotifierError::ExternalService {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| NotifierError::ResponseParse {
            path: request.path.clone(),
            message: e.to_string(),
        })
    }
}
