use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::notifier::{NotifierSettings, Repository};

/// Configuration for the pipeline notifier.
///
/// Values come from an optional file, then environment variables set on the
/// deployed function override them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub repository and API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// CodePipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,

    /// Repository owner or organization
    pub owner: Option<String>,

    /// Repository name
    pub repo: Option<String>,

    /// Secrets Manager secret holding `{"token": "..."}`
    #[serde(default = "default_token_secret_name")]
    pub token_secret_name: String,

    /// Deployment environment name
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Commit status context
    #[serde(default = "default_status_context")]
    pub status_context: String,

    /// URL attached to deployment statuses
    pub environment_url: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// AWS region of the pipeline, used for console links
    pub region: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_github_base_url(),
            owner: None,
            repo: None,
            token_secret_name: default_token_secret_name(),
            environment: default_environment(),
            status_context: default_status_context(),
            environment_url: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_secret_name() -> String {
    "/CodePipeline/GitHubToken".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_status_context() -> String {
    "continuous-integration/codepipeline".to_string()
}

fn default_user_agent() -> String {
    "AWS Lambda".to_string()
}

const DEFAULT_REGION: &str = "us-east-1";

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipeline-notifier.toml
    /// 3. ./pipeline-notifier.json
    /// 4. ./pipeline-notifier.yaml
    /// 5. ./pipeline-notifier.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "pipeline-notifier.toml",
            "pipeline-notifier.json",
            "pipeline-notifier.yaml",
            "pipeline-notifier.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Apply the environment variables the deployed function is given.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(owner) = lookup("REPO_OWNER") {
            self.github.owner = Some(owner);
        }
        if let Some(repo) = lookup("REPO_NAME") {
            self.github.repo = Some(repo);
        }
        if let Some(name) = lookup("GITHUB_TOKEN_SECRET_NAME") {
            self.github.token_secret_name = name;
        }
        if let Some(url) = lookup("GITHUB_API_URL") {
            self.github.base_url = url;
        }
        if let Some(environment) = lookup("DEPLOYMENT_ENVIRONMENT") {
            self.github.environment = environment;
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.pipeline.region = Some(region);
        }
        self
    }

    /// Validate and freeze the settings the handler runs with.
    pub fn settings(&self) -> Result<NotifierSettings> {
        let (Some(owner), Some(name)) = (&self.github.owner, &self.github.repo) else {
            bail!("Repository owner and name must be configured (REPO_OWNER / REPO_NAME)");
        };

        Ok(NotifierSettings {
            repository: Repository {
                owner: owner.clone(),
                name: name.clone(),
            },
            token_secret_name: self.github.token_secret_name.clone(),
            environment: self.github.environment.clone(),
            status_context: self.github.status_context.clone(),
            environment_url: self.github.environment_url.clone(),
            region: self
                .pipeline
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}
