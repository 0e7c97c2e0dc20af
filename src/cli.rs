use anyhow::{anyhow, Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_codepipeline::config::Region;
use clap::{Parser, Subcommand};
use lambda_runtime::{service_fn, LambdaEvent};
use log::info;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::github::GitHubClient;
use crate::notifier::{HandlerResponse, PipelineStatusHandler};
use crate::pipeline::CodePipelineStore;
use crate::secrets::SecretsManagerStore;

#[derive(Parser)]
#[command(name = "pipeline-notifier")]
#[command(author, version, about = "Mirrors CodePipeline executions onto GitHub pull requests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (toml, json or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve pipeline state-change events from the Lambda runtime
    Lambda,

    /// Process a single event file and print the handler response
    Replay {
        #[arg(short, long)]
        event: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, default_value_t = false)]
        pretty: bool,
    },
}

impl Cli {
    async fn build_handler(&self) -> Result<PipelineStatusHandler> {
        let config = Config::load(self.config.as_deref())?.with_env();
        let settings = config.settings()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.pipeline.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let github = GitHubClient::new(&config.github.base_url, &config.github.user_agent)?;

        info!(
            "Notifying {}/{} via {}",
            settings.repository.owner, settings.repository.name, config.github.base_url
        );

        Ok(PipelineStatusHandler::new(
            Arc::new(CodePipelineStore::new(&sdk_config)),
            Arc::new(SecretsManagerStore::new(&sdk_config)),
            Arc::new(github),
            settings,
        ))
    }

    async fn execute_lambda(&self) -> Result<()> {
        let handler = Arc::new(self.build_handler().await?);

        lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
            let handler = Arc::clone(&handler);
            async move {
                Ok::<HandlerResponse, lambda_runtime::Error>(handler.handle(event.payload).await)
            }
        }))
        .await
        .map_err(|e| anyhow!("Lambda runtime failed: {e}"))
    }

    async fn execute_replay(
        &self,
        event: &Path,
        output: Option<&Path>,
        pretty: bool,
    ) -> Result<()> {
        let contents = std::fs::read_to_string(event)
            .with_context(|| format!("Failed to read event file: {}", event.display()))?;
        let payload: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse event file: {}", event.display()))?;

        let handler = self.build_handler().await?;
        let response = handler.handle(payload).await;

        let json_output = if pretty {
            serde_json::to_string_pretty(&response)?
        } else {
            serde_json::to_string(&response)?
        };

        if let Some(output_path) = output {
            std::fs::write(output_path, json_output)?;
            info!("Response written to: {}", output_path.display());
        } else {
            println!("{}", json_output);
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Lambda => self.execute_lambda().await,
            Commands::Replay {
                event,
                output,
                pretty,
            } => self.execute_replay(event, output.as_deref(), *pretty).await,
        }
    }
}
