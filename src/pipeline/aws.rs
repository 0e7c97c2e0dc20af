use async_trait::async_trait;
use aws_sdk_codepipeline::error::DisplayErrorContext;
use aws_sdk_codepipeline::Client;
use log::debug;

use crate::error::{NotifierError, Result};

use super::execution::{ExecutionDetail, ExecutionStore};

/// Execution store backed by the CodePipeline `GetPipelineExecution` API.
#[derive(Clone)]
pub struct CodePipelineStore {
    client: Client,
}

impl CodePipelineStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ExecutionStore for CodePipelineStore {
    async fn fetch(&self, pipeline_name: &str, execution_id: &str) -> Result<ExecutionDetail> {
        debug!("Fetching execution {execution_id} of pipeline {pipeline_name}");

        let output = self
            .client
            .get_pipeline_execution()
            .pipeline_name(pipeline_name)
            .pipeline_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| NotifierError::DetailLookup(DisplayErrorContext(&e).to_string()))?;

        let execution = output.pipeline_execution.ok_or_else(|| {
            NotifierError::DetailLookup(format!("execution {execution_id} not found"))
        })?;

        let status = execution
            .status
            .as_ref()
            .map(|status| status.as_str().to_owned())
            .unwrap_or_default();

        let trigger_detail = execution
            .trigger
            .and_then(|trigger| trigger.trigger_detail);

        let revisions = execution
            .artifact_revisions
            .into_iter()
            .flatten()
            .filter_map(|revision| revision.revision_id)
            .collect();

        Ok(ExecutionDetail {
            status,
            trigger_detail,
            revisions,
        })
    }
}
