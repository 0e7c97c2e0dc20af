/// Builds the CodePipeline console URL for a single execution.
///
/// # Arguments
///
/// * `region` - AWS region hosting the pipeline (e.g., "ap-southeast-2")
/// * `pipeline_name` - Pipeline name
/// * `execution_id` - Pipeline execution id
///
/// # Returns
///
/// Clickable URL to the execution timeline in the AWS console.
pub fn execution_url(region: &str, pipeline_name: &str, execution_id: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/codesuite/codepipeline/pipelines/{pipeline_name}/executions/{execution_id}/timeline?region={region}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_url() {
        let url = execution_url("ap-southeast-2", "CI-Pipeline", "abc-123");
        assert_eq!(
            url,
            "https://ap-southeast-2.console.aws.amazon.com/codesuite/codepipeline/pipelines/CI-Pipeline/executions/abc-123/timeline?region=ap-southeast-2"
        );
    }
}
