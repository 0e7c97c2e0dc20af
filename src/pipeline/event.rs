use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{NotifierError, Result};

use super::execution::ExecutionDetail;

/// Lifecycle state reported by a CodePipeline execution state-change event.
///
/// States the handler does not know about are kept verbatim in `Unknown`
/// so they can be logged and ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum LifecycleState {
    Started,
    Succeeded,
    Failed,
    Stopped,
    Canceled,
    Superseded,
    Resumed,
    Unknown(String),
}

impl LifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "STARTED",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
            Self::Canceled => "CANCELED",
            Self::Superseded => "SUPERSEDED",
            Self::Resumed => "RESUMED",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for LifecycleState {
    fn from(value: &str) -> Self {
        match value {
            "STARTED" => Self::Started,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "STOPPED" => Self::Stopped,
            "CANCELED" => Self::Canceled,
            "SUPERSEDED" => Self::Superseded,
            "RESUMED" => Self::Resumed,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for LifecycleState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline execution state change, as delivered by EventBridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEvent {
    pub pipeline_name: String,
    pub execution_id: String,
    pub state: LifecycleState,
    /// Raw JSON string from `execution-trigger.trigger-detail`, if present.
    pub trigger_detail: Option<String>,
}

#[derive(Deserialize)]
struct EventEnvelope {
    detail: EventDetail,
}

#[derive(Deserialize)]
struct EventDetail {
    pipeline: String,
    #[serde(rename = "execution-id")]
    execution_id: String,
    state: LifecycleState,
    #[serde(rename = "execution-trigger", default)]
    execution_trigger: Option<ExecutionTrigger>,
}

#[derive(Deserialize)]
struct ExecutionTrigger {
    /// Normally a JSON-encoded string; other shapes are treated as absent.
    #[serde(rename = "trigger-detail", default)]
    trigger_detail: Option<Value>,
}

impl PipelineEvent {
    /// Interprets a raw EventBridge payload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEvent` when the pipeline name, execution id or state is missing.
    pub fn from_value(payload: Value) -> Result<Self> {
        let envelope: EventEnvelope = serde_json::from_value(payload)
            .map_err(|e| NotifierError::InvalidEvent(e.to_string()))?;
        let detail = envelope.detail;

        Ok(Self {
            pipeline_name: detail.pipeline,
            execution_id: detail.execution_id,
            state: detail.state,
            trigger_detail: detail
                .execution_trigger
                .and_then(|t| t.trigger_detail)
                .and_then(|value| match value {
                    Value::String(raw) => Some(raw),
                    _ => None,
                }),
        })
    }

    /// Resolves the pull request this execution was triggered by.
    ///
    /// The event's own trigger detail wins; the execution detail's trigger is
    /// consulted when the event does not carry a usable id.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTrigger` when neither source names a pull request.
    pub fn pull_request_id(&self, detail: &ExecutionDetail) -> Result<String> {
        self.trigger_detail
            .as_deref()
            .and_then(pull_request_id_from)
            .or_else(|| detail.trigger_detail.as_deref().and_then(pull_request_id_from))
            .ok_or_else(|| {
                NotifierError::MalformedTrigger(format!(
                    "execution {} of pipeline {}",
                    self.execution_id, self.pipeline_name
                ))
            })
    }
}

/// Pull request numbers are plain integers; anything else is rejected so the
/// id can be placed in an API path as-is.
fn pull_request_id_from(trigger_detail: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(trigger_detail).ok()?;
    let id = match parsed.get("pullRequestId")? {
        Value::String(id) => id.trim().to_owned(),
        Value::Number(id) => id.as_u64()?.to_string(),
        _ => return None,
    };
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}
