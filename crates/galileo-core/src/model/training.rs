//! Trainings, their executions, progress and automation settings.

use std::collections::BTreeMap;

use jiff::civil::DateTime;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifier::NodeId;

/// A model training configuration bound to one datasource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: NodeId,
    pub name: String,
    pub datasource_id: NodeId,
    /// `{"algorithm": ..., "params": {...}, "features": [...], "target": ...}`
    #[serde(default)]
    pub config_json: Value,
    #[serde(default)]
    pub input_schema_json: Value,
}

impl Training {
    /// Returns the configured algorithm name, if any.
    pub fn algorithm(&self) -> Option<&str> {
        self.config_json.get("algorithm").and_then(Value::as_str)
    }
}

/// Body of `POST /trainings/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCreate {
    pub name: String,
    pub datasource_id: NodeId,
    pub config: Value,
}

/// Body of `POST /trainings/{id}/execute/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRequest {
    pub snapshot_id: String,
}

/// Body of `POST /trainings/preview/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPreviewRequest {
    pub snapshot_id: String,
    pub config: Value,
}

/// Lifecycle state of a training execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    /// Returns true once the execution can no longer change state.
    ///
    /// Unknown statuses are treated as still in flight so callers keep
    /// observing them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// One run of a training against a specific snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExecution {
    pub id: String,
    pub training_id: NodeId,
    pub snapshot_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime,
    #[serde(default)]
    pub finished_at: Option<DateTime>,
    /// Raw metrics document. Use [`TrainingExecution::metrics`].
    #[serde(default)]
    pub metrics_json: Option<String>,
    #[serde(default)]
    pub model_path: Option<String>,
}

impl TrainingExecution {
    /// Parses the recorded metrics, tolerating an empty or malformed document.
    pub fn metrics(&self) -> BTreeMap<String, Value> {
        let raw = self.metrics_json.as_deref().unwrap_or_default();
        if raw.trim().is_empty() {
            return BTreeMap::new();
        }

        serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(execution_id = self.id.as_str(), err:err; "Ignoring unparsable execution metrics");
            BTreeMap::new()
        })
    }
}

/// Progress document polled from `GET /training_executions/{id}/progress/`.
///
/// The backend writes different shapes depending on the phase of the run
/// (`{"progress", "phase", "detail"}` while starting, `{"stage",
/// "generation", ...}` during evolutionary search, `{"stage": "done"}` at the
/// end), so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_generations: Option<u32>,
}

impl Progress {
    /// Returns true when the run behind this progress document has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self.stage.as_deref(), Some("done" | "failed"))
            || matches!(self.status.as_deref(), Some("success" | "failed"))
    }

    /// Returns true when the run finished unsuccessfully.
    pub fn is_failed(&self) -> bool {
        self.stage.as_deref() == Some("failed") || self.status.as_deref() == Some("failed")
    }

    /// Short human-readable description of the current phase.
    pub fn describe(&self) -> String {
        let phase = self
            .stage
            .as_deref()
            .or(self.phase.as_deref())
            .unwrap_or("running");

        match (self.generation, self.total_generations) {
            (Some(generation), Some(total)) => {
                format!("{phase} {generation}/{total} ({:.0}%)", self.progress * 100.0)
            }
            _ => format!("{phase} ({:.0}%)", self.progress * 100.0),
        }
    }
}

/// Scheduled retraining settings of a training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default)]
    pub automation_enabled: bool,
    /// Cron-style schedule understood by the backend scheduler.
    #[serde(default)]
    pub automation_schedule: Option<String>,
    #[serde(default)]
    pub promotion_metrics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_status_terminality() {
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Unknown.is_terminal());

        let status: ExecutionStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(status, ExecutionStatus::Unknown);
    }

    #[test]
    fn test_progress_shapes() {
        let starting: Progress =
            serde_json::from_str(r#"{"progress": 0, "phase": "Starting", "detail": ""}"#).unwrap();
        assert!(!starting.is_terminal());
        assert_eq!(starting.describe(), "Starting (0%)");

        let searching: Progress = serde_json::from_str(
            r#"{"generation": 3, "total_generations": 10, "progress": 0.3, "stage": "evolutionary_search", "best_curve": [0.1]}"#,
        )
        .unwrap();
        assert!(!searching.is_terminal());
        assert_eq!(searching.describe(), "evolutionary_search 3/10 (30%)");

        let done: Progress = serde_json::from_str(r#"{"stage": "done", "progress": 1.0}"#).unwrap();
        assert!(done.is_terminal());
        assert!(!done.is_failed());

        let failed: Progress =
            serde_json::from_str(r#"{"stage": "failed", "status": "failed"}"#).unwrap();
        assert!(failed.is_terminal());
        assert!(failed.is_failed());
    }

    #[test]
    fn test_metrics_tolerates_empty_and_malformed() {
        let mut execution: TrainingExecution = serde_json::from_str(
            r#"{"id": "e1", "training_id": "t1", "snapshot_id": "s1", "status": "running",
                "started_at": "2024-05-01T10:00:00", "finished_at": null,
                "metrics_json": "", "model_path": ""}"#,
        )
        .unwrap();
        assert!(execution.metrics().is_empty());

        execution.metrics_json = Some("not json".to_string());
        assert!(execution.metrics().is_empty());

        execution.metrics_json = Some(r#"{"accuracy": 0.9}"#.to_string());
        assert_eq!(execution.metrics()["accuracy"], serde_json::json!(0.9));
    }
}
