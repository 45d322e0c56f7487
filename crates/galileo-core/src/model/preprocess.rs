//! Preprocessing pipelines and their executions.

use std::collections::BTreeMap;

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifier::NodeId;

/// One step of a preprocessing pipeline, e.g. `{"op": "dropna", "params": {}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessStep {
    pub op: String,
    #[serde(default)]
    pub params: Value,
}

impl PreprocessStep {
    /// Returns true for steps that combine two parent datasources.
    pub fn is_join(&self) -> bool {
        self.op == "join"
    }
}

/// Ordered list of steps making up a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    #[serde(default)]
    pub steps: Vec<PreprocessStep>,
}

impl PreprocessConfig {
    /// Returns true when any step is a join.
    pub fn has_join(&self) -> bool {
        self.steps.iter().any(PreprocessStep::is_join)
    }
}

/// A named pipeline deriving `child_id` from `parent_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocess {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub parent_ids: Vec<NodeId>,
    pub child_id: NodeId,
    #[serde(default)]
    pub config: PreprocessConfig,
}

/// Body of `POST /preprocesses/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessCreate {
    pub name: String,
    pub parent_ids: Vec<NodeId>,
    pub config: PreprocessConfig,
}

/// Body of `POST /preprocesses/{id}/execute/`.
///
/// Unary pipelines take `snapshot_id`; joins map each parent datasource id to
/// the snapshot to consume. Both are optional: the backend falls back to the
/// active snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<BTreeMap<String, String>>,
}

/// One recorded run of a preprocess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessExecution {
    pub id: String,
    pub preprocess_id: NodeId,
    #[serde(default)]
    pub input_snapshots: Vec<String>,
    pub output_snapshot: String,
    pub created_at: DateTime,
    #[serde(default)]
    pub details: Vec<Value>,
}

/// Body of `POST /preprocesses/preview/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub config: PreprocessConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
}

/// First rows of a previewed pipeline, rendered as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_deserializes_and_detects_join() {
        let json = r#"{
            "id": "pp-1",
            "name": "merge",
            "parent_ids": ["ds-a", "ds-b"],
            "child_id": "ds-c",
            "config": {"steps": [{"op": "join", "params": {"how": "inner"}}, {"op": "dropna"}]}
        }"#;

        let pp: Preprocess = serde_json::from_str(json).unwrap();
        assert_eq!(pp.parent_ids.len(), 2);
        assert!(pp.config.has_join());
        assert_eq!(pp.config.steps[1].params, Value::Null);
    }

    #[test]
    fn test_execute_request_omits_unset_fields() {
        let body = serde_json::to_value(ExecuteRequest::default()).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }
}
