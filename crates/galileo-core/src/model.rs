//! Serde mirrors of the backend's JSON entities.
//!
//! Field names follow the backend's wire format exactly. Optional and
//! loosely-typed fields are tolerant: a value that is absent or fails to
//! parse falls back to an empty default rather than failing the whole
//! response.

mod datasource;
mod deployment;
mod preprocess;
mod training;

pub use datasource::{
    ActiveSnapshotSet, AppendRowsResponse, ColumnKind, ColumnSchema, ColumnSummary, Datasource,
    DatasourceRef, RowsInsertRequest, Schema, Snapshot, SnapshotSummary,
};
pub use deployment::{
    Deployment, DeploymentCreate, Features, ModelDeployment, ModelDeploymentCreate, MonitorReport,
    PredictRequest, PredictResponse, PromotedModel,
};
pub use preprocess::{
    ExecuteRequest, Preprocess, PreprocessConfig, PreprocessCreate, PreprocessExecution,
    PreprocessStep, PreviewRequest, PreviewResponse,
};
pub use training::{
    AutomationConfig, ExecutionStatus, Progress, TrainRequest, Training, TrainingCreate,
    TrainingExecution, TrainingPreviewRequest,
};

use serde::{Deserialize, Serialize};

/// Generic `{"ok": true}` acknowledgement returned by several mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,
    /// Optional non-fatal warning attached by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
