//! Deployments, promoted models, prediction and monitoring.

use std::collections::BTreeMap;

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifier::NodeId;

/// A serving slot bound to a training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: NodeId,
    pub training_id: NodeId,
}

/// Body of `POST /deployments/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCreate {
    pub training_id: NodeId,
}

/// A training execution promoted into a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDeployment {
    pub id: String,
    pub deployment_id: NodeId,
    pub training_execution_id: String,
}

/// Body of `POST /model_deployments/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDeploymentCreate {
    pub deployment_id: NodeId,
    pub training_execution_id: String,
}

/// Entry of `GET /deployments/by_training/{id}/`, covering manual and
/// metric-driven promotions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotedModel {
    pub id: String,
    #[serde(default)]
    pub promotion_type: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub locked: bool,
    pub training_execution_id: String,
}

/// Prediction input: either a column → value map or an ordered feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Features {
    Vector(Vec<f64>),
    Named(Map<String, Value>),
}

/// Body of `POST /model_deployments/{id}/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Features,
}

/// Response of `POST /model_deployments/{id}/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Value,
}

/// Live evaluation of a model deployment against current root snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorReport {
    pub model_deployment_id: String,
    #[serde(default)]
    pub evaluated_on_snapshot: Vec<String>,
    pub timestamp: DateTime,
    #[serde(default)]
    pub metrics: BTreeMap<String, Option<f64>>,
}
