//! Deployment, promotion and inference endpoints.

use galileo_core::identifier::NodeId;
use galileo_core::model::{
    Deployment, DeploymentCreate, Features, ModelDeployment, ModelDeploymentCreate, MonitorReport,
    PredictRequest, PredictResponse, PromotedModel,
};
use log::info;
use reqwest::Method;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.get_json("/deployments/").await
    }

    pub async fn deployment(&self, id: &str) -> Result<Deployment> {
        self.get_json(&format!("/deployments/{id}")).await
    }

    pub async fn create_deployment(&self, training_id: &str) -> Result<Deployment> {
        info!(training_id; "Creating deployment");
        let body = DeploymentCreate {
            training_id: NodeId::from(training_id),
        };
        self.send_json(Method::POST, "/deployments/", &body).await
    }

    /// Models promoted for a training, empty when it has no deployment yet.
    pub async fn deployments_for_training(&self, training_id: &str) -> Result<Vec<PromotedModel>> {
        self.get_json(&format!("/deployments/by_training/{training_id}/"))
            .await
    }

    pub async fn model_deployments(&self, deployment_id: &str) -> Result<Vec<ModelDeployment>> {
        self.get_json(&format!("/deployments/{deployment_id}/model_deployments/"))
            .await
    }

    /// Promotes a successful training execution into a deployment.
    pub async fn create_model_deployment(
        &self,
        deployment_id: &str,
        training_execution_id: &str,
    ) -> Result<ModelDeployment> {
        info!(deployment_id, training_execution_id; "Creating model deployment");
        let body = ModelDeploymentCreate {
            deployment_id: NodeId::from(deployment_id),
            training_execution_id: training_execution_id.to_string(),
        };
        self.send_json(Method::POST, "/model_deployments/", &body).await
    }

    /// Runs inference and returns the raw prediction value.
    pub async fn predict(&self, model_deployment_id: &str, features: Features) -> Result<Value> {
        let body = PredictRequest { features };
        let response: PredictResponse = self
            .send_json(
                Method::POST,
                &format!("/model_deployments/{model_deployment_id}/predict"),
                &body,
            )
            .await?;
        Ok(response.prediction)
    }

    /// Evaluates a deployed model against the current root snapshots.
    pub async fn monitor(&self, model_deployment_id: &str) -> Result<MonitorReport> {
        info!(model_deployment_id; "Monitoring model deployment");
        self.call_json(
            Method::POST,
            &format!("/model_deployments/{model_deployment_id}/monitor/"),
        )
        .await
    }
}
