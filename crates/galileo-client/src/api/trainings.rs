//! Training, execution and automation endpoints.

use galileo_core::model::{
    Ack, AutomationConfig, Progress, TrainRequest, Training, TrainingCreate, TrainingExecution,
    TrainingPreviewRequest,
};
use log::{debug, info};
use reqwest::Method;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_trainings(&self) -> Result<Vec<Training>> {
        self.get_json("/trainings/").await
    }

    pub async fn training(&self, id: &str) -> Result<Training> {
        self.get_json(&format!("/trainings/{id}")).await
    }

    pub async fn create_training(&self, request: &TrainingCreate) -> Result<Training> {
        info!(name = request.name.as_str(), datasource_id = request.datasource_id.as_str(); "Creating training");
        self.send_json(Method::POST, "/trainings/", request).await
    }

    /// Dry-runs a training configuration on a snapshot.
    ///
    /// The returned [`Ack`] may carry a warning when the backend fell back to
    /// a simpler trainer.
    pub async fn preview_training(&self, request: &TrainingPreviewRequest) -> Result<Ack> {
        self.send_json(Method::POST, "/trainings/preview/", request).await
    }

    /// Metrics usable for automatic promotion of this training's models.
    pub async fn allowed_metrics(&self, id: &str) -> Result<Vec<String>> {
        self.get_json(&format!("/trainings/{id}/allowed_metrics/")).await
    }

    /// Starts a training run. The backend answers `202 Accepted` with the
    /// execution in `running` state; follow it with [`ApiClient::training_progress`].
    pub async fn execute_training(&self, id: &str, snapshot_id: &str) -> Result<TrainingExecution> {
        info!(training_id = id, snapshot_id; "Executing training");
        let body = TrainRequest {
            snapshot_id: snapshot_id.to_string(),
        };
        self.send_json(Method::POST, &format!("/trainings/{id}/execute/"), &body)
            .await
    }

    pub async fn training_executions(&self, id: &str) -> Result<Vec<TrainingExecution>> {
        self.get_json(&format!("/trainings/{id}/executions/")).await
    }

    /// Preprocess step details recorded along the lineage of an execution.
    pub async fn execution_preprocess_steps(&self, training_id: &str, execution_id: &str) -> Result<Vec<Value>> {
        self.get_json(&format!(
            "/trainings/{training_id}/executions/{execution_id}/preprocess_steps/"
        ))
        .await
    }

    pub async fn automation_config(&self, id: &str) -> Result<AutomationConfig> {
        self.get_json(&format!("/trainings/{id}/automation_config/")).await
    }

    pub async fn set_automation_config(&self, id: &str, config: &AutomationConfig) -> Result<Ack> {
        info!(training_id = id, enabled = config.automation_enabled; "Updating automation config");
        self.send_json(Method::PUT, &format!("/trainings/{id}/automation_config/"), config)
            .await
    }

    /// Disables automation and removes its schedule.
    pub async fn clear_automation_config(&self, id: &str) -> Result<Ack> {
        info!(training_id = id; "Clearing automation config");
        self.call_json(Method::DELETE, &format!("/trainings/{id}/automation_config/"))
            .await
    }

    /// Triggers the automated pipeline immediately.
    pub async fn run_automation_now(&self, id: &str) -> Result<TrainingExecution> {
        info!(training_id = id; "Running automation now");
        self.call_json(Method::POST, &format!("/trainings/{id}/automation/run_now"))
            .await
    }

    /// Deletes a training together with its executions and deployments.
    pub async fn delete_training(&self, id: &str) -> Result<()> {
        info!(training_id = id; "Deleting training");
        self.send(self.request(Method::DELETE, &format!("/trainings/{id}/delete"))?)
            .await?;
        Ok(())
    }

    /// Pins a successful execution as the manually promoted model.
    pub async fn promote_manual(&self, training_id: &str, execution_id: &str) -> Result<Ack> {
        info!(training_id, execution_id; "Promoting execution manually");
        self.call_json(
            Method::POST,
            &format!("/trainings/{training_id}/executions/{execution_id}/promote_manual/"),
        )
        .await
    }

    /// Polled progress of a running training execution.
    pub async fn training_progress(&self, execution_id: &str) -> Result<Progress> {
        let progress: Progress = self
            .get_json(&format!("/training_executions/{execution_id}/progress/"))
            .await?;
        debug!(execution_id, progress = progress.progress; "Fetched training progress");
        Ok(progress)
    }
}
