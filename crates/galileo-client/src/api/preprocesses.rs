//! Preprocess endpoints.

use galileo_core::model::{
    ExecuteRequest, Preprocess, PreprocessConfig, PreprocessCreate, PreprocessExecution,
    PreviewRequest, PreviewResponse,
};
use log::info;
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_preprocesses(&self) -> Result<Vec<Preprocess>> {
        self.get_json("/preprocesses/").await
    }

    pub async fn preprocess(&self, id: &str) -> Result<Preprocess> {
        self.get_json(&format!("/preprocesses/{id}")).await
    }

    /// Creates a preprocess; the backend also creates its child datasource.
    pub async fn create_preprocess(&self, request: &PreprocessCreate) -> Result<Preprocess> {
        info!(name = request.name.as_str(), parents = request.parent_ids.len(); "Creating preprocess");
        self.send_json(Method::POST, "/preprocesses/", request).await
    }

    /// Runs a pipeline against a snapshot without persisting anything.
    pub async fn preview_preprocess(
        &self,
        config: &PreprocessConfig,
        snapshot_id: Option<&str>,
    ) -> Result<PreviewResponse> {
        let body = PreviewRequest {
            config: config.clone(),
            snapshot_id: snapshot_id.map(str::to_string),
        };
        self.send_json(Method::POST, "/preprocesses/preview/", &body).await
    }

    /// Executes a preprocess, producing a new snapshot of its child datasource.
    pub async fn execute_preprocess(&self, id: &str, request: &ExecuteRequest) -> Result<PreprocessExecution> {
        info!(preprocess_id = id; "Executing preprocess");
        self.send_json(Method::POST, &format!("/preprocesses/{id}/execute/"), request)
            .await
    }

    pub async fn preprocess_executions(&self, id: &str) -> Result<Vec<PreprocessExecution>> {
        self.get_json(&format!("/preprocesses/{id}/executions/")).await
    }
}
