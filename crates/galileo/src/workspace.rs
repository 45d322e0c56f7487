//! The data layer views are built on.
//!
//! A [`Workspace`] is created once from an injected [`ApiClient`] and shared
//! by cloning. Reads go straight to the backend; every successful mutation
//! publishes an [`Invalidation`] on the workspace's [`InvalidationBus`].

use std::time::Duration;

use log::{debug, info};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use galileo_client::{ApiClient, poll::ExecutionWatcher};
use galileo_core::{
    model::{
        Ack, AutomationConfig, Datasource, Deployment, ExecuteRequest, ModelDeployment, Preprocess,
        PreprocessCreate, PreprocessExecution, Snapshot, Training, TrainingCreate, TrainingExecution,
    },
};

use crate::{
    config::ApiConfig,
    error::GalileoError,
    invalidate::{Invalidation, InvalidationBus},
    preview::SnapshotPreview,
    structure::{PipelineEntities, PipelineGraph},
};

/// Backend access plus change notifications.
#[derive(Debug, Clone)]
pub struct Workspace {
    client: ApiClient,
    bus: InvalidationBus,
}

impl Workspace {
    pub fn new(client: ApiClient) -> Self {
        Self::with_bus(client, InvalidationBus::default())
    }

    /// Connects to the backend described by `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, GalileoError> {
        let client = ApiClient::new(config.client_config()?)?;
        Ok(Self::new(client))
    }

    /// Creates a workspace publishing on an existing bus.
    pub fn with_bus(client: ApiClient, bus: InvalidationBus) -> Self {
        Self { client, bus }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn bus(&self) -> &InvalidationBus {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.bus.subscribe()
    }

    /// Fetches the four entity lists concurrently.
    pub async fn fetch_entities(&self) -> Result<PipelineEntities, GalileoError> {
        let (datasources, preprocesses, trainings, deployments) = tokio::try_join!(
            self.client.list_datasources(),
            self.client.list_preprocesses(),
            self.client.list_trainings(),
            self.client.list_deployments(),
        )?;

        let entities = PipelineEntities {
            datasources,
            preprocesses,
            trainings,
            deployments,
        };
        debug!(entities = entities.len(); "Fetched pipeline entities");
        Ok(entities)
    }

    /// Fetches every entity and assembles the pipeline graph.
    pub async fn fetch_graph(&self) -> Result<PipelineGraph, GalileoError> {
        let entities = self.fetch_entities().await?;
        let graph = PipelineGraph::from_entities(&entities);
        info!(nodes = graph.len(), edges = graph.edge_count(); "Pipeline graph fetched");
        Ok(graph)
    }

    /// Downloads a snapshot and reads its first `max_rows` rows.
    pub async fn snapshot_preview(
        &self,
        datasource_id: &str,
        snapshot_id: &str,
        max_rows: usize,
    ) -> Result<SnapshotPreview, GalileoError> {
        let bytes = self.client.download_snapshot(datasource_id, snapshot_id).await?;
        SnapshotPreview::from_csv(&bytes, max_rows)
    }

    /// Creates an execution watcher polling through this workspace's client.
    pub fn watcher(&self, interval: Duration) -> ExecutionWatcher<ApiClient> {
        ExecutionWatcher::new(self.client.clone(), interval)
    }

    pub async fn create_datasource(
        &self,
        name: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Datasource, GalileoError> {
        let datasource = self.client.create_datasource(name, file_name, contents).await?;
        self.publish([Invalidation::Datasources]);
        Ok(datasource)
    }

    pub async fn upload_snapshot(
        &self,
        datasource_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Snapshot, GalileoError> {
        let snapshot = self.client.upload_snapshot(datasource_id, file_name, contents).await?;
        self.publish([Invalidation::Datasource(datasource_id.into())]);
        Ok(snapshot)
    }

    pub async fn set_active_snapshot(
        &self,
        datasource_id: &str,
        snapshot_id: &str,
    ) -> Result<Datasource, GalileoError> {
        let datasource = self.client.set_active_snapshot(datasource_id, snapshot_id).await?;
        self.publish([Invalidation::Datasource(datasource_id.into())]);
        Ok(datasource)
    }

    pub async fn append_rows(
        &self,
        datasource_id: &str,
        rows: Vec<Map<String, Value>>,
    ) -> Result<u64, GalileoError> {
        let added = self.client.append_rows(datasource_id, rows).await?;
        self.publish([Invalidation::Datasource(datasource_id.into())]);
        Ok(added)
    }

    /// Creating a preprocess also creates its child datasource.
    pub async fn create_preprocess(&self, request: &PreprocessCreate) -> Result<Preprocess, GalileoError> {
        let preprocess = self.client.create_preprocess(request).await?;
        self.publish([Invalidation::Preprocesses, Invalidation::Datasources]);
        Ok(preprocess)
    }

    /// Running a preprocess adds a snapshot to its child datasource.
    pub async fn execute_preprocess(
        &self,
        id: &str,
        request: &ExecuteRequest,
    ) -> Result<PreprocessExecution, GalileoError> {
        let execution = self.client.execute_preprocess(id, request).await?;
        self.publish([Invalidation::Preprocesses, Invalidation::Datasources]);
        Ok(execution)
    }

    pub async fn create_training(&self, request: &TrainingCreate) -> Result<Training, GalileoError> {
        let training = self.client.create_training(request).await?;
        self.publish([Invalidation::Trainings]);
        Ok(training)
    }

    pub async fn execute_training(&self, id: &str, snapshot_id: &str) -> Result<TrainingExecution, GalileoError> {
        let execution = self.client.execute_training(id, snapshot_id).await?;
        self.publish([Invalidation::Training(id.into())]);
        Ok(execution)
    }

    /// Deleting a training removes its deployments with it.
    pub async fn delete_training(&self, id: &str) -> Result<(), GalileoError> {
        self.client.delete_training(id).await?;
        self.publish([Invalidation::Trainings, Invalidation::Deployments]);
        Ok(())
    }

    pub async fn set_automation_config(&self, id: &str, config: &AutomationConfig) -> Result<Ack, GalileoError> {
        let ack = self.client.set_automation_config(id, config).await?;
        self.publish([Invalidation::Training(id.into())]);
        Ok(ack)
    }

    pub async fn clear_automation_config(&self, id: &str) -> Result<Ack, GalileoError> {
        let ack = self.client.clear_automation_config(id).await?;
        self.publish([Invalidation::Training(id.into())]);
        Ok(ack)
    }

    pub async fn run_automation_now(&self, id: &str) -> Result<TrainingExecution, GalileoError> {
        let execution = self.client.run_automation_now(id).await?;
        self.publish([Invalidation::Training(id.into())]);
        Ok(execution)
    }

    pub async fn promote_manual(&self, training_id: &str, execution_id: &str) -> Result<Ack, GalileoError> {
        let ack = self.client.promote_manual(training_id, execution_id).await?;
        self.publish([Invalidation::Training(training_id.into()), Invalidation::Deployments]);
        Ok(ack)
    }

    pub async fn create_deployment(&self, training_id: &str) -> Result<Deployment, GalileoError> {
        let deployment = self.client.create_deployment(training_id).await?;
        self.publish([Invalidation::Deployments]);
        Ok(deployment)
    }

    pub async fn create_model_deployment(
        &self,
        deployment_id: &str,
        training_execution_id: &str,
    ) -> Result<ModelDeployment, GalileoError> {
        let model = self
            .client
            .create_model_deployment(deployment_id, training_execution_id)
            .await?;
        self.publish([Invalidation::Deployments]);
        Ok(model)
    }

    fn publish<const N: usize>(&self, events: [Invalidation; N]) {
        for event in events {
            self.bus.publish(event);
        }
    }
}

