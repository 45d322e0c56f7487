//! Datasource and snapshot endpoints.

use bytes::Bytes;
use galileo_core::model::{
    ActiveSnapshotSet, AppendRowsResponse, ColumnSummary, Datasource, DatasourceRef,
    RowsInsertRequest, Snapshot,
};
use log::{debug, info};
use reqwest::Method;
use reqwest::header::CONTENT_LENGTH;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::client::{ApiClient, decode};
use crate::error::Result;
use crate::sse::PairwiseStream;

/// A chart image rendered by the backend for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRequest {
    /// Distribution of a numeric column.
    Histogram { col: String, bins: u32 },
    Scatter { x: String, y: String },
    /// Value shares of a categorical column.
    Pie { col: String },
    /// A value column aggregated over a date column.
    ///
    /// `granularity` is one of `day`, `week`, `month`, `year`.
    Line {
        date_col: String,
        value_col: String,
        granularity: String,
    },
}

impl ChartRequest {
    /// Image name under the snapshot path.
    fn file_name(&self) -> &'static str {
        match self {
            Self::Histogram { .. } => "histogram.png",
            Self::Scatter { .. } => "scatter.png",
            Self::Pie { .. } => "pie.png",
            Self::Line { .. } => "line.png",
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Histogram { col, bins } => vec![("col", col.clone()), ("bins", bins.to_string())],
            Self::Scatter { x, y } => vec![("x", x.clone()), ("y", y.clone())],
            Self::Pie { col } => vec![("col", col.clone())],
            Self::Line {
                date_col,
                value_col,
                granularity,
            } => vec![
                ("date_col", date_col.clone()),
                ("value_col", value_col.clone()),
                ("granularity", granularity.clone()),
            ],
        }
    }
}

fn csv_part(file_name: &str, contents: Vec<u8>) -> Result<Part> {
    Ok(Part::bytes(contents)
        .file_name(file_name.to_string())
        .mime_str("text/csv")?)
}

fn snapshot_path(datasource_id: &str, snapshot_id: &str) -> String {
    format!("/datasources/{datasource_id}/snapshots/{snapshot_id}")
}

impl ApiClient {
    /// Lists every datasource with its snapshots and schema.
    pub async fn list_datasources(&self) -> Result<Vec<Datasource>> {
        self.get_json("/datasources/").await
    }

    /// Fetches the id and name of one datasource.
    pub async fn datasource(&self, id: &str) -> Result<DatasourceRef> {
        self.get_json(&format!("/datasources/{id}")).await
    }

    /// Fetches one datasource including snapshots and schema.
    pub async fn datasource_with_snapshots(&self, id: &str) -> Result<Datasource> {
        self.get_json(&format!("/datasources/{id}/with-snapshot/")).await
    }

    /// Creates a datasource from an initial CSV upload.
    pub async fn create_datasource(
        &self,
        name: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Datasource> {
        info!(name, file_name, bytes = contents.len(); "Creating datasource");
        let form = Form::new()
            .text("name", name.to_string())
            .part("file", csv_part(file_name, contents)?);

        let path = "/datasources/with-snapshot/";
        let response = self.send(self.request(Method::POST, path)?.multipart(form)).await?;
        decode(response, &format!("POST {path}")).await
    }

    /// Uploads a new snapshot. The backend rejects CSVs whose schema differs.
    pub async fn upload_snapshot(
        &self,
        datasource_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Snapshot> {
        info!(datasource_id, file_name, bytes = contents.len(); "Uploading snapshot");
        let form = Form::new().part("file", csv_part(file_name, contents)?);

        let path = format!("/datasources/{datasource_id}/snapshots/");
        let response = self.send(self.request(Method::POST, &path)?.multipart(form)).await?;
        decode(response, &format!("POST {path}")).await
    }

    pub async fn set_active_snapshot(&self, datasource_id: &str, snapshot_id: &str) -> Result<Datasource> {
        let body = ActiveSnapshotSet {
            snapshot_id: snapshot_id.into(),
        };
        self.send_json(
            Method::POST,
            &format!("/datasources/{datasource_id}/active_snapshot/"),
            &body,
        )
        .await
    }

    /// Appends rows to the active snapshot and returns how many were added.
    pub async fn append_rows(&self, datasource_id: &str, rows: Vec<Map<String, Value>>) -> Result<u64> {
        let body = RowsInsertRequest { rows };
        let response: AppendRowsResponse = self
            .send_json(
                Method::POST,
                &format!("/datasources/{datasource_id}/active_snapshot/rows"),
                &body,
            )
            .await?;
        Ok(response.added)
    }

    /// Downloads the raw CSV of a snapshot.
    pub async fn download_snapshot(&self, datasource_id: &str, snapshot_id: &str) -> Result<Bytes> {
        let path = format!("{}/download", snapshot_path(datasource_id, snapshot_id));
        self.get_bytes(&path, &[]).await
    }

    /// Probes the size of a snapshot download without transferring it.
    ///
    /// Returns `None` when the backend does not announce a `Content-Length`.
    pub async fn snapshot_size(&self, datasource_id: &str, snapshot_id: &str) -> Result<Option<u64>> {
        let path = format!("{}/download", snapshot_path(datasource_id, snapshot_id));
        let response = self.send(self.request(Method::HEAD, &path)?).await?;

        let size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
        debug!(datasource_id, snapshot_id, size:?; "Probed snapshot size");
        Ok(size)
    }

    /// Per-column statistics of a snapshot.
    pub async fn snapshot_summary(&self, datasource_id: &str, snapshot_id: &str) -> Result<Vec<ColumnSummary>> {
        let path = format!("{}/summary/", snapshot_path(datasource_id, snapshot_id));
        self.get_json(&path).await
    }

    /// Renders a chart and returns the PNG bytes.
    pub async fn chart(&self, datasource_id: &str, snapshot_id: &str, chart: &ChartRequest) -> Result<Bytes> {
        let path = format!("{}/{}", snapshot_path(datasource_id, snapshot_id), chart.file_name());
        self.get_bytes(&path, &chart.query()).await
    }

    /// Fetches the HTML profiling report of a snapshot.
    pub async fn profile_report(&self, datasource_id: &str, snapshot_id: &str) -> Result<String> {
        let path = format!("{}/profile_report/", snapshot_path(datasource_id, snapshot_id));
        let response = self.send(self.request(Method::GET, &path)?).await?;
        Ok(response.text().await?)
    }

    /// Opens the progressive pairwise-matrix event stream.
    ///
    /// An empty `cols` lets the backend pick every numeric column. The
    /// connection stays open until the stream reports `done` or is dropped.
    pub async fn pairwise_matrix_stream(
        &self,
        datasource_id: &str,
        snapshot_id: &str,
        cols: &[String],
    ) -> Result<PairwiseStream> {
        let path = format!("{}/pairwise_matrix_stream", snapshot_path(datasource_id, snapshot_id));
        let mut builder = self
            .streaming_request(Method::GET, &path)?
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if !cols.is_empty() {
            builder = builder.query(&[("cols", cols.join(","))]);
        }

        info!(datasource_id, snapshot_id, columns = cols.len(); "Opening pairwise matrix stream");
        let response = self.send(builder).await?;
        Ok(PairwiseStream::new(response))
    }
}
