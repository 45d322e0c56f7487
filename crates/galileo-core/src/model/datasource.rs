//! Datasources, snapshots and column statistics.

use jiff::civil::DateTime;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::identifier::NodeId;

/// Minimal datasource view returned by `GET /datasources/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceRef {
    pub id: NodeId,
    pub name: String,
}

/// A datasource together with its snapshots and recorded schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    pub id: NodeId,
    pub name: String,
    /// Raw schema document as stored by the backend. Use [`Datasource::schema`].
    #[serde(default)]
    pub schema_json: Option<String>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub active_snapshot_id: Option<String>,
}

impl Datasource {
    /// Parses the recorded schema.
    ///
    /// A missing or malformed schema yields an empty column list.
    pub fn schema(&self) -> Schema {
        let Some(raw) = self.schema_json.as_deref() else {
            return Schema::default();
        };

        serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(datasource_id = self.id.as_str(), err:err; "Ignoring unparsable datasource schema");
            Schema::default()
        })
    }

    /// Returns the active snapshot, if one is set and present.
    pub fn active_snapshot(&self) -> Option<&Snapshot> {
        let active = self.active_snapshot_id.as_deref()?;
        self.snapshots.iter().find(|snapshot| snapshot.id == active)
    }

    /// Returns the most recently created snapshot.
    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.iter().max_by_key(|snapshot| snapshot.created_at)
    }
}

/// One immutable uploaded CSV version of a datasource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub path: String,
    pub created_at: DateTime,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Column layout recorded when a datasource is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

impl Schema {
    /// Returns the column names in recorded order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// A single column entry of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(default)]
    pub dtype: String,
    #[serde(default)]
    pub null_count: u64,
}

/// Broad column type reported by the summary endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Date,
    #[serde(other)]
    Other,
}

/// Per-column statistics over all rows of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    pub missing: u64,
    pub missing_pct: f64,
    pub unique: u64,
    /// Pre-formatted statistics text.
    pub stats: String,
}

/// Response of `GET .../summary/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    #[serde(default)]
    pub summary: Vec<ColumnSummary>,
}

/// Body of `POST /datasources/{id}/active_snapshot/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSnapshotSet {
    pub snapshot_id: String,
}

/// Body of `POST /datasources/{id}/active_snapshot/rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsInsertRequest {
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Response of `POST /datasources/{id}/active_snapshot/rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendRowsResponse {
    pub added: u64,
}
