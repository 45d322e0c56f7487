//! Pipeline node kinds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of entity a pipeline graph node stands for.
///
/// The declaration order is meaningful: it is the primary sort key when the
/// layout engine orders root nodes and sibling groups, so datasources always
/// come before preprocesses, which come before trainings and deployments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A named dataset with one or more CSV snapshots.
    Datasource,
    /// A transformation pipeline deriving a child datasource from its parents.
    Preprocess,
    /// A model training configuration bound to one datasource.
    Training,
    /// A serving slot bound to a training.
    Deployment,
}

impl NodeKind {
    /// All kinds, in sort order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Datasource,
        NodeKind::Preprocess,
        NodeKind::Training,
        NodeKind::Deployment,
    ];

    /// Returns a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Datasource => "datasource",
            Self::Preprocess => "preprocess",
            Self::Training => "training",
            Self::Deployment => "deployment",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown node kind name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node kind `{0}`")]
pub struct UnknownKind(String);

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
