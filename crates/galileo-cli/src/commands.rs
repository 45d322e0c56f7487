//! Subcommand handlers.

pub(crate) mod datasources;
pub(crate) mod deployments;
pub(crate) mod graph;
pub(crate) mod preprocesses;
pub(crate) mod trainings;

use std::path::Path;

/// File name sent with uploads; the backend only looks at the extension.
fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data.csv".to_string())
}
