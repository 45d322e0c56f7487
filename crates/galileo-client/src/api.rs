//! Endpoint methods, grouped by backend area.
//!
//! Each submodule adds an `impl ApiClient` block; the paths mirror the
//! backend routers one-to-one.

mod datasources;
mod deployments;
mod preprocesses;
mod trainings;

pub use datasources::ChartRequest;
