//! Galileo backend client.
//!
//! Typed async access to the Galileo pipeline backend: REST endpoints for
//! datasources, preprocesses, trainings and deployments, the server-sent
//! event stream used for progressive pairwise-matrix rendering, and the small
//! timing utilities views need around them.
//!
//! - [`ApiClient`] - one method per backend endpoint.
//! - [`sse`] - incremental event-stream decoding and [`sse::PairwiseStream`].
//! - [`poll`] - [`poll::ExecutionWatcher`], fixed-interval progress polling.
//! - [`debounce`] - quiet-period coalescing of rapidly changing inputs.
//!
//! # Example
//!
//! ```rust,no_run
//! use galileo_client::{ApiClient, ClientConfig};
//!
//! # async fn example() -> galileo_client::Result<()> {
//! let client = ApiClient::new(ClientConfig::new("http://localhost:8000")?)?;
//! for datasource in client.list_datasources().await? {
//!     println!("{} ({} snapshots)", datasource.name, datasource.snapshots.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod debounce;
pub mod poll;
pub mod sse;

mod api;
mod client;
mod config;
mod error;

pub use api::ChartRequest;
pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
