//! Error types for Galileo operations.
//!
//! [`GalileoError`] wraps everything that can fail between fetching the
//! pipeline from the backend and writing a rendered graph.

use std::io;

use thiserror::Error;

use galileo_client::ClientError;

use crate::layout::LayoutError;

/// The main error type for Galileo operations.
#[derive(Debug, Error)]
pub enum GalileoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A backend request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),

    /// A downloaded snapshot could not be read as CSV.
    #[error("Preview error: {0}")]
    Preview(#[from] csv::Error),
}

impl From<crate::export::Error> for GalileoError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl GalileoError {
    /// Returns the underlying backend error, if this is one.
    pub fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) => Some(err),
            _ => None,
        }
    }
}
