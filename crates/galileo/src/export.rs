//! Exporters for computed layouts.

pub mod svg;

use thiserror::Error;

use crate::layout::Layout;

/// Something that can write a [`Layout`] to an output.
pub trait Exporter {
    fn export_layout(&self, layout: &Layout) -> Result<(), Error>;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
