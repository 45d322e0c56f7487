//! Error adapter for converting GalileoError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Every error gets
//! a stable code; the common operator mistakes also get a help line.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use galileo::{GalileoError, client::ClientError};

/// Adapter rendering a [`GalileoError`] as a miette diagnostic.
pub struct ErrorAdapter(pub GalileoError);

impl ErrorAdapter {
    /// Stable diagnostic code of the wrapped error.
    pub fn code_str(&self) -> &'static str {
        match &self.0 {
            GalileoError::Io(_) => "galileo::io",
            GalileoError::Client(err) => match err {
                ClientError::Transport(_) => "galileo::client::transport",
                ClientError::Status { .. } => "galileo::client::status",
                ClientError::Decode { .. } => "galileo::client::decode",
                ClientError::Stream(_) | ClientError::Base64(_) => "galileo::client::stream",
                ClientError::Url(_) | ClientError::InvalidConfig(_) => "galileo::client::config",
            },
            GalileoError::Config(_) => "galileo::config",
            GalileoError::Layout(_) => "galileo::layout",
            GalileoError::Export(_) => "galileo::export",
            GalileoError::Preview(_) => "galileo::preview",
        }
    }

    fn help_text(&self) -> Option<&'static str> {
        match &self.0 {
            GalileoError::Client(ClientError::Transport(_)) => {
                Some("is the backend running? Point --api-url or GALILEO_API_URL at it")
            }
            GalileoError::Client(err) if err.is_not_found() => Some("check the id; list the entities to see what exists"),
            GalileoError::Client(ClientError::Status { status: 422, .. }) => {
                Some("the backend rejected the request body; check the JSON arguments")
            }
            GalileoError::Client(ClientError::Url(_) | ClientError::InvalidConfig(_)) | GalileoError::Config(_) => {
                Some("check the configuration file and the --api-url flag")
            }
            GalileoError::Layout(_) => Some("a preprocess lists one of its own descendants as a parent"),
            _ => None,
        }
    }
}

impl fmt::Debug for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text().map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use galileo::layout::LayoutError;

    use super::*;

    fn status(status: u16, detail: &str) -> GalileoError {
        GalileoError::Client(ClientError::Status {
            status,
            detail: detail.to_string(),
        })
    }

    #[test]
    fn test_status_errors() {
        let adapter = ErrorAdapter(status(404, "Training not found"));

        assert_eq!(adapter.code_str(), "galileo::client::status");
        assert_eq!(adapter.to_string(), "backend returned 404: Training not found");
        assert!(adapter.help().unwrap().to_string().contains("check the id"));
    }

    #[test]
    fn test_validation_errors_get_help() {
        let adapter = ErrorAdapter(status(422, "[]"));
        assert!(adapter.help().unwrap().to_string().contains("JSON arguments"));
    }

    #[test]
    fn test_layout_errors() {
        let adapter = ErrorAdapter(GalileoError::Layout(LayoutError::Cycle {
            nodes: vec!["a".into(), "b".into()],
        }));

        assert_eq!(adapter.code().unwrap().to_string(), "galileo::layout");
        assert!(adapter.help().is_some());
    }

    #[test]
    fn test_other_errors_have_no_help() {
        let adapter = ErrorAdapter(GalileoError::Export("renderer failed".into()));

        assert_eq!(adapter.code_str(), "galileo::export");
        assert_eq!(adapter.to_string(), "Export error: renderer failed");
        assert!(adapter.help().is_none());
    }
}
