//! Configuration types for the Galileo client.
//!
//! Every section implements [`serde::Deserialize`] with defaults, so an
//! empty document (or no document at all) yields a working configuration
//! pointed at a local backend.
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`ApiConfig`] - Backend origin and request timeouts.
//! - [`LayoutConfig`] - Spacing used by the layout engine.
//! - [`PollingConfig`] - Progress polling and input debouncing periods.
//! - [`StyleConfig`] - Colors used by the SVG exporter.
//!
//! # Example
//!
//! ```
//! # use galileo::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.api().base_url(), "http://localhost:8000");
//! assert!(config.style().background_color().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use galileo_client::{ClientConfig, DEFAULT_BASE_URL};
use galileo_core::{color::Color, kind::NodeKind};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    api: ApiConfig,

    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    polling: PollingConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(api: ApiConfig, layout: LayoutConfig, polling: PollingConfig, style: StyleConfig) -> Self {
        Self {
            api,
            layout,
            polling,
            style,
        }
    }

    /// Returns the backend configuration.
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the polling configuration.
    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Replaces the backend origin, e.g. from a command-line override.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    base_url: String,
    timeout_secs: u64,
    connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Builds the client configuration for these settings.
    ///
    /// # Errors
    ///
    /// Fails when the base URL is not a valid `http`/`https` URL.
    pub fn client_config(&self) -> galileo_client::Result<ClientConfig> {
        Ok(ClientConfig::new(&self.base_url)?
            .with_timeout(self.timeout())
            .with_connect_timeout(self.connect_timeout()))
    }
}

/// Spacing of the pipeline graph layout, in SVG user units.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    horizontal_spacing: f32,
    vertical_spacing: f32,
    component_gutter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 200.0,
            vertical_spacing: 100.0,
            component_gutter: 150.0,
        }
    }
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    ///
    /// # Arguments
    ///
    /// * `horizontal_spacing` - Distance between adjacent columns.
    /// * `vertical_spacing` - Distance between adjacent layers.
    /// * `component_gutter` - Extra space between connected components.
    pub fn new(horizontal_spacing: f32, vertical_spacing: f32, component_gutter: f32) -> Self {
        Self {
            horizontal_spacing,
            vertical_spacing,
            component_gutter,
        }
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn component_gutter(&self) -> f32 {
        self.component_gutter
    }
}

/// Timing of progress polling and input debouncing.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    interval_ms: u64,
    debounce_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            debounce_ms: 500,
        }
    }
}

impl PollingConfig {
    /// Period between progress polls of running executions.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Quiet period before a changed input triggers a request.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Visual styling of exported graphs.
///
/// Colors are CSS color strings. Unset fields fall back to built-in
/// defaults; set but unparsable fields are reported as errors.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    edge_color: Option<String>,
    text_color: Option<String>,
    datasource_color: Option<String>,
    preprocess_color: Option<String>,
    training_color: Option<String>,
    deployment_color: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the fill color for nodes of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is invalid.
    pub fn node_color(&self, kind: NodeKind) -> Result<Color, String> {
        let (configured, fallback) = match kind {
            NodeKind::Datasource => (&self.datasource_color, "#4f83cc"),
            NodeKind::Preprocess => (&self.preprocess_color, "#f4a261"),
            NodeKind::Training => (&self.training_color, "#2a9d8f"),
            NodeKind::Deployment => (&self.deployment_color, "#9b5de5"),
        };
        parse_or(configured.as_deref(), fallback)
            .map_err(|err| format!("Invalid {kind} color in config: {err}"))
    }

    /// Returns the stroke color of edges.
    pub fn edge_color(&self) -> Result<Color, String> {
        parse_or(self.edge_color.as_deref(), "#6c757d")
            .map_err(|err| format!("Invalid edge color in config: {err}"))
    }

    /// Returns the color of node labels.
    pub fn text_color(&self) -> Result<Color, String> {
        parse_or(self.text_color.as_deref(), "white")
            .map_err(|err| format!("Invalid text color in config: {err}"))
    }
}

fn parse_or(configured: Option<&str>, fallback: &str) -> Result<Color, String> {
    Color::new(configured.unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api().base_url(), "http://localhost:8000");
        assert_eq!(config.api().timeout(), Duration::from_secs(30));
        assert_eq!(config.polling().interval(), Duration::from_secs(2));
        assert_eq!(config.polling().debounce(), Duration::from_millis(500));
        assert_eq!(config.layout().horizontal_spacing(), 200.0);
        assert_eq!(config.layout().vertical_spacing(), 100.0);
        assert_eq!(config.layout().component_gutter(), 150.0);
        assert!(config.style().background_color().unwrap().is_none());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "api": {"base_url": "http://backend:9000"},
            "layout": {"component_gutter": 40.0},
            "style": {"training_color": "red"}
        }))
        .unwrap();

        assert_eq!(config.api().base_url(), "http://backend:9000");
        assert_eq!(config.api().connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.layout().component_gutter(), 40.0);
        assert_eq!(config.layout().horizontal_spacing(), 200.0);
        assert!(config.style().node_color(NodeKind::Training).is_ok());
        assert!(config.style().node_color(NodeKind::Deployment).is_ok());
    }

    #[test]
    fn test_invalid_colors_are_reported() {
        let style: StyleConfig =
            serde_json::from_value(serde_json::json!({"preprocess_color": "not-a-color"})).unwrap();
        let err = style.node_color(NodeKind::Preprocess).unwrap_err();
        assert!(err.contains("preprocess"));
    }

    #[test]
    fn test_client_config_and_override() {
        let config = AppConfig::default().with_base_url("http://example.com:8080");
        let client = config.api().client_config().unwrap();
        assert_eq!(client.base_url().as_str(), "http://example.com:8080/");
        assert_eq!(client.timeout(), Duration::from_secs(30));

        let broken = AppConfig::default().with_base_url("nope");
        assert!(broken.api().client_config().is_err());
    }
}
