//! Galileo - visualize and drive an ML pipeline backend.
//!
//! The pipeline (datasources, preprocesses, trainings and deployments) is
//! fetched from the backend, assembled into a [`structure::PipelineGraph`],
//! laid out in layers by the [`layout::Engine`] and rendered to SVG.

pub mod config;
pub mod export;
pub mod invalidate;
pub mod layout;
pub mod preview;
pub mod selection;
pub mod structure;
pub mod workspace;

mod error;

pub use galileo_client as client;
pub use galileo_core::{color, geometry, identifier, kind, model};

pub use error::GalileoError;

use log::{debug, info, trace};

use config::AppConfig;
use export::Exporter;
use layout::{EngineBuilder, Layout};
use structure::PipelineGraph;

/// Builder for laying out and rendering pipeline graphs.
///
/// # Examples
///
/// ```rust
/// use galileo::{
///     PipelineBuilder,
///     config::AppConfig,
///     identifier::NodeId,
///     kind::NodeKind,
///     structure::{NodeMeta, PipelineGraph},
/// };
///
/// let mut graph = PipelineGraph::new();
/// graph.add_node(NodeMeta::new("d1", NodeKind::Datasource, "raw"));
/// graph.add_node(NodeMeta::new("t1", NodeKind::Training, "model"));
/// graph.add_parent(&NodeId::new("t1"), &NodeId::new("d1"));
///
/// let builder = PipelineBuilder::new(AppConfig::default());
/// let svg = builder.render_svg(&graph).expect("Failed to render");
/// assert!(svg.contains("<svg"));
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: AppConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Compute node positions for a pipeline graph.
    ///
    /// # Errors
    ///
    /// Returns [`GalileoError::Layout`] when the graph contains a cycle.
    pub fn layout(&self, graph: &PipelineGraph) -> Result<Layout, GalileoError> {
        info!(nodes = graph.len(), edges = graph.edge_count(); "Calculating pipeline layout");

        let engine = EngineBuilder::from_config(self.config.layout()).build();
        let layout = engine.calculate(graph)?;

        debug!(components = layout.component_count(); "Layout calculated");
        trace!(layout:?; "Calculated layout");
        Ok(layout)
    }

    /// Lay out a pipeline graph and render it to an SVG string.
    pub fn render_svg(&self, graph: &PipelineGraph) -> Result<String, GalileoError> {
        let layout = self.layout(graph)?;
        let svg = export::svg::render(&layout, self.config.style())?;
        debug!(bytes = svg.len(); "SVG rendered");
        Ok(svg)
    }

    /// Lay out a pipeline graph and write it as an SVG file.
    pub fn write_svg(&self, graph: &PipelineGraph, path: &str) -> Result<(), GalileoError> {
        let layout = self.layout(graph)?;
        let exporter = export::svg::SvgExporter::new(path, self.config.style().clone());
        exporter.export_layout(&layout)?;
        info!(path; "SVG written");
        Ok(())
    }
}
