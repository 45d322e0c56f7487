//! SVG rendering of pipeline layouts.
//!
//! Each node is a rounded rectangle filled with its kind's color and labelled
//! with its name; each edge is a straight arrow from the bottom of the parent
//! to the top of the child.

use std::{collections::HashMap, fs::File, io::Write};

use log::{debug, error, info};
use svg::{
    Document,
    node::element::{self as svg_element, path::Data},
};

use galileo_core::{color::Color, geometry::Point};

use crate::{
    config::StyleConfig,
    export,
    layout::{Layout, PlacedNode},
};

/// Space around the layout bounds.
const MARGIN: f32 = 40.0;
const CORNER_RADIUS: f32 = 8.0;
const FONT_SIZE: f32 = 13.0;
const ARROW_MARKER_ID: &str = "galileo-arrow";

/// Renders `layout` to an SVG string.
///
/// # Errors
///
/// Fails when a configured color cannot be parsed.
pub fn render(layout: &Layout, style: &StyleConfig) -> Result<String, export::Error> {
    Ok(document(layout, style)?.to_string())
}

/// Builds the SVG document for `layout`.
pub fn document(layout: &Layout, style: &StyleConfig) -> Result<Document, export::Error> {
    let bounds = layout
        .bounds()
        .unwrap_or_default()
        .inflate(MARGIN);
    debug!(width = bounds.width(), height = bounds.height(); "Rendering SVG document");

    let mut doc = Document::new()
        .set(
            "viewBox",
            format!(
                "{} {} {} {}",
                bounds.min_x(),
                bounds.min_y(),
                bounds.width(),
                bounds.height()
            ),
        )
        .set("width", bounds.width())
        .set("height", bounds.height());

    if let Some(background) = style.background_color().map_err(export::Error::Render)? {
        doc = doc.add(
            svg_element::Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("fill", background.to_string())
                .set("fill-opacity", background.alpha()),
        );
    }

    let edge_color = style.edge_color().map_err(export::Error::Render)?;
    doc = doc.add(svg_element::Definitions::new().add(arrow_marker(edge_color)));
    doc = doc.add(edges(layout, edge_color));
    doc = doc.add(nodes(layout, style)?);

    Ok(doc)
}

fn arrow_marker(color: Color) -> svg_element::Marker {
    svg_element::Marker::new()
        .set("id", ARROW_MARKER_ID)
        .set("viewBox", "0 0 10 10")
        .set("refX", 9)
        .set("refY", 5)
        .set("markerWidth", 6)
        .set("markerHeight", 6)
        .set("orient", "auto")
        .add(
            svg_element::Path::new()
                .set("d", "M 0 0 L 10 5 L 0 10 z")
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha()),
        )
}

fn edges(layout: &Layout, color: Color) -> svg_element::Group {
    let half_height = layout.node_size().height() / 2.0;
    let mut group = svg_element::Group::new().set("class", "edges");
    let placed: HashMap<_, &PlacedNode> = layout.nodes().iter().map(|node| (&node.id, node)).collect();

    for edge in layout.edges() {
        let (Some(source), Some(target)) = (placed.get(&edge.source), placed.get(&edge.target)) else {
            continue;
        };
        let start = source.position.add_point(Point::new(0.0, half_height));
        let end = target.position.add_point(Point::new(0.0, -half_height));

        let data = Data::new()
            .move_to((start.x(), start.y()))
            .line_to((end.x(), end.y()));
        group = group.add(
            svg_element::Path::new()
                .set("d", data)
                .set("fill", "none")
                .set("stroke", color.to_string())
                .set("stroke-width", 1.5)
                .set("marker-end", format!("url(#{ARROW_MARKER_ID})"))
                .set("data-source", edge.source.as_str())
                .set("data-target", edge.target.as_str()),
        );
    }

    group
}

fn nodes(layout: &Layout, style: &StyleConfig) -> Result<svg_element::Group, export::Error> {
    let size = layout.node_size();
    let text_color = style.text_color().map_err(export::Error::Render)?;
    let mut group = svg_element::Group::new().set("class", "nodes");

    for node in layout.nodes() {
        let fill = style.node_color(node.kind).map_err(export::Error::Render)?;
        let bounds = node.position.to_bounds(size);

        let rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", CORNER_RADIUS)
            .set("fill", fill.to_string())
            .set("fill-opacity", fill.alpha());
        let label = svg_element::Text::new(node.label.as_str())
            .set("x", node.position.x())
            .set("y", node.position.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", "sans-serif")
            .set("font-size", FONT_SIZE)
            .set("fill", text_color.to_string());

        group = group.add(
            svg_element::Group::new()
                .set("class", format!("node {}", node.kind))
                .set("data-id", node.id.as_str())
                .add(rect)
                .add(label),
        );
    }

    Ok(group)
}

/// Writes rendered layouts to an SVG file.
pub struct SvgExporter {
    file_name: String,
    style: StyleConfig,
}

impl SvgExporter {
    pub fn new(file_name: &str, style: StyleConfig) -> Self {
        Self {
            file_name: file_name.to_string(),
            style,
        }
    }
}

impl export::Exporter for SvgExporter {
    fn export_layout(&self, layout: &Layout) -> Result<(), export::Error> {
        let doc = document(layout, &self.style)?;
        info!(file_name = self.file_name; "Creating SVG file");

        let mut file = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(file, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use galileo_core::{identifier::NodeId, kind::NodeKind};

    use super::*;
    use crate::{
        layout::Engine,
        structure::{NodeMeta, PipelineGraph},
    };

    fn sample_layout() -> Layout {
        let mut graph = PipelineGraph::new();
        graph.add_node(NodeMeta::new("d1", NodeKind::Datasource, "sales"));
        graph.add_node(NodeMeta::new("t1", NodeKind::Training, "forecast"));
        graph.add_parent(&NodeId::new("t1"), &NodeId::new("d1"));
        Engine::default().calculate(&graph).unwrap()
    }

    #[test]
    fn test_render_contains_nodes_and_edges() {
        let svg = render(&sample_layout(), &StyleConfig::default()).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("sales"));
        assert!(svg.contains("forecast"));
        assert!(svg.contains(r#"data-source="d1""#));
        assert!(svg.contains(r#"data-target="t1""#));
        assert!(svg.contains(r#"viewBox="-120 -64 240 228""#));
    }

    #[test]
    fn test_wide_fan_draws_every_edge() {
        let mut graph = PipelineGraph::new();
        graph.add_node(NodeMeta::new("root", NodeKind::Datasource, "root"));
        for i in 0..300 {
            let id = format!("c{i:03}");
            graph.add_node(NodeMeta::new(id.clone(), NodeKind::Training, id.clone()));
            graph.add_parent(&NodeId::new(id), &NodeId::new("root"));
        }
        let layout = Engine::default().calculate(&graph).unwrap();

        let svg = render(&layout, &StyleConfig::default()).unwrap();

        assert_eq!(svg.matches("marker-end=").count(), 300);
        assert!(svg.contains(r#"data-target="c000""#));
        assert!(svg.contains(r#"data-target="c299""#));
    }

    #[test]
    fn test_empty_layout_renders() {
        let svg = render(&Layout::default(), &StyleConfig::default()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_invalid_style_is_a_render_error() {
        let style: StyleConfig =
            serde_json::from_value(serde_json::json!({"background_color": "bogus"})).unwrap();
        assert!(matches!(
            render(&sample_layout(), &style),
            Err(export::Error::Render(_))
        ));
    }
}
