//! Integration tests for the PipelineBuilder API

use float_cmp::assert_approx_eq;
use galileo::{
    GalileoError, PipelineBuilder,
    config::{AppConfig, LayoutConfig, StyleConfig},
    identifier::NodeId,
    kind::NodeKind,
    layout::LayoutError,
    structure::{NodeMeta, PipelineGraph},
};

fn sample_graph() -> PipelineGraph {
    let mut graph = PipelineGraph::new();
    graph.add_node(NodeMeta::new("d1", NodeKind::Datasource, "sales"));
    graph.add_node(NodeMeta::new("p1", NodeKind::Preprocess, "clean"));
    graph.add_node(NodeMeta::new("d2", NodeKind::Datasource, "sales_clean"));
    graph.add_node(NodeMeta::new("t1", NodeKind::Training, "forecast"));
    graph.add_parent(&NodeId::new("p1"), &NodeId::new("d1"));
    graph.add_parent(&NodeId::new("d2"), &NodeId::new("p1"));
    graph.add_parent(&NodeId::new("t1"), &NodeId::new("d2"));
    graph
}

#[test]
fn test_builder_api_exists() {
    let _builder = PipelineBuilder::default();
}

#[test]
fn test_render_simple_pipeline() {
    let builder = PipelineBuilder::default();
    let svg = builder.render_svg(&sample_graph()).expect("Failed to render pipeline");

    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert!(svg.contains("forecast"), "Labels should be rendered");
}

#[test]
fn test_layout_uses_configured_spacing() {
    let config = AppConfig::new(
        Default::default(),
        LayoutConfig::new(300.0, 50.0, 100.0),
        Default::default(),
        StyleConfig::default(),
    );
    let builder = PipelineBuilder::new(config);
    let layout = builder.layout(&sample_graph()).expect("Failed to lay out");

    let training = layout.node(&NodeId::new("t1")).unwrap();
    assert_eq!(training.layer, 3);
    assert_approx_eq!(f32, training.position.y(), 150.0);
}

#[test]
fn test_cycle_is_a_layout_error() {
    let mut graph = PipelineGraph::new();
    graph.add_node(NodeMeta::new("a", NodeKind::Datasource, "a"));
    graph.add_node(NodeMeta::new("b", NodeKind::Preprocess, "b"));
    graph.add_parent(&NodeId::new("b"), &NodeId::new("a"));
    graph.add_parent(&NodeId::new("a"), &NodeId::new("b"));

    let result = PipelineBuilder::default().render_svg(&graph);
    assert!(
        matches!(result, Err(GalileoError::Layout(LayoutError::Cycle { .. }))),
        "Should return a cycle error: {result:?}"
    );
}

#[test]
fn test_empty_graph_renders() {
    let svg = PipelineBuilder::default()
        .render_svg(&PipelineGraph::new())
        .expect("Empty graphs should render");
    assert!(svg.contains("<svg"));
}

#[test]
fn test_builder_reusability() {
    let builder = PipelineBuilder::default();
    let first = builder.render_svg(&sample_graph()).expect("Failed to render first");
    let second = builder.render_svg(&sample_graph()).expect("Failed to render second");

    assert_eq!(first, second, "Rendering should be deterministic");
}
