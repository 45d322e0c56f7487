//! Pipeline graph layout.
//!
//! The engine places every node of a [`PipelineGraph`](crate::structure::PipelineGraph)
//! on a grid of layers (rows, by dependency depth) and columns, one
//! connected component after another from left to right:
//!
//! 1. [`components`] splits the graph into weakly connected components.
//! 2. [`layering`] assigns each node its longest-path distance from a root.
//! 3. [`columns`] packs each layer so children sit centered under their parents.
//! 4. [`Engine`] turns `(component, layer, column)` into coordinates.

mod columns;
mod components;
mod engine;
mod layering;

pub use engine::{Engine, EngineBuilder};

use serde::Serialize;
use thiserror::Error;

use galileo_core::{
    geometry::{Bounds, Point, Size},
    identifier::NodeId,
    kind::NodeKind,
};

/// Layout failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The parent relations contain a cycle, so no layering exists.
    #[error("pipeline graph contains a cycle: {}", format_cycle(.nodes))]
    Cycle { nodes: Vec<NodeId> },
}

fn format_cycle(nodes: &[NodeId]) -> String {
    let mut path: Vec<&str> = nodes.iter().map(NodeId::as_str).collect();
    if let Some(first) = path.first().copied() {
        path.push(first);
    }
    path.join(" -> ")
}

/// A node with its grid slot and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    /// Index of the connected component, in discovery order.
    pub component: usize,
    pub layer: usize,
    pub column: usize,
    /// Center of the node.
    pub position: Point,
}

/// A parent to child edge between two placed nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Result of laying out a pipeline graph.
///
/// Nodes are listed in graph insertion order; edges in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    nodes: Vec<PlacedNode>,
    edges: Vec<LayoutEdge>,
    node_size: Size,
    components: usize,
}

impl Layout {
    pub(crate) fn new(nodes: Vec<PlacedNode>, edges: Vec<LayoutEdge>, node_size: Size, components: usize) -> Self {
        Self {
            nodes,
            edges,
            node_size,
            components,
        }
    }

    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Looks up a placed node by id.
    pub fn node(&self, id: &NodeId) -> Option<&PlacedNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Size of the box drawn for every node.
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        self.components
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Smallest rectangle containing every node box, `None` for an empty layout.
    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(|node| node.position.to_bounds(self.node_size))
            .reduce(|acc, bounds| acc.merge(&bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_message_closes_the_loop() {
        let err = LayoutError::Cycle {
            nodes: vec![NodeId::new("a"), NodeId::new("b")],
        };
        assert_eq!(err.to_string(), "pipeline graph contains a cycle: a -> b -> a");
    }

    #[test]
    fn test_empty_layout_has_no_bounds() {
        assert!(Layout::default().bounds().is_none());
    }
}
