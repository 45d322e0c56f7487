//! Layout engine and its builder.

use log::{debug, info};

use galileo_core::geometry::{Point, Size};

use crate::{config::LayoutConfig, structure::PipelineGraph};

use super::{Layout, LayoutEdge, LayoutError, PlacedNode, columns, components, layering};

/// Layered grid layout for pipeline graphs.
///
/// Built with [`EngineBuilder`]. Calculation is pure and deterministic: the
/// same graph always yields the same layout.
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    horizontal_spacing: f32,
    vertical_spacing: f32,
    component_gutter: f32,
    node_size: Size,
}

impl Engine {
    /// Calculates the layout of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Cycle`] if the parent relations are cyclic.
    pub fn calculate(&self, graph: &PipelineGraph) -> Result<Layout, LayoutError> {
        let inner = graph.inner();
        let components = components::connected_components(inner);
        debug!(nodes = inner.node_count(), components = components.len(); "Calculating layout");

        let mut slots = vec![None; inner.node_count()];
        let mut offset = 0.0;

        for (component, members) in components.iter().enumerate() {
            let layers = layering::assign_layers(inner, members)?;
            let columns = columns::assign_columns(inner, members, &layers);

            let mut max_column = 0;
            for &node in members {
                let layer = layers.get(&node).copied().unwrap_or_default();
                let column = columns.get(&node).copied().unwrap_or_default();
                max_column = max_column.max(column);

                let position = Point::new(
                    offset + column as f32 * self.horizontal_spacing,
                    layer as f32 * self.vertical_spacing,
                );
                slots[node.index()] = Some((component, layer, column, position));
            }

            offset += (max_column + 1) as f32 * self.horizontal_spacing + self.component_gutter;
        }

        let nodes: Vec<PlacedNode> = inner
            .node_indices()
            .zip(slots)
            .filter_map(|(node, slot)| {
                let (component, layer, column, position) = slot?;
                let meta = &inner[node];
                Some(PlacedNode {
                    id: meta.id.clone(),
                    kind: meta.kind,
                    label: meta.label.clone(),
                    component,
                    layer,
                    column,
                    position,
                })
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(source, target)| LayoutEdge {
                source: source.clone(),
                target: target.clone(),
            })
            .collect();

        info!(nodes = nodes.len(), components = components.len(); "Layout calculated");
        Ok(Layout::new(nodes, edges, self.node_size, components.len()))
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

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

/// Builder for [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    horizontal_spacing: f32,
    vertical_spacing: f32,
    component_gutter: f32,
    node_size: Size,
}

impl EngineBuilder {
    /// Creates a builder with the default spacing (200 × 100, gutter 150).
    pub fn new() -> Self {
        Self::from_config(&LayoutConfig::default())
    }

    /// Creates a builder from the `[layout]` configuration section.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            horizontal_spacing: config.horizontal_spacing(),
            vertical_spacing: config.vertical_spacing(),
            component_gutter: config.component_gutter(),
            node_size: Size::new(160.0, 48.0),
        }
    }

    /// Set the distance between adjacent columns
    pub fn with_horizontal_spacing(mut self, spacing: f32) -> Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the distance between adjacent layers
    pub fn with_vertical_spacing(mut self, spacing: f32) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Set the extra space between connected components
    pub fn with_component_gutter(mut self, gutter: f32) -> Self {
        self.component_gutter = gutter;
        self
    }

    /// Set the size of the box drawn for each node
    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            horizontal_spacing: self.horizontal_spacing,
            vertical_spacing: self.vertical_spacing,
            component_gutter: self.component_gutter,
            node_size: self.node_size,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::{HashMap, HashSet};

    use float_cmp::approx_eq;
    use galileo_core::{identifier::NodeId, kind::NodeKind};
    use proptest::prelude::*;

    use super::*;
    use crate::structure::NodeMeta;

    const KINDS: [NodeKind; 4] = [
        NodeKind::Datasource,
        NodeKind::Preprocess,
        NodeKind::Training,
        NodeKind::Deployment,
    ];

    // ===================
    // Strategies
    // ===================

    /// Random acyclic graphs: edges always point from a lower to a higher
    /// insertion index.
    fn dag_strategy() -> impl Strategy<Value = PipelineGraph> {
        (1usize..16)
            .prop_flat_map(|n| {
                (
                    prop::collection::vec((0usize..KINDS.len(), 0u8..4), n),
                    prop::collection::vec((0..n, 0..n), 0..n * 2),
                )
            })
            .prop_map(|(nodes, edges)| {
                let mut graph = PipelineGraph::new();
                for (i, (kind, label)) in nodes.into_iter().enumerate() {
                    graph.add_node(NodeMeta::new(format!("n{i}"), KINDS[kind], format!("label{label}")));
                }
                for (a, b) in edges {
                    if a != b {
                        let (parent, child) = (a.min(b), a.max(b));
                        graph.add_parent(&NodeId::new(format!("n{child}")), &NodeId::new(format!("n{parent}")));
                    }
                }
                graph
            })
    }

    /// One root with a fan of leaf children, plus an unrelated second root
    /// that lands in its own component.
    fn fan_strategy() -> impl Strategy<Value = PipelineGraph> {
        (prop::collection::vec((0usize..KINDS.len(), 0u8..4), 1..9), 0usize..KINDS.len()).prop_map(
            |(children, root_kind)| {
                let mut graph = PipelineGraph::new();
                graph.add_node(NodeMeta::new("root", KINDS[root_kind], "root"));
                graph.add_node(NodeMeta::new("other", NodeKind::Datasource, "other"));
                for (i, (kind, label)) in children.into_iter().enumerate() {
                    let id = format!("c{i}");
                    graph.add_node(NodeMeta::new(id.clone(), KINDS[kind], format!("label{label}")));
                    graph.add_parent(&NodeId::new(id), &NodeId::new("root"));
                }
                graph
            },
        )
    }

    fn calculate(graph: &PipelineGraph) -> Result<Layout, TestCaseError> {
        Engine::default()
            .calculate(graph)
            .map_err(|err| TestCaseError::fail(err.to_string()))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Roots sit on layer 0; every other node sits one below its deepest parent.
    fn check_layer_is_longest_path(graph: &PipelineGraph) -> Result<(), TestCaseError> {
        let layout = calculate(graph)?;

        for node in layout.nodes() {
            let expected = graph
                .parents(&node.id)
                .into_iter()
                .filter_map(|parent| layout.node(parent))
                .map(|parent| parent.layer + 1)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(node.layer, expected, "wrong layer for {}", node.id);
        }
        Ok(())
    }

    /// No two nodes share a grid slot.
    fn check_slots_are_unique(graph: &PipelineGraph) -> Result<(), TestCaseError> {
        let layout = calculate(graph)?;

        let mut seen = HashSet::new();
        for node in layout.nodes() {
            prop_assert!(
                seen.insert((node.component, node.layer, node.column)),
                "slot of {} is taken twice",
                node.id
            );
        }
        Ok(())
    }

    /// Nodes of one layer with the same parent set occupy consecutive columns.
    fn check_siblings_are_adjacent(graph: &PipelineGraph) -> Result<(), TestCaseError> {
        let layout = calculate(graph)?;

        let mut groups: HashMap<(usize, usize, Vec<&NodeId>), Vec<usize>> = HashMap::new();
        for node in layout.nodes() {
            let mut parents = graph.parents(&node.id);
            parents.sort();
            groups
                .entry((node.component, node.layer, parents))
                .or_default()
                .push(node.column);
        }

        for mut columns in groups.into_values() {
            columns.sort_unstable();
            for pair in columns.windows(2) {
                prop_assert_eq!(pair[1], pair[0] + 1, "siblings split: {:?}", columns);
            }
        }
        Ok(())
    }

    /// Positions follow the grid: one x offset per component, y from the layer.
    fn check_positions_follow_grid(graph: &PipelineGraph) -> Result<(), TestCaseError> {
        let engine = Engine::default();
        let layout = calculate(graph)?;

        let mut offsets: HashMap<usize, f32> = HashMap::new();
        for node in layout.nodes() {
            let y = node.layer as f32 * engine.vertical_spacing();
            prop_assert!(approx_eq!(f32, node.position.y(), y), "bad y for {}", node.id);

            let offset = node.position.x() - node.column as f32 * engine.horizontal_spacing();
            let expected = *offsets.entry(node.component).or_insert(offset);
            prop_assert!(
                approx_eq!(f32, offset, expected, epsilon = 0.01),
                "component {} has two offsets",
                node.component
            );
        }
        Ok(())
    }

    /// A parent sits on the rounded mean column of its only children, and the
    /// component's leftmost column is 0.
    fn check_parent_over_children(graph: &PipelineGraph) -> Result<(), TestCaseError> {
        let layout = calculate(graph)?;

        let root = layout
            .node(&NodeId::new("root"))
            .ok_or_else(|| TestCaseError::fail("root missing"))?;
        let children: Vec<usize> = layout
            .nodes()
            .iter()
            .filter(|node| node.layer == 1)
            .map(|node| node.column)
            .collect();

        let mean = children.iter().sum::<usize>() as f64 / children.len() as f64;
        prop_assert_eq!(root.column, mean.round() as usize, "children at {:?}", children);
        prop_assert_eq!(children.iter().min().copied(), Some(0));
        Ok(())
    }

    /// Same graph, same layout; unknown parents change nothing.
    fn check_deterministic_and_ignores_dangling(graph: &PipelineGraph) -> Result<(), TestCaseError> {
        let first = calculate(graph)?;
        let second = calculate(graph)?;
        prop_assert_eq!(&first, &second);

        let mut extended = graph.clone();
        for node in graph.nodes() {
            prop_assert!(!extended.add_parent(&node.id, &NodeId::new("missing")));
        }
        prop_assert_eq!(&first, &calculate(&extended)?);
        Ok(())
    }

    proptest! {
        #[test]
        fn layer_is_longest_path(graph in dag_strategy()) {
            check_layer_is_longest_path(&graph)?;
        }

        #[test]
        fn slots_are_unique(graph in dag_strategy()) {
            check_slots_are_unique(&graph)?;
        }

        #[test]
        fn siblings_are_adjacent(graph in dag_strategy()) {
            check_siblings_are_adjacent(&graph)?;
        }

        #[test]
        fn positions_follow_grid(graph in dag_strategy()) {
            check_positions_follow_grid(&graph)?;
        }

        #[test]
        fn parent_over_children(graph in fan_strategy()) {
            check_parent_over_children(&graph)?;
        }

        #[test]
        fn deterministic_and_ignores_dangling(graph in dag_strategy()) {
            check_deterministic_and_ignores_dangling(&graph)?;
        }
    }
}
