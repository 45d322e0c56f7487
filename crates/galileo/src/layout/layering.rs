//! Longest-path layering.

use std::collections::{HashMap, HashSet};

use log::trace;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use crate::structure::NodeMeta;

use super::LayoutError;

/// Assigns every member of one component its layer.
///
/// A node without parents sits in layer 0; any other node sits one layer
/// below its deepest parent. Results are memoized across start nodes, and
/// the walk keeps its own stack so chain depth is bounded only by memory.
///
/// # Errors
///
/// Returns [`LayoutError::Cycle`] naming the nodes of the first cycle found.
pub(super) fn assign_layers(
    graph: &DiGraph<NodeMeta, ()>,
    members: &[NodeIndex],
) -> Result<HashMap<NodeIndex, usize>, LayoutError> {
    let mut layers: HashMap<NodeIndex, usize> = HashMap::with_capacity(members.len());
    // Nodes whose parents are still being resolved, outermost first.
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut on_path: HashSet<NodeIndex> = HashSet::new();

    for &start in members {
        if layers.contains_key(&start) {
            continue;
        }

        let mut stack = vec![(start, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                let layer = graph
                    .neighbors_directed(node, Direction::Incoming)
                    .filter_map(|parent| layers.get(&parent))
                    .map(|layer| layer + 1)
                    .max()
                    .unwrap_or(0);
                layers.insert(node, layer);
                on_path.remove(&node);
                path.pop();
                continue;
            }

            if layers.contains_key(&node) {
                continue;
            }
            if on_path.contains(&node) {
                return Err(cycle_error(graph, &path, node));
            }

            on_path.insert(node);
            path.push(node);
            stack.push((node, true));
            for parent in graph.neighbors_directed(node, Direction::Incoming) {
                if !layers.contains_key(&parent) {
                    stack.push((parent, false));
                }
            }
        }
    }

    trace!(nodes = layers.len(); "Layers assigned");
    Ok(layers)
}

/// The cycle is the part of the current path from `repeated` onwards.
fn cycle_error(graph: &DiGraph<NodeMeta, ()>, path: &[NodeIndex], repeated: NodeIndex) -> LayoutError {
    let start = path.iter().position(|&node| node == repeated).unwrap_or(0);
    // The path runs child to parent; report the cycle in edge direction.
    let nodes = path[start..]
        .iter()
        .rev()
        .map(|&node| graph[node].id.clone())
        .collect();
    LayoutError::Cycle { nodes }
}

#[cfg(test)]
mod tests {
    use galileo_core::{identifier::NodeId, kind::NodeKind};

    use super::*;

    fn graph_with(nodes: &[&str], edges: &[(usize, usize)]) -> (DiGraph<NodeMeta, ()>, Vec<NodeIndex>) {
        let mut graph = DiGraph::new();
        let indices: Vec<_> = nodes
            .iter()
            .map(|&id| graph.add_node(NodeMeta::new(id, NodeKind::Datasource, id)))
            .collect();
        for &(parent, child) in edges {
            graph.add_edge(indices[parent], indices[child], ());
        }
        (graph, indices)
    }

    #[test]
    fn test_longest_path_wins() {
        // a -> b -> c and a -> c: c sits below b, not directly below a.
        let (graph, idx) = graph_with(&["c", "b", "a"], &[(2, 1), (1, 0), (2, 0)]);
        let layers = assign_layers(&graph, &idx).unwrap();
        assert_eq!(layers[&idx[2]], 0);
        assert_eq!(layers[&idx[1]], 1);
        assert_eq!(layers[&idx[0]], 2);
    }

    #[test]
    fn test_two_node_cycle_is_reported() {
        let (graph, idx) = graph_with(&["a", "b"], &[(0, 1), (1, 0)]);
        match assign_layers(&graph, &idx) {
            Err(LayoutError::Cycle { nodes }) => {
                let mut ids: Vec<_> = nodes.iter().map(|id| id.as_str()).collect();
                ids.sort_unstable();
                assert_eq!(ids, vec!["a", "b"]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_excludes_nodes_leading_into_it() {
        // root -> x -> y -> x, tail hangs below y.
        let (graph, idx) = graph_with(&["tail", "root", "x", "y"], &[(1, 2), (2, 3), (3, 2), (3, 0)]);
        match assign_layers(&graph, &idx) {
            Err(LayoutError::Cycle { nodes }) => {
                let mut ids: Vec<_> = nodes.iter().map(|id| id.as_str()).collect();
                ids.sort_unstable();
                assert_eq!(ids, vec!["x", "y"]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let (graph, idx) = graph_with(&["a"], &[(0, 0)]);
        assert_eq!(
            assign_layers(&graph, &idx),
            Err(LayoutError::Cycle {
                nodes: vec![NodeId::new("a")]
            })
        );
    }

    #[test]
    fn test_deep_chain() {
        let names: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let edges: Vec<_> = (1..refs.len()).map(|i| (i - 1, i)).collect();
        let (graph, idx) = graph_with(&refs, &edges);

        // Start from the deepest node to force the longest walk.
        let reversed: Vec<_> = idx.iter().rev().copied().collect();
        let layers = assign_layers(&graph, &reversed).unwrap();
        assert_eq!(layers[&idx[19_999]], 19_999);
    }
}
