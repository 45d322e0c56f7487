//! Weakly connected components.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};

/// Splits `graph` into connected components, ignoring edge direction.
///
/// Components are returned in the order of their first node by insertion;
/// members of each component are sorted by insertion order. Traversal uses
/// an explicit stack.
pub(super) fn connected_components<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut components = Vec::new();

    for start in graph.node_indices() {
        if !visited.insert(start) {
            continue;
        }

        let mut members = vec![start];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for neighbor in graph.neighbors_undirected(node) {
                if visited.insert(neighbor) {
                    members.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }

        members.sort_unstable();
        components.push(members);
    }

    components
}
