//! Column packing within layers.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use galileo_core::identifier::NodeId;

use crate::structure::NodeMeta;

/// Sibling order: kind, then label, then insertion order.
fn node_order(graph: &DiGraph<NodeMeta, ()>, a: NodeIndex, b: NodeIndex) -> Ordering {
    let (left, right) = (&graph[a], &graph[b]);
    left.kind
        .cmp(&right.kind)
        .then_with(|| left.label.cmp(&right.label))
        .then_with(|| a.cmp(&b))
}

/// Nodes of one layer sharing the same parent set.
#[derive(Default)]
struct Group {
    parents: Vec<NodeIndex>,
    members: Vec<NodeIndex>,
}

/// Assigns each member of one component a column within its layer.
///
/// Layer 0 fills columns from 0 in sibling order. Deeper layers are
/// processed group by group, groups keyed and ordered by their sorted parent
/// ids. A group is centered on the mean column of its parents in the layer
/// directly above, rounded half up, then pushed right as needed so column
/// ranges never overlap. Groups without such a parent go to the right of
/// everything else in the layer.
///
/// Centering may place a group left of column 0; the finished component is
/// shifted so its leftmost column is 0.
pub(super) fn assign_columns(
    graph: &DiGraph<NodeMeta, ()>,
    members: &[NodeIndex],
    layers: &HashMap<NodeIndex, usize>,
) -> HashMap<NodeIndex, usize> {
    let mut columns: HashMap<NodeIndex, i64> = HashMap::with_capacity(members.len());
    let Some(depth) = members.iter().filter_map(|node| layers.get(node)).max().copied() else {
        return HashMap::new();
    };

    let mut by_layer: Vec<Vec<NodeIndex>> = vec![Vec::new(); depth + 1];
    for &node in members {
        if let Some(&layer) = layers.get(&node) {
            by_layer[layer].push(node);
        }
    }

    let mut roots = std::mem::take(&mut by_layer[0]);
    roots.sort_by(|&a, &b| node_order(graph, a, b));
    place(&mut columns, &roots, 0);

    for (layer, nodes) in by_layer.iter().enumerate().skip(1) {
        let mut groups: BTreeMap<Vec<&NodeId>, Group> = BTreeMap::new();
        for &node in nodes {
            let mut parents: Vec<NodeIndex> = graph.neighbors_directed(node, Direction::Incoming).collect();
            parents.sort_by(|&a, &b| graph[a].id.cmp(&graph[b].id));
            parents.dedup();

            let key = parents.iter().map(|&parent| &graph[parent].id).collect();
            let group = groups.entry(key).or_default();
            group.parents = parents;
            group.members.push(node);
        }

        let mut rightmost: Option<i64> = None;
        let mut columnless = Vec::new();

        for group in groups.into_values() {
            let Group { parents, mut members } = group;
            members.sort_by(|&a, &b| node_order(graph, a, b));

            let parent_columns: Vec<i64> = parents
                .iter()
                .filter(|parent| layers.get(parent) == Some(&(layer - 1)))
                .filter_map(|parent| columns.get(parent).copied())
                .collect();
            if parent_columns.is_empty() {
                columnless.push(members);
                continue;
            }

            let mut start = group_start(&parent_columns, members.len());
            if let Some(rightmost) = rightmost {
                if start <= rightmost {
                    start = rightmost + 1;
                }
            }

            rightmost = Some(place(&mut columns, &members, start));
        }

        for members in columnless {
            let start = rightmost.map_or(0, |rightmost| rightmost + 1);
            rightmost = Some(place(&mut columns, &members, start));
        }
    }

    let leftmost = columns.values().min().copied().unwrap_or_default();
    columns
        .into_iter()
        .map(|(node, column)| (node, (column - leftmost) as usize))
        .collect()
}

/// First column of a group of `len` members centered under `parent_columns`.
///
/// The center is the parents' mean rounded half up, which keeps ties stable
/// under the final shift. Even-sized groups put the extra member left of the
/// center, so their own mean rounds back onto it.
fn group_start(parent_columns: &[i64], len: usize) -> i64 {
    let mean = parent_columns.iter().sum::<i64>() as f64 / parent_columns.len() as f64;
    let center = (mean + 0.5).floor() as i64;
    center - (len / 2) as i64
}

/// Places `members` on consecutive columns from `start`; returns the last column.
fn place(columns: &mut HashMap<NodeIndex, i64>, members: &[NodeIndex], start: i64) -> i64 {
    for (offset, &node) in (start..).zip(members) {
        columns.insert(node, offset);
    }
    start + members.len() as i64 - 1
}

#[cfg(test)]
mod tests {
    use galileo_core::kind::NodeKind;

    use super::*;
    use crate::layout::layering::assign_layers;

    struct Fixture {
        graph: DiGraph<NodeMeta, ()>,
        index: HashMap<&'static str, NodeIndex>,
    }

    impl Fixture {
        fn new(nodes: &[(&'static str, NodeKind)], edges: &[(&'static str, &'static str)]) -> Self {
            let mut graph = DiGraph::new();
            let mut index = HashMap::new();
            for &(id, kind) in nodes {
                index.insert(id, graph.add_node(NodeMeta::new(id, kind, id)));
            }
            for &(parent, child) in edges {
                graph.add_edge(index[parent], index[child], ());
            }
            Self { graph, index }
        }

        fn columns(&self) -> HashMap<&'static str, usize> {
            let members: Vec<_> = self.graph.node_indices().collect();
            let layers = assign_layers(&self.graph, &members).unwrap();
            let columns = assign_columns(&self.graph, &members, &layers);
            self.index
                .iter()
                .map(|(&id, idx)| (id, columns[idx]))
                .collect()
        }
    }

    #[test]
    fn test_roots_sorted_by_kind_then_label() {
        let fixture = Fixture::new(
            &[
                ("zeta", NodeKind::Datasource),
                ("alpha", NodeKind::Training),
                ("beta", NodeKind::Datasource),
            ],
            &[],
        );
        let columns = fixture.columns();
        assert_eq!(columns["beta"], 0);
        assert_eq!(columns["zeta"], 1);
        assert_eq!(columns["alpha"], 2);
    }

    #[test]
    fn test_children_centered_under_parent() {
        let fixture = Fixture::new(
            &[
                ("a", NodeKind::Datasource),
                ("b", NodeKind::Datasource),
                ("c", NodeKind::Datasource),
                ("x", NodeKind::Preprocess),
                ("y", NodeKind::Training),
                ("z", NodeKind::Training),
            ],
            &[("b", "x"), ("b", "y"), ("b", "z")],
        );
        let columns = fixture.columns();
        // Parent b sits in column 1; three children span 0..=2 around it.
        assert_eq!(columns["b"], 1);
        assert_eq!(columns["x"], 0);
        assert_eq!(columns["y"], 1);
        assert_eq!(columns["z"], 2);
    }

    #[test]
    fn test_two_children_straddle_their_parent() {
        let fixture = Fixture::new(
            &[
                ("p", NodeKind::Datasource),
                ("q", NodeKind::Datasource),
                ("p1", NodeKind::Training),
                ("p2", NodeKind::Training),
                ("q1", NodeKind::Training),
            ],
            &[("p", "p1"), ("p", "p2"), ("q", "q1")],
        );
        let columns = fixture.columns();
        // p's pair starts left of column 0, so the whole component moves right.
        assert_eq!((columns["p"], columns["q"]), (1, 2));
        assert_eq!((columns["p1"], columns["p2"]), (0, 1));
        assert_eq!(columns["q1"], 2);
    }

    #[test]
    fn test_overlapping_groups_are_shifted_right() {
        let fixture = Fixture::new(
            &[
                ("p", NodeKind::Datasource),
                ("q", NodeKind::Datasource),
                ("p1", NodeKind::Training),
                ("p2", NodeKind::Training),
                ("p3", NodeKind::Training),
                ("q1", NodeKind::Training),
            ],
            &[("p", "p1"), ("p", "p2"), ("p", "p3"), ("q", "q1")],
        );
        let columns = fixture.columns();
        assert_eq!((columns["p"], columns["q"]), (1, 2));
        assert_eq!((columns["p1"], columns["p2"], columns["p3"]), (0, 1, 2));
        // Centered on q would be column 2, which p's group already uses.
        assert_eq!(columns["q1"], 3);
    }

    #[test]
    fn test_join_centered_on_rounded_mean() {
        let fixture = Fixture::new(
            &[
                ("a", NodeKind::Datasource),
                ("b", NodeKind::Datasource),
                ("join", NodeKind::Preprocess),
            ],
            &[("a", "join"), ("b", "join")],
        );
        // Mean of columns 0 and 1 rounds half up.
        assert_eq!(fixture.columns()["join"], 1);
    }

    #[test]
    fn test_group_start_rounds_ties_up_on_both_sides_of_zero() {
        assert_eq!(group_start(&[0, 1], 1), 1);
        assert_eq!(group_start(&[-2, -1], 1), -1);
        assert_eq!(group_start(&[3], 2), 2);
        assert_eq!(group_start(&[3], 3), 2);
    }

    #[test]
    fn test_only_parents_directly_above_set_the_center() {
        let fixture = Fixture::new(
            &[
                ("a", NodeKind::Datasource),
                ("b", NodeKind::Datasource),
                ("c", NodeKind::Datasource),
                ("d", NodeKind::Datasource),
                ("mid", NodeKind::Preprocess),
                ("low", NodeKind::Training),
            ],
            &[("d", "mid"), ("a", "low"), ("mid", "low")],
        );
        let columns = fixture.columns();
        assert_eq!(columns["d"], 3);
        assert_eq!(columns["mid"], 3);
        // Parent a (layer 0) is ignored; only mid (layer 1) counts.
        assert_eq!(columns["low"], 3);
    }
}
