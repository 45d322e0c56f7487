//! The pipeline graph and its assembly from backend entities.

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};
use serde::Serialize;

use galileo_core::{
    identifier::NodeId,
    kind::NodeKind,
    model::{Datasource, Deployment, Preprocess, Training},
};

/// Number of id characters shown in deployment labels.
const DEPLOYMENT_LABEL_ID_LEN: usize = 8;

/// Identity and display data of one pipeline node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMeta {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
}

impl NodeMeta {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
        }
    }
}

/// The four entity lists a pipeline graph is built from.
#[derive(Debug, Clone, Default)]
pub struct PipelineEntities {
    pub datasources: Vec<Datasource>,
    pub preprocesses: Vec<Preprocess>,
    pub trainings: Vec<Training>,
    pub deployments: Vec<Deployment>,
}

impl PipelineEntities {
    /// Total number of entities across all lists.
    pub fn len(&self) -> usize {
        self.datasources.len() + self.preprocesses.len() + self.trainings.len() + self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Directed graph of pipeline nodes, edges pointing from parent to child.
///
/// Nodes keep their insertion order, which is the order the layout engine
/// discovers components in and the final tie-breaker for sibling ordering.
/// Duplicate ids keep the first node; parent relations naming unknown ids
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct PipelineGraph {
    graph: DiGraph<NodeMeta, ()>,
    index: IndexMap<NodeId, NodeIndex>,
}

impl PipelineGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for a full set of backend entities.
    ///
    /// Nodes are inserted as datasources, preprocesses, trainings, then
    /// deployments. Edges: each preprocess parent to the preprocess, the
    /// preprocess to its child datasource, a training's datasource to the
    /// training, and a deployment's training to the deployment.
    pub fn from_entities(entities: &PipelineEntities) -> Self {
        let mut graph = Self::new();

        for datasource in &entities.datasources {
            graph.add_node(NodeMeta::new(datasource.id.clone(), NodeKind::Datasource, &datasource.name));
        }
        for preprocess in &entities.preprocesses {
            graph.add_node(NodeMeta::new(preprocess.id.clone(), NodeKind::Preprocess, &preprocess.name));
        }
        for training in &entities.trainings {
            graph.add_node(NodeMeta::new(training.id.clone(), NodeKind::Training, &training.name));
        }
        for deployment in &entities.deployments {
            let label = format!("deployment {}", deployment.id.short(DEPLOYMENT_LABEL_ID_LEN));
            graph.add_node(NodeMeta::new(deployment.id.clone(), NodeKind::Deployment, label));
        }

        for preprocess in &entities.preprocesses {
            for parent in &preprocess.parent_ids {
                graph.add_parent(&preprocess.id, parent);
            }
            graph.add_parent(&preprocess.child_id, &preprocess.id);
        }
        for training in &entities.trainings {
            graph.add_parent(&training.id, &training.datasource_id);
        }
        for deployment in &entities.deployments {
            graph.add_parent(&deployment.id, &deployment.training_id);
        }

        debug!(nodes = graph.len(), edges = graph.edge_count(); "Pipeline graph assembled");
        graph
    }

    /// Adds a node. Returns false, leaving the graph unchanged, if the id is
    /// already present.
    pub fn add_node(&mut self, node: NodeMeta) -> bool {
        if self.index.contains_key(&node.id) {
            trace!(id = node.id.as_str(); "Ignoring duplicate node");
            return false;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        true
    }

    /// Declares `parent` as a parent of `child`.
    ///
    /// Returns false when either id is unknown; such relations never make it
    /// into the graph. Repeated declarations are stored once.
    pub fn add_parent(&mut self, child: &NodeId, parent: &NodeId) -> bool {
        let (Some(&child_idx), Some(&parent_idx)) = (self.index.get(child), self.index.get(parent)) else {
            trace!(child = child.as_str(), parent = parent.as_str(); "Ignoring dangling parent");
            return false;
        };
        self.graph.update_edge(parent_idx, child_idx, ());
        true
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeMeta> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeMeta> {
        self.graph.node_weights()
    }

    /// Parents of `id` in the order they were declared.
    pub fn parents(&self, id: &NodeId) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Children of `id` in the order they were declared.
    pub fn children(&self, id: &NodeId) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Iterates `(parent, child)` pairs in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.graph
            .raw_edges()
            .iter()
            .map(|edge| (&self.graph[edge.source()].id, &self.graph[edge.target()].id))
    }

    /// The underlying petgraph graph, for the layout engine.
    pub(crate) fn inner(&self) -> &DiGraph<NodeMeta, ()> {
        &self.graph
    }

    fn neighbors(&self, id: &NodeId, direction: Direction) -> Vec<&NodeId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest-first.
        let mut ids: Vec<&NodeId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|neighbor| &self.graph[neighbor].id)
            .collect();
        ids.reverse();
        ids
    }
}
