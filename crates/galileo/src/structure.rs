//! Pipeline graph structure.
//!
//! Converts the backend's entity lists into a typed, directed graph of
//! pipeline nodes that the layout engine consumes.

mod graph;

pub use graph::{NodeMeta, PipelineEntities, PipelineGraph};
