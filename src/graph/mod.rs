//! Provenance graph view
//!
//! In-memory directed multigraph rebuilt from the three tables on demand:
//!
//! ```text
//! [dataset: MNIST] ──trained_on──> [model: Net1]
//!        │
//!        └──Used for training──> [model: Net2]
//! ```
//!
//! Edge endpoints missing from both entity tables still become nodes
//! (`NodeKind::Unknown`, no label), so a dangling edge never aborts the
//! build. Cycles and isolated nodes are allowed.

use std::collections::HashMap;
use std::fmt::Write as _;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, warn};

use crate::record::{DatasetRecord, EdgeRecord, ModelRecord};
use crate::storage::ProvenanceStore;
use crate::Result;

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Row of the dataset table
    Dataset,
    /// Row of the model table
    Model,
    /// Referenced by an edge only
    Unknown,
}

impl NodeKind {
    /// Lowercase tag used in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Model => "model",
            Self::Unknown => "unknown",
        }
    }
}

/// A dataset, model or bare identifier in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceNode {
    /// Entity identifier
    pub id: String,
    /// Entity kind
    pub kind: NodeKind,
    /// Display name; `None` for bare nodes
    pub label: Option<String>,
}

/// Directed, labeled view over datasets, models and their edges.
#[derive(Debug, Default)]
pub struct ProvenanceGraph {
    graph: DiGraph<ProvenanceNode, String>,
    index: HashMap<String, NodeIndex>,
}

impl ProvenanceGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all three tables from `store` and build the graph.
    ///
    /// Missing tables count as empty.
    ///
    /// # Errors
    /// Propagates any load error other than a missing table.
    pub fn build(store: &ProvenanceStore) -> Result<Self> {
        let datasets: Vec<DatasetRecord> = store.load_all_or_empty()?;
        let models: Vec<ModelRecord> = store.load_all_or_empty()?;
        let edges: Vec<EdgeRecord> = store.load_all_or_empty()?;
        Ok(Self::from_records(&datasets, &models, &edges))
    }

    /// Build the graph from already loaded records.
    #[must_use]
    pub fn from_records(
        datasets: &[DatasetRecord],
        models: &[ModelRecord],
        edges: &[EdgeRecord],
    ) -> Self {
        let mut graph = Self::new();
        for dataset in datasets {
            graph.upsert_node(dataset.dataset_id(), NodeKind::Dataset, Some(dataset.name()));
        }
        for model in models {
            graph.upsert_node(model.model_id(), NodeKind::Model, Some(model.name()));
        }

        let mut bare = 0usize;
        for edge in edges {
            let before = graph.node_count();
            let start = graph.node_or_bare(edge.start_node());
            let end = graph.node_or_bare(edge.end_node());
            bare += graph.node_count() - before;
            graph
                .graph
                .add_edge(start, end, edge.relationship().to_string());
        }
        if bare > 0 {
            warn!(bare_nodes = bare, "edges reference ids missing from entity tables");
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built provenance graph"
        );
        graph
    }

    fn upsert_node(&mut self, id: &str, kind: NodeKind, label: Option<&str>) -> NodeIndex {
        let node = ProvenanceNode {
            id: id.to_string(),
            kind,
            label: label.map(str::to_string),
        };
        if let Some(&idx) = self.index.get(id) {
            // A later table wins; only happens when an id is reused across tables.
            self.graph[idx] = node;
            idx
        } else {
            let idx = self.graph.add_node(node);
            self.index.insert(id.to_string(), idx);
            idx
        }
    }

    fn node_or_bare(&mut self, id: &str) -> NodeIndex {
        match self.index.get(id) {
            Some(&idx) => idx,
            None => self.upsert_node(id, NodeKind::Unknown, None),
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, parallel edges included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a node by entity id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ProvenanceNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ProvenanceNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All edges as `(start_id, end_id, relationship)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].id.as_str(),
                self.graph[edge.target()].id.as_str(),
                edge.weight().as_str(),
            )
        })
    }

    /// Ids with an edge pointing into `id` (upstream lineage), insertion order.
    #[must_use]
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Ids that `id` points to (downstream), insertion order.
    #[must_use]
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|edge| edge.id());
        let mut ids: Vec<&str> = Vec::with_capacity(edges.len());
        for edge in edges {
            let other = match direction {
                Direction::Incoming => edge.source(),
                Direction::Outgoing => edge.target(),
            };
            let other_id = self.graph[other].id.as_str();
            if !ids.contains(&other_id) {
                ids.push(other_id);
            }
        }
        ids
    }

    /// Datasets that fed into `model_id`.
    #[must_use]
    pub fn datasets_for_model(&self, model_id: &str) -> Vec<&ProvenanceNode> {
        self.predecessors(model_id)
            .into_iter()
            .filter_map(|id| self.node(id))
            .filter(|node| node.kind == NodeKind::Dataset)
            .collect()
    }

    /// Models that `dataset_id` fed into.
    #[must_use]
    pub fn models_for_dataset(&self, dataset_id: &str) -> Vec<&ProvenanceNode> {
        self.successors(dataset_id)
            .into_iter()
            .filter_map(|id| self.node(id))
            .filter(|node| node.kind == NodeKind::Model)
            .collect()
    }

    /// Graphviz DOT rendering for visualization tools.
    ///
    /// Datasets are drawn light blue, models light coral, bare ids grey.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph provenance {\n    rankdir=LR;\n");
        for node in self.nodes() {
            let color = match node.kind {
                NodeKind::Dataset => "lightblue",
                NodeKind::Model => "lightcoral",
                NodeKind::Unknown => "lightgrey",
            };
            let label = node.label.as_deref().unwrap_or(&node.id);
            let _ = writeln!(
                out,
                "    \"{}\" [label=\"{}\", kind=\"{}\", style=filled, fillcolor={}];",
                escape_dot(&node.id),
                escape_dot(label),
                node.kind.as_str(),
                color
            );
        }
        for (start, end, relationship) in self.edges() {
            let _ = writeln!(
                out,
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                escape_dot(start),
                escape_dot(end),
                escape_dot(relationship)
            );
        }
        out.push_str("}\n");
        out
    }
}

fn escape_dot(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}
