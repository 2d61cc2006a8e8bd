//! Edge Record - directed, labeled link between two entity ids

use super::{ModelSchema, Record, TableKind};

/// Relationship label written by the simulator.
pub const TRAINED_ON: &str = "trained_on";

/// Relationship label written by the interactive model pipeline.
pub const USED_FOR_TRAINING: &str = "Used for training";

/// Edge Record represents one row of `edges.csv`.
///
/// Edges are never deduplicated: two identical rows are two edges. Endpoints
/// are not checked against the dataset or model tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    start_node: String,
    end_node: String,
    relationship: String,
}

impl EdgeRecord {
    /// Create a new edge.
    #[must_use]
    pub fn new(
        start_node: impl Into<String>,
        end_node: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            start_node: start_node.into(),
            end_node: end_node.into(),
            relationship: relationship.into(),
        }
    }

    /// Dataset → model edge labeled `trained_on`.
    #[must_use]
    pub fn trained_on(dataset_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self::new(dataset_id, model_id, TRAINED_ON)
    }

    /// Get the source node id.
    #[must_use]
    pub fn start_node(&self) -> &str {
        &self.start_node
    }

    /// Get the target node id.
    #[must_use]
    pub fn end_node(&self) -> &str {
        &self.end_node
    }

    /// Get the relationship label.
    #[must_use]
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// Whether the label denotes a dataset-used-to-train-model link.
    #[must_use]
    pub fn is_training_link(&self) -> bool {
        is_training_label(&self.relationship)
    }
}

/// Whether `label` is one of the known training relationship labels.
#[must_use]
pub fn is_training_label(label: &str) -> bool {
    let label = label.trim();
    label == TRAINED_ON || label.eq_ignore_ascii_case(USED_FOR_TRAINING)
}

impl Record for EdgeRecord {
    const KIND: TableKind = TableKind::Edge;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.start_node.clone(),
            self.end_node.clone(),
            self.relationship.clone(),
        ]
    }

    fn from_fields(fields: &[&str], _schema: ModelSchema) -> Result<Self, String> {
        match fields {
            [start, end, relationship] => Ok(Self::new(*start, *end, *relationship)),
            _ => Err(format!("expected 3 fields, found {}", fields.len())),
        }
    }
}
