//! Provenance Record Schema
//!
//! Row types for the three tables of the provenance store.
//!
//! ## Schema Overview
//!
//! ```text
//! DatasetRecord ──< EdgeRecord >── ModelRecord
//!   dataset_id       start_node       model_id
//!                    end_node
//!                    relationship
//! ```
//!
//! Edges are the authoritative lineage. The `trained_on` column of the
//! provenance-variant model table is a denormalized summary only.
//!
//! ## Usage
//!
//! ```rust
//! use provenance_db::record::{DatasetRecord, EdgeRecord, ModelRecord};
//!
//! let dataset = DatasetRecord::new("d1", "MNIST", "LeCun", "MIT");
//! let model = ModelRecord::builder("m1", "Net1")
//!     .params("LR=0.01")
//!     .accuracy(0.88)
//!     .build();
//! let edge = EdgeRecord::trained_on(dataset.dataset_id(), model.model_id());
//! assert!(edge.is_training_link());
//! ```

mod dataset_record;
mod edge_record;
mod model_record;

pub use dataset_record::{display_names, DatasetRecord};
pub use edge_record::{is_training_label, EdgeRecord, TRAINED_ON, USED_FOR_TRAINING};
pub use model_record::{now_timestamp, ModelDetail, ModelRecord, ModelRecordBuilder};

use std::fmt;
use std::str::FromStr;

use crate::Error;

const DATASET_HEADER: &[&str] = &["dataset_id", "name", "creator", "license"];
const MODEL_PROVENANCE_HEADER: &[&str] = &["model_id", "name", "params", "trained_on", "timestamp"];
const MODEL_STATISTICS_HEADER: &[&str] = &["model_id", "name", "params", "accuracy", "timestamp"];
const EDGE_HEADER: &[&str] = &["start_node", "end_node", "relationship"];
// Header written by early simulator builds; same column meaning.
const LEGACY_EDGE_HEADER: &[&str] = &["dataset_id", "model_id", "relationship"];

/// One of the three tables in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// `datasets.csv`
    Dataset,
    /// `models.csv`
    Model,
    /// `edges.csv`
    Edge,
}

impl TableKind {
    /// All table kinds, in initialization order.
    pub const ALL: [Self; 3] = [Self::Dataset, Self::Model, Self::Edge];

    /// Table name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dataset => "datasets",
            Self::Model => "models",
            Self::Edge => "edges",
        }
    }

    /// Backing file name inside the data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Dataset => "datasets.csv",
            Self::Model => "models.csv",
            Self::Edge => "edges.csv",
        }
    }

    /// Header row for this table under the given model schema.
    #[must_use]
    pub const fn header(self, schema: ModelSchema) -> &'static [&'static str] {
        match self {
            Self::Dataset => DATASET_HEADER,
            Self::Model => match schema {
                ModelSchema::Provenance => MODEL_PROVENANCE_HEADER,
                ModelSchema::Statistics => MODEL_STATISTICS_HEADER,
            },
            Self::Edge => EDGE_HEADER,
        }
    }

    /// Number of columns in this table (identical across schema variants).
    #[must_use]
    pub const fn width(self) -> usize {
        self.header(ModelSchema::Statistics).len()
    }

    /// Whether a header read from disk is valid for this table.
    #[must_use]
    pub fn accepts_header(self, schema: ModelSchema, found: &[&str]) -> bool {
        found == self.header(schema) || (self == Self::Edge && found == LEGACY_EDGE_HEADER)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which meaning the fourth column of the model table carries.
///
/// The two variants are not interchangeable. The header row on disk records
/// the variant a table was created with and is checked on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelSchema {
    /// `trained_on`: human-readable list of dataset names.
    Provenance,
    /// `accuracy`: number in `[0.0, 1.0]`.
    #[default]
    Statistics,
}

impl ModelSchema {
    /// Name of the fourth model column for this variant.
    #[must_use]
    pub const fn detail_column(self) -> &'static str {
        match self {
            Self::Provenance => "trained_on",
            Self::Statistics => "accuracy",
        }
    }
}

impl fmt::Display for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provenance => f.write_str("provenance"),
            Self::Statistics => f.write_str("statistics"),
        }
    }
}

impl FromStr for ModelSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "provenance" | "trained_on" => Ok(Self::Provenance),
            "statistics" | "accuracy" => Ok(Self::Statistics),
            other => Err(Error::InvalidInput(format!(
                "unknown model schema '{other}' (expected 'provenance' or 'statistics')"
            ))),
        }
    }
}

/// A row type stored in one of the provenance tables.
///
/// `from_fields` returns a human-readable reason on failure; the store wraps
/// it into `Error::MalformedRow` with the table name and line number.
pub trait Record: Sized {
    /// Table this record lives in.
    const KIND: TableKind;

    /// Fields in header column order.
    fn to_fields(&self) -> Vec<String>;

    /// Parse a row already checked to have `KIND.width()` fields.
    ///
    /// # Errors
    /// Returns a reason string if a field cannot be interpreted.
    fn from_fields(fields: &[&str], schema: ModelSchema) -> std::result::Result<Self, String>;

    /// Model schema variant the record was built for, if it depends on one.
    fn schema_variant(&self) -> Option<ModelSchema> {
        None
    }
}

/// Check that `fields` would load back as a valid row of `kind`.
pub(crate) fn validate_fields(
    kind: TableKind,
    fields: &[&str],
    schema: ModelSchema,
) -> std::result::Result<(), String> {
    if fields.len() != kind.width() {
        return Err(format!(
            "expected {} fields, found {}",
            kind.width(),
            fields.len()
        ));
    }
    match kind {
        TableKind::Dataset => DatasetRecord::from_fields(fields, schema).map(drop),
        TableKind::Model => ModelRecord::from_fields(fields, schema).map(drop),
        TableKind::Edge => EdgeRecord::from_fields(fields, schema).map(drop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_per_schema() {
        assert_eq!(
            TableKind::Model.header(ModelSchema::Provenance)[3],
            "trained_on"
        );
        assert_eq!(TableKind::Model.header(ModelSchema::Statistics)[3], "accuracy");
        assert_eq!(
            TableKind::Dataset.header(ModelSchema::Provenance),
            TableKind::Dataset.header(ModelSchema::Statistics)
        );
    }

    #[test]
    fn test_widths() {
        assert_eq!(TableKind::Dataset.width(), 4);
        assert_eq!(TableKind::Model.width(), 5);
        assert_eq!(TableKind::Edge.width(), 3);
    }

    #[test]
    fn test_legacy_edge_header_accepted() {
        assert!(TableKind::Edge.accepts_header(
            ModelSchema::Statistics,
            &["dataset_id", "model_id", "relationship"]
        ));
        assert!(!TableKind::Dataset.accepts_header(
            ModelSchema::Statistics,
            &["dataset_id", "model_id", "relationship"]
        ));
    }

    #[test]
    fn test_model_schema_from_str() {
        assert_eq!("Statistics".parse::<ModelSchema>().unwrap(), ModelSchema::Statistics);
        assert_eq!("trained_on".parse::<ModelSchema>().unwrap(), ModelSchema::Provenance);
        assert!("v2".parse::<ModelSchema>().is_err());
    }

    #[test]
    fn test_validate_fields_width() {
        let err = validate_fields(TableKind::Edge, &["d1", "m1"], ModelSchema::Statistics)
            .unwrap_err();
        assert!(err.contains("expected 3 fields"));
    }
}
