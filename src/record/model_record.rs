//! Model Record - a trained model observed by the store

use chrono::{SecondsFormat, Utc};
use std::fmt;

use super::{ModelSchema, Record, TableKind};

/// Fourth column of the model table.
///
/// Which variant a table holds is fixed by its `ModelSchema`.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelDetail {
    /// Denormalized, comma-separated dataset names. Derived from the edge
    /// table; never used for lineage queries.
    TrainedOn(String),
    /// Evaluation accuracy in `[0.0, 1.0]`.
    Accuracy(f64),
}

impl ModelDetail {
    /// Build the `trained_on` summary from dataset display names.
    #[must_use]
    pub fn trained_on_names<S: AsRef<str>>(names: &[S]) -> Self {
        let joined = names
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Self::TrainedOn(joined)
    }

    /// Schema variant this detail belongs to.
    #[must_use]
    pub const fn schema(&self) -> ModelSchema {
        match self {
            Self::TrainedOn(_) => ModelSchema::Provenance,
            Self::Accuracy(_) => ModelSchema::Statistics,
        }
    }

    /// Parse the raw column under `schema`.
    ///
    /// # Errors
    /// Returns a reason if an accuracy is not a finite number in `[0, 1]`.
    pub fn parse(raw: &str, schema: ModelSchema) -> Result<Self, String> {
        match schema {
            ModelSchema::Provenance => Ok(Self::TrainedOn(raw.to_string())),
            ModelSchema::Statistics => {
                let value: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("accuracy '{raw}' is not a number"))?;
                check_accuracy(value)?;
                Ok(Self::Accuracy(value))
            }
        }
    }
}

impl fmt::Display for ModelDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrainedOn(names) => f.write_str(names),
            Self::Accuracy(value) => write!(f, "{value}"),
        }
    }
}

fn check_accuracy(value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("accuracy {value} outside [0.0, 1.0]"))
    }
}

/// Current instant formatted for the `timestamp` column.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Model Record represents one row of `models.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRecord {
    model_id: String,
    name: String,
    params: String,
    detail: ModelDetail,
    timestamp: String,
}

impl ModelRecord {
    /// Create a model record from every column.
    ///
    /// # Arguments
    ///
    /// * `model_id` - Unique key, normally from `ids::new_model_id`
    /// * `name` - Display name
    /// * `params` - Free-text hyperparameters (e.g., "LR=0.01, Epochs=10")
    /// * `detail` - `trained_on` summary or accuracy
    /// * `timestamp` - ISO-8601 creation instant
    #[must_use]
    pub fn new(
        model_id: impl Into<String>,
        name: impl Into<String>,
        params: impl Into<String>,
        detail: ModelDetail,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            name: name.into(),
            params: params.into(),
            detail,
            timestamp: timestamp.into(),
        }
    }

    /// Create a builder for constructing a model record with optional fields.
    #[must_use]
    pub fn builder(model_id: impl Into<String>, name: impl Into<String>) -> ModelRecordBuilder {
        ModelRecordBuilder::new(model_id, name)
    }

    /// Get the model ID.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the hyperparameter text.
    #[must_use]
    pub fn params(&self) -> &str {
        &self.params
    }

    /// Get the fourth column.
    #[must_use]
    pub const fn detail(&self) -> &ModelDetail {
        &self.detail
    }

    /// Get the accuracy, if this is a statistics-variant row.
    #[must_use]
    pub const fn accuracy(&self) -> Option<f64> {
        match self.detail {
            ModelDetail::Accuracy(value) => Some(value),
            ModelDetail::TrainedOn(_) => None,
        }
    }

    /// Get the `trained_on` summary, if this is a provenance-variant row.
    #[must_use]
    pub fn trained_on(&self) -> Option<&str> {
        match &self.detail {
            ModelDetail::TrainedOn(names) => Some(names),
            ModelDetail::Accuracy(_) => None,
        }
    }

    /// Get the creation timestamp text.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Schema variant this row belongs to.
    #[must_use]
    pub const fn schema(&self) -> ModelSchema {
        self.detail.schema()
    }
}

impl Record for ModelRecord {
    const KIND: TableKind = TableKind::Model;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.model_id.clone(),
            self.name.clone(),
            self.params.clone(),
            self.detail.to_string(),
            self.timestamp.clone(),
        ]
    }

    fn from_fields(fields: &[&str], schema: ModelSchema) -> Result<Self, String> {
        match fields {
            [model_id, name, params, detail, timestamp] => Ok(Self::new(
                *model_id,
                *name,
                *params,
                ModelDetail::parse(detail, schema)?,
                *timestamp,
            )),
            _ => Err(format!("expected 5 fields, found {}", fields.len())),
        }
    }

    fn schema_variant(&self) -> Option<ModelSchema> {
        Some(self.detail.schema())
    }
}

/// Builder for `ModelRecord`.
#[derive(Debug)]
pub struct ModelRecordBuilder {
    model_id: String,
    name: String,
    params: String,
    detail: ModelDetail,
    timestamp: Option<String>,
}

impl ModelRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(model_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            name: name.into(),
            params: String::new(),
            detail: ModelDetail::TrainedOn(String::new()),
            timestamp: None,
        }
    }

    /// Set the hyperparameter text.
    #[must_use]
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }

    /// Record an accuracy (statistics variant).
    #[must_use]
    pub fn accuracy(mut self, accuracy: f64) -> Self {
        self.detail = ModelDetail::Accuracy(accuracy);
        self
    }

    /// Record the `trained_on` summary from dataset names (provenance variant).
    #[must_use]
    pub fn trained_on<S: AsRef<str>>(mut self, dataset_names: &[S]) -> Self {
        self.detail = ModelDetail::trained_on_names(dataset_names);
        self
    }

    /// Set a custom timestamp (useful for imports and tests).
    #[must_use]
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Build the `ModelRecord`, stamping the current time if none was set.
    #[must_use]
    pub fn build(self) -> ModelRecord {
        ModelRecord {
            model_id: self.model_id,
            name: self.name,
            params: self.params,
            detail: self.detail,
            timestamp: self.timestamp.unwrap_or_else(now_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_record_builder_accuracy() {
        let model = ModelRecord::builder("m1", "Net1")
            .params("LR=0.01")
            .accuracy(0.88)
            .timestamp("2024-01-01T00:00:00")
            .build();
        assert_eq!(model.model_id(), "m1");
        assert_eq!(model.accuracy(), Some(0.88));
        assert!(model.trained_on().is_none());
        assert_eq!(model.schema(), ModelSchema::Statistics);
        assert_eq!(
            model.to_fields(),
            vec!["m1", "Net1", "LR=0.01", "0.88", "2024-01-01T00:00:00"]
        );
    }

    #[test]
    fn test_model_record_trained_on_summary() {
        let model = ModelRecord::builder("m2", "Detector")
            .trained_on(&["ImageNet", "COCO"])
            .build();
        assert_eq!(model.trained_on(), Some("ImageNet, COCO"));
        assert_eq!(model.schema(), ModelSchema::Provenance);
        assert!(model.timestamp().ends_with('Z'));
    }

    #[test]
    fn test_parse_accuracy_rejects_text() {
        let err = ModelDetail::parse("abc", ModelSchema::Statistics).unwrap_err();
        assert!(err.contains("not a number"));
    }

    #[test]
    fn test_parse_accuracy_rejects_out_of_range() {
        assert!(ModelDetail::parse("1.5", ModelSchema::Statistics).is_err());
        assert!(ModelDetail::parse("NaN", ModelSchema::Statistics).is_err());
        assert!(ModelDetail::parse("1", ModelSchema::Statistics).is_ok());
    }

    #[test]
    fn test_provenance_detail_keeps_text() {
        let detail = ModelDetail::parse("MNIST, COCO", ModelSchema::Provenance).unwrap();
        assert_eq!(detail, ModelDetail::TrainedOn("MNIST, COCO".to_string()));
    }
}
