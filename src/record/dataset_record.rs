//! Dataset Record - a dataset observed by the store

use std::collections::HashMap;

use super::{ModelSchema, Record, TableKind};

/// Dataset Record represents one row of `datasets.csv`.
///
/// `license` is a free-text label here. Only the metadata exporter
/// validates licenses against a fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    dataset_id: String,
    name: String,
    creator: String,
    license: String,
}

impl DatasetRecord {
    /// Create a new dataset record.
    ///
    /// # Arguments
    ///
    /// * `dataset_id` - Unique key, normally the content hash of the file
    /// * `name` - Display name (e.g., "MNIST")
    /// * `creator` - Person or organisation that produced the dataset
    /// * `license` - License label
    #[must_use]
    pub fn new(
        dataset_id: impl Into<String>,
        name: impl Into<String>,
        creator: impl Into<String>,
        license: impl Into<String>,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            name: name.into(),
            creator: creator.into(),
            license: license.into(),
        }
    }

    /// Get the dataset ID.
    #[must_use]
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the creator.
    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Get the license label.
    #[must_use]
    pub fn license(&self) -> &str {
        &self.license
    }
}

/// Map dataset ids to display names, in the order given.
///
/// An id with no matching row keeps the id itself. When several rows share
/// an id, the last one wins.
#[must_use]
pub fn display_names<S: AsRef<str>>(datasets: &[DatasetRecord], ids: &[S]) -> Vec<String> {
    let names: HashMap<&str, &str> = datasets
        .iter()
        .map(|d| (d.dataset_id(), d.name()))
        .collect();
    ids.iter()
        .map(|id| {
            let id = id.as_ref();
            names.get(id).copied().unwrap_or(id).to_string()
        })
        .collect()
}

impl Record for DatasetRecord {
    const KIND: TableKind = TableKind::Dataset;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.dataset_id.clone(),
            self.name.clone(),
            self.creator.clone(),
            self.license.clone(),
        ]
    }

    fn from_fields(fields: &[&str], _schema: ModelSchema) -> Result<Self, String> {
        match fields {
            [dataset_id, name, creator, license] => {
                Ok(Self::new(*dataset_id, *name, *creator, *license))
            }
            _ => Err(format!("expected 4 fields, found {}", fields.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_record_new() {
        let dataset = DatasetRecord::new("d1", "MNIST", "LeCun", "MIT");
        assert_eq!(dataset.dataset_id(), "d1");
        assert_eq!(dataset.name(), "MNIST");
        assert_eq!(dataset.creator(), "LeCun");
        assert_eq!(dataset.license(), "MIT");
    }

    #[test]
    fn test_dataset_record_fields_order() {
        let dataset = DatasetRecord::new("d1", "COCO", "Microsoft", "CC BY 4.0");
        assert_eq!(dataset.to_fields(), vec!["d1", "COCO", "Microsoft", "CC BY 4.0"]);
    }

    #[test]
    fn test_dataset_license_not_validated() {
        let parsed =
            DatasetRecord::from_fields(&["d3", "MNIST", "Yann LeCun", "Open Access"], ModelSchema::default())
                .unwrap();
        assert_eq!(parsed.license(), "Open Access");
    }

    #[test]
    fn test_display_names_in_request_order() {
        let datasets = vec![
            DatasetRecord::new("d1", "MNIST", "LeCun", "MIT"),
            DatasetRecord::new("d2", "COCO", "Lin", "CC-BY"),
        ];
        assert_eq!(display_names(&datasets, &["d2", "d1"]), vec!["COCO", "MNIST"]);
    }

    #[test]
    fn test_display_names_unknown_id_falls_back() {
        let datasets = vec![DatasetRecord::new("d1", "MNIST", "LeCun", "MIT")];
        assert_eq!(display_names(&datasets, &["d1", "d9"]), vec!["MNIST", "d9"]);
        assert_eq!(display_names::<&str>(&[], &["d1"]), vec!["d1"]);
    }

    #[test]
    fn test_display_names_last_row_wins() {
        let datasets = vec![
            DatasetRecord::new("d1", "Old", "a", "MIT"),
            DatasetRecord::new("d1", "New", "a", "MIT"),
        ];
        assert_eq!(display_names(&datasets, &["d1"]), vec!["New"]);
    }
}
