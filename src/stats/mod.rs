//! Statistics over the provenance tables
//!
//! - **Per-dataset average accuracy**: every training edge whose model row
//!   carries an accuracy contributes that accuracy to the bucket of the
//!   edge's start node (a dataset id). Each bucket is averaged and rounded to
//!   3 decimals, half away from zero (`f64::round`), then keyed by name.
//! - **Top models**: highest accuracy first, ties in insertion order.
//!
//! Edges pointing at unknown models are skipped, not reported. The edge
//! table is the only lineage source; the `trained_on` text column is ignored.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::record::{DatasetRecord, EdgeRecord, ModelRecord};
use crate::storage::ProvenanceStore;
use crate::topk::{top_k_by, SortOrder};
use crate::Result;

/// Decimal places kept in reported averages.
pub const ACCURACY_DECIMALS: i32 = 3;

/// Aggregated accuracy for one dataset id.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetAccuracy {
    /// Dataset id (edge start node)
    pub dataset_id: String,
    /// Display name, or the id when the dataset row is missing
    pub name: String,
    /// Rounded mean accuracy
    pub average: f64,
    /// Number of qualifying edges
    pub edge_count: usize,
}

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Default)]
struct Bucket {
    sum: f64,
    count: usize,
}

impl Bucket {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Bucket training accuracies by dataset id, in first-seen edge order.
#[must_use]
pub fn dataset_accuracy(
    datasets: &[DatasetRecord],
    models: &[ModelRecord],
    edges: &[EdgeRecord],
) -> Vec<DatasetAccuracy> {
    let accuracy_by_model: HashMap<&str, f64> = models
        .iter()
        .filter_map(|m| m.accuracy().map(|acc| (m.model_id(), acc)))
        .collect();
    let names: HashMap<&str, &str> = datasets
        .iter()
        .map(|d| (d.dataset_id(), d.name()))
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut buckets: HashMap<&str, Bucket> = HashMap::new();
    let mut skipped = 0usize;
    for edge in edges.iter().filter(|e| e.is_training_link()) {
        let Some(&accuracy) = accuracy_by_model.get(edge.end_node()) else {
            skipped += 1;
            continue;
        };
        let bucket = buckets.entry(edge.start_node()).or_insert_with(|| {
            order.push(edge.start_node());
            Bucket::default()
        });
        bucket.push(accuracy);
    }
    if skipped > 0 {
        debug!(skipped, "training edges without a scored model");
    }

    order
        .into_iter()
        .map(|id| {
            let bucket = &buckets[id];
            DatasetAccuracy {
                dataset_id: id.to_string(),
                name: names.get(id).copied().unwrap_or(id).to_string(),
                average: round_to(bucket.mean(), ACCURACY_DECIMALS),
                edge_count: bucket.count,
            }
        })
        .collect()
}

/// Average accuracy keyed by dataset display name.
///
/// Accuracies are bucketed and averaged per dataset id (see
/// [`dataset_accuracy`]) before names are attached. When several ids share a
/// display name, the id whose first training edge appears last wins.
/// Datasets without qualifying edges are absent.
#[must_use]
pub fn per_dataset_average_accuracy(
    datasets: &[DatasetRecord],
    models: &[ModelRecord],
    edges: &[EdgeRecord],
) -> BTreeMap<String, f64> {
    let mut averages = BTreeMap::new();
    for row in dataset_accuracy(datasets, models, edges) {
        if let Some(previous) = averages.insert(row.name, row.average) {
            debug!(dataset_id = %row.dataset_id, previous, "display name shared by several datasets");
        }
    }
    averages
}

/// The `n` most accurate models, best first; ties keep insertion order.
///
/// Rows without an accuracy (provenance schema) are never ranked.
#[must_use]
pub fn top_models(models: &[ModelRecord], n: usize) -> Vec<ModelRecord> {
    top_k_by(models, n, SortOrder::Descending, ModelRecord::accuracy)
}

/// Statistics engine reading straight from a store.
///
/// Holds no state: each query reloads the tables it needs.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsEngine<'a> {
    store: &'a ProvenanceStore,
}

impl<'a> StatisticsEngine<'a> {
    /// Create an engine over `store`.
    #[must_use]
    pub const fn new(store: &'a ProvenanceStore) -> Self {
        Self { store }
    }

    /// See [`per_dataset_average_accuracy`]. Missing tables count as empty.
    ///
    /// # Errors
    /// Propagates malformed-row, schema and I/O errors.
    pub fn per_dataset_average_accuracy(&self) -> Result<BTreeMap<String, f64>> {
        let datasets: Vec<DatasetRecord> = self.store.load_all_or_empty()?;
        let models: Vec<ModelRecord> = self.store.load_all_or_empty()?;
        let edges: Vec<EdgeRecord> = self.store.load_all_or_empty()?;
        Ok(per_dataset_average_accuracy(&datasets, &models, &edges))
    }

    /// See [`dataset_accuracy`]. Missing tables count as empty.
    ///
    /// # Errors
    /// Propagates malformed-row, schema and I/O errors.
    pub fn dataset_accuracy(&self) -> Result<Vec<DatasetAccuracy>> {
        let datasets: Vec<DatasetRecord> = self.store.load_all_or_empty()?;
        let models: Vec<ModelRecord> = self.store.load_all_or_empty()?;
        let edges: Vec<EdgeRecord> = self.store.load_all_or_empty()?;
        Ok(dataset_accuracy(&datasets, &models, &edges))
    }

    /// See [`top_models`]. An empty or uninitialized model table yields an
    /// empty result.
    ///
    /// # Errors
    /// Propagates malformed-row, schema and I/O errors.
    pub fn top_models(&self, n: usize) -> Result<Vec<ModelRecord>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let models: Vec<ModelRecord> = self.store.load_all_or_empty()?;
        Ok(top_models(&models, n))
    }
}
