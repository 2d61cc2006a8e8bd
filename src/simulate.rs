//! Random training-run simulation for demos
//!
//! Generates synthetic models, each trained on one randomly chosen existing
//! dataset, and records them through the normal append path:
//!
//! - name `Model_NNNN` (1000..=9999)
//! - params `LR=0.xxx, Epochs=N` (LR in [0.001, 0.1), 5..=50 epochs)
//! - accuracy in [0.70, 0.99), rounded to 3 decimals
//! - one `trained_on` edge from the dataset to the model

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::ids;
use crate::record::{DatasetRecord, ModelRecord, ModelSchema, TRAINED_ON};
use crate::stats::round_to;
use crate::storage::ProvenanceStore;
use crate::{Error, Result};

/// Number of models generated when no count is given.
pub const DEFAULT_MODEL_COUNT: usize = 10;

/// Synthetic model generator bound to a store.
#[derive(Debug)]
pub struct Simulator<'a> {
    store: &'a ProvenanceStore,
    rng: StdRng,
}

impl<'a> Simulator<'a> {
    /// Simulator seeded from OS entropy.
    #[must_use]
    pub fn new(store: &'a ProvenanceStore) -> Self {
        Self {
            store,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic simulator (same seed, same names/params/accuracies).
    #[must_use]
    pub fn with_seed(store: &'a ProvenanceStore, seed: u64) -> Self {
        Self {
            store,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate and record `count` models.
    ///
    /// Returns the models in the order they were written.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if the store uses the provenance schema or
    ///   has no datasets
    /// - any append error
    pub fn run(&mut self, count: usize) -> Result<Vec<ModelRecord>> {
        if self.store.model_schema() != ModelSchema::Statistics {
            return Err(Error::InvalidInput(
                "simulation records accuracies and needs the statistics model schema".to_string(),
            ));
        }
        let datasets: Vec<DatasetRecord> = self.store.load_all_or_empty()?;
        if datasets.is_empty() {
            return Err(Error::InvalidInput(
                "no datasets available; add datasets before simulating".to_string(),
            ));
        }

        let mut models = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(dataset) = datasets.choose(&mut self.rng) else {
                break;
            };
            let model = self.generate_model();
            self.store
                .record_training(&model, &[dataset.dataset_id()], TRAINED_ON)?;
            models.push(model);
        }

        info!(models = models.len(), datasets = datasets.len(), "simulation complete");
        Ok(models)
    }

    fn generate_model(&mut self) -> ModelRecord {
        let name = format!("Model_{}", self.rng.gen_range(1000..=9999));
        let params = format!(
            "LR={:.3}, Epochs={}",
            self.rng.gen_range(0.001..0.1),
            self.rng.gen_range(5..=50)
        );
        let accuracy = round_to(self.rng.gen_range(0.70..0.99), 3);
        ModelRecord::builder(ids::new_model_id(), name)
            .params(params)
            .accuracy(accuracy)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EdgeRecord;
    use crate::StoreConfig;
    use tempfile::TempDir;

    #[test]
    fn test_simulation_requires_datasets() {
        let dir = TempDir::new().unwrap();
        let store = ProvenanceStore::open(dir.path());
        let err = Simulator::with_seed(&store, 7).run(3).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_simulation_rejects_provenance_schema() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::builder()
            .data_dir(dir.path())
            .model_schema(ModelSchema::Provenance)
            .build();
        let store = ProvenanceStore::new(config);
        assert!(Simulator::new(&store).run(1).is_err());
    }

    #[test]
    fn test_simulation_writes_models_and_edges() {
        let dir = TempDir::new().unwrap();
        let store = ProvenanceStore::open(dir.path());
        store
            .append(&DatasetRecord::new("d1", "MNIST", "LeCun", "MIT"))
            .unwrap();

        let models = Simulator::with_seed(&store, 42).run(5).unwrap();
        assert_eq!(models.len(), 5);
        for model in &models {
            let accuracy = model.accuracy().unwrap();
            assert!((0.70..=0.99).contains(&accuracy));
            assert!(model.name().starts_with("Model_"));
            assert!(model.params().starts_with("LR="));
        }

        let edges: Vec<EdgeRecord> = store.load_all().unwrap();
        assert_eq!(edges.len(), 5);
        assert!(edges.iter().all(|e| e.start_node() == "d1" && e.is_training_link()));
    }
}
