//! # provenance-db: Dataset/Model Provenance Store
//!
//! **Version**: 0.1.0
//!
//! provenance-db records machine-learning datasets, the models trained on
//! them, and the typed edges linking the two, in three append-only CSV
//! tables. Summary statistics (per-dataset average accuracy, top models)
//! and a lineage graph are derived from those tables on demand.
//!
//! ## Design Principles
//!
//! - **Append-only**: rows are written once and never updated or deleted
//! - **Producer-side keys**: dataset ids are content hashes, model ids are
//!   random tokens; the store itself never checks uniqueness
//! - **Edges are authoritative**: lineage is read from `edges.csv` only
//! - **Fail fast on bad data**: one malformed row fails the whole load
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use provenance_db::record::{DatasetRecord, EdgeRecord, ModelRecord};
//! use provenance_db::stats::StatisticsEngine;
//! use provenance_db::{ProvenanceStore, StoreConfig};
//!
//! let store = ProvenanceStore::new(StoreConfig::new("database"));
//! store.ensure_all_initialized()?;
//!
//! store.append(&DatasetRecord::new("d1", "MNIST", "LeCun", "MIT"))?;
//! store.append(
//!     &ModelRecord::builder("m1", "Net1")
//!         .params("LR=0.01")
//!         .accuracy(0.88)
//!         .timestamp("2024-01-01T00:00:00")
//!         .build(),
//! )?;
//! store.append(&EdgeRecord::trained_on("d1", "m1"))?;
//!
//! let engine = StatisticsEngine::new(&store);
//! assert_eq!(engine.per_dataset_average_accuracy()?["MNIST"], 0.88);
//! assert_eq!(engine.top_models(1)?[0].model_id(), "m1");
//! # Ok::<(), provenance_db::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod ids;
pub mod record;
pub mod simulate;
pub mod stats;
pub mod storage;
pub mod topk;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use graph::ProvenanceGraph;
pub use record::{ModelSchema, TableKind};
pub use stats::StatisticsEngine;
pub use storage::ProvenanceStore;
