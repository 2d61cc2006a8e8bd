//! Store configuration
//!
//! Table locations are explicit configuration, never process globals, so
//! each store (and each test) can point at its own directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::record::{ModelSchema, TableKind};
use crate::Result;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "PROVENANCE_DATA_DIR";

/// Environment variable selecting the model table schema.
pub const MODEL_SCHEMA_ENV: &str = "PROVENANCE_MODEL_SCHEMA";

/// Data directory used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "database";

/// Configuration for a `ProvenanceStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_dir: PathBuf,
    model_schema: ModelSchema,
}

impl StoreConfig {
    /// Configuration rooted at `data_dir` with the default model schema.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_schema: ModelSchema::default(),
        }
    }

    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Read `PROVENANCE_DATA_DIR` and `PROVENANCE_MODEL_SCHEMA`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the schema variable is set to an
    /// unknown value.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            builder = builder.data_dir(dir);
        }
        if let Ok(schema) = env::var(MODEL_SCHEMA_ENV) {
            builder = builder.model_schema(schema.parse()?);
        }
        Ok(builder.build())
    }

    /// Base directory for all three tables.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Meaning of the fourth model column.
    #[must_use]
    pub const fn model_schema(&self) -> ModelSchema {
        self.model_schema
    }

    /// Location of the backing file for `kind`.
    #[must_use]
    pub fn table_path(&self, kind: TableKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

/// Builder for `StoreConfig`
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    data_dir: Option<PathBuf>,
    model_schema: ModelSchema,
}

impl StoreConfigBuilder {
    /// Set the data directory
    #[must_use]
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Set the model table schema
    #[must_use]
    pub const fn model_schema(mut self, schema: ModelSchema) -> Self {
        self.model_schema = schema;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            data_dir: self
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            model_schema: self.model_schema,
        }
    }
}
