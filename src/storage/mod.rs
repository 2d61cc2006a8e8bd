//! Storage backend (CSV tables)
//!
//! **Append-Only Write Pattern**:
//! - Three tables (`datasets.csv`, `models.csv`, `edges.csv`), each with a
//!   fixed header row
//! - The only mutation is "append one row"; no update, no delete
//! - Row order on disk is insertion order
//!
//! Every call opens its file, does its I/O and drops the handle before
//! returning. Nothing is cached between calls, so edits made by another
//! process show up on the next load.
//!
//! Each row is encoded into a buffer first and written with a single
//! `write_all`, so a crash never leaves a row with fewer fields than the
//! header. There is no atomicity *across* rows: see
//! [`ProvenanceStore::record_training`].

use crate::config::StoreConfig;
use crate::ids;
use crate::record::{
    display_names, validate_fields, DatasetRecord, EdgeRecord, ModelRecord, ModelSchema, Record, TableKind,
};
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Append-only provenance store backed by three CSV files.
///
/// # Example
///
/// ```rust,no_run
/// use provenance_db::record::{DatasetRecord, EdgeRecord, ModelRecord};
/// use provenance_db::storage::ProvenanceStore;
/// use provenance_db::StoreConfig;
///
/// let store = ProvenanceStore::new(StoreConfig::new("database"));
/// store.ensure_all_initialized()?;
///
/// store.append(&DatasetRecord::new("d1", "MNIST", "LeCun", "MIT"))?;
/// let model = ModelRecord::builder("m1", "Net1").params("LR=0.01").accuracy(0.88).build();
/// store.record_training(&model, &["d1"], "trained_on")?;
///
/// let models: Vec<ModelRecord> = store.load_all()?;
/// assert_eq!(models.last().map(ModelRecord::model_id), Some("m1"));
/// # Ok::<(), provenance_db::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProvenanceStore {
    config: StoreConfig,
}

impl ProvenanceStore {
    /// Create a store over the tables described by `config`.
    ///
    /// No I/O happens until the first operation.
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store rooted at `data_dir` with the default model schema.
    #[must_use]
    pub fn open<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self::new(StoreConfig::new(data_dir))
    }

    /// Get the store configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Model schema this store reads and writes.
    #[must_use]
    pub const fn model_schema(&self) -> ModelSchema {
        self.config.model_schema()
    }

    /// Location of the backing file for `kind`.
    #[must_use]
    pub fn table_path(&self, kind: TableKind) -> PathBuf {
        self.config.table_path(kind)
    }

    /// Whether the backing file for `kind` exists.
    #[must_use]
    pub fn is_initialized(&self, kind: TableKind) -> bool {
        self.table_path(kind).is_file()
    }

    /// Create the table file with its header row if it does not exist yet.
    ///
    /// Idempotent: an existing file is left untouched.
    ///
    /// # Errors
    /// Returns `Error::Io` if the directory or file cannot be created.
    pub fn ensure_initialized(&self, kind: TableKind) -> Result<()> {
        let path = self.table_path(kind);
        if path.is_file() {
            return Ok(());
        }
        fs::create_dir_all(self.config.data_dir())?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let header = encode_row(kind.header(self.model_schema()))?;
        file.write_all(&header)?;
        file.sync_data()?;

        info!(table = kind.name(), path = %path.display(), "initialized table");
        Ok(())
    }

    /// Initialize all three tables.
    ///
    /// # Errors
    /// Returns `Error::Io` if any table cannot be created.
    pub fn ensure_all_initialized(&self) -> Result<()> {
        for kind in TableKind::ALL {
            self.ensure_initialized(kind)?;
        }
        Ok(())
    }

    /// Append one typed record to its table.
    ///
    /// Initializes the table first if needed.
    ///
    /// # Errors
    /// - `Error::SchemaMismatch` if a model record's variant, or the header
    ///   on disk, does not match the configured schema
    /// - `Error::MalformedRow` if the record would not load back (e.g. an
    ///   accuracy outside `[0, 1]`)
    /// - `Error::Io` on write failure
    pub fn append<R: Record>(&self, record: &R) -> Result<()> {
        if let Some(variant) = record.schema_variant() {
            let expected = self.model_schema();
            if variant != expected {
                return Err(Error::SchemaMismatch {
                    table: R::KIND.name(),
                    expected: R::KIND.header(expected).join(","),
                    found: R::KIND.header(variant).join(","),
                });
            }
        }
        self.append_row(R::KIND, &record.to_fields())
    }

    /// Append one raw row (fields in header column order).
    ///
    /// The row is validated exactly as `load_all` would parse it, so nothing
    /// unloadable is ever written.
    ///
    /// # Errors
    /// Same as [`ProvenanceStore::append`].
    pub fn append_row<S: AsRef<str>>(&self, kind: TableKind, fields: &[S]) -> Result<()> {
        let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        validate_fields(kind, &fields, self.model_schema()).map_err(|reason| {
            Error::MalformedRow {
                table: kind.name(),
                line: 0,
                reason,
            }
        })?;

        self.ensure_initialized(kind)?;
        let path = self.table_path(kind);
        self.check_header(kind, &path)?;

        let mut file = OpenOptions::new().read(true).append(true).open(&path)?;
        let mut row = Vec::new();
        if !ends_with_newline(&mut file)? {
            // A torn or hand-edited last line must not absorb this row.
            row.push(b'\n');
        }
        row.extend_from_slice(&encode_row(&fields)?);
        file.write_all(&row)?;

        debug!(table = kind.name(), bytes = row.len(), "appended row");
        Ok(())
    }

    /// Load every row of `kind` as raw fields, header skipped.
    ///
    /// Rows are validated exactly as [`ProvenanceStore::load_all`] parses
    /// them, so a non-numeric accuracy fails this call too.
    ///
    /// # Errors
    /// - `Error::TableNotFound` if the table was never initialized
    /// - `Error::SchemaMismatch` if the header does not match
    /// - `Error::MalformedRow` if any row has the wrong number of fields or
    ///   an unparseable value
    pub fn load_rows(&self, kind: TableKind) -> Result<Vec<Vec<String>>> {
        Ok(self
            .read_table(kind)?
            .into_iter()
            .map(|(_, record)| record.iter().map(str::to_string).collect())
            .collect())
    }

    /// Load every row of `R`'s table, in insertion order.
    ///
    /// Fails the whole call on the first bad row rather than skipping it.
    ///
    /// # Errors
    /// Same as [`ProvenanceStore::load_rows`], plus `Error::MalformedRow`
    /// for unparseable values such as a non-numeric accuracy.
    pub fn load_all<R: Record>(&self) -> Result<Vec<R>> {
        let schema = self.model_schema();
        let rows = self.read_table(R::KIND)?;
        let mut records = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            let fields: Vec<&str> = row.iter().collect();
            let record = R::from_fields(&fields, schema).map_err(|reason| Error::MalformedRow {
                table: R::KIND.name(),
                line,
                reason,
            })?;
            records.push(record);
        }
        debug!(table = R::KIND.name(), rows = records.len(), "loaded table");
        Ok(records)
    }

    /// Like [`ProvenanceStore::load_all`], but a missing table is empty.
    ///
    /// # Errors
    /// Every error except `Error::TableNotFound`.
    pub fn load_all_or_empty<R: Record>(&self) -> Result<Vec<R>> {
        match self.load_all() {
            Err(Error::TableNotFound { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Display names for `dataset_ids`, falling back to the id when no
    /// dataset row matches. A missing dataset table resolves every id to
    /// itself.
    ///
    /// # Errors
    /// Any load error other than `Error::TableNotFound`.
    pub fn dataset_names<S: AsRef<str>>(&self, dataset_ids: &[S]) -> Result<Vec<String>> {
        let datasets: Vec<DatasetRecord> = self.load_all_or_empty()?;
        Ok(display_names(&datasets, dataset_ids))
    }

    /// Record a training event: one model row, then one edge per dataset.
    ///
    /// The appends are independent. If the process dies after the model row
    /// is written, the model is left without edges; readers tolerate this
    /// (statistics skip it, the graph shows an isolated node).
    ///
    /// # Errors
    /// Propagates the first failing append; earlier rows stay written.
    pub fn record_training<S: AsRef<str>>(
        &self,
        model: &ModelRecord,
        dataset_ids: &[S],
        relationship: &str,
    ) -> Result<()> {
        self.append(model)?;
        for dataset_id in dataset_ids {
            self.append(&EdgeRecord::new(
                dataset_id.as_ref(),
                model.model_id(),
                relationship,
            ))?;
        }
        debug!(
            model_id = model.model_id(),
            edges = dataset_ids.len(),
            "recorded training event"
        );
        Ok(())
    }

    /// Register a dataset file under its content hash.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, or any append error.
    pub fn register_dataset_file<P: AsRef<Path>>(
        &self,
        path: P,
        name: &str,
        creator: &str,
        license: &str,
    ) -> Result<DatasetRecord> {
        let dataset_id = ids::dataset_id_for_file(path.as_ref())?;
        let record = DatasetRecord::new(dataset_id, name, creator, license);
        self.append(&record)?;
        Ok(record)
    }

    /// Read a table into `(line, record)` pairs, header validated and skipped.
    ///
    /// Every row is checked for width and parseable values; the first bad
    /// row fails the whole read.
    fn read_table(&self, kind: TableKind) -> Result<Vec<(u64, StringRecord)>> {
        let path = self.table_path(kind);
        let mut reader = open_reader(kind, &path)?;
        let mut records = reader.records();

        let header = match records.next() {
            Some(header) => header?,
            None => {
                return Err(Error::MalformedRow {
                    table: kind.name(),
                    line: 1,
                    reason: "missing header row".to_string(),
                })
            }
        };
        self.verify_header(kind, &header)?;

        let schema = self.model_schema();
        let mut rows = Vec::new();
        for result in records {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);
            {
                let fields: Vec<&str> = record.iter().collect();
                validate_fields(kind, &fields, schema).map_err(|reason| Error::MalformedRow {
                    table: kind.name(),
                    line,
                    reason,
                })?;
            }
            rows.push((line, record));
        }
        Ok(rows)
    }

    fn check_header(&self, kind: TableKind, path: &Path) -> Result<()> {
        let mut reader = open_reader(kind, path)?;
        match reader.records().next() {
            Some(header) => self.verify_header(kind, &header?),
            None => Err(Error::MalformedRow {
                table: kind.name(),
                line: 1,
                reason: "missing header row".to_string(),
            }),
        }
    }

    fn verify_header(&self, kind: TableKind, header: &StringRecord) -> Result<()> {
        let found: Vec<&str> = header.iter().collect();
        let schema = self.model_schema();
        if kind.accepts_header(schema, &found) {
            Ok(())
        } else {
            Err(Error::SchemaMismatch {
                table: kind.name(),
                expected: kind.header(schema).join(","),
                found: found.join(","),
            })
        }
    }
}

fn open_reader(kind: TableKind, path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::TableNotFound {
                table: kind.name(),
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file)))
}

/// Whether the file is empty or its last byte is a line feed.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Encode one CSV row (with terminator) into an owned buffer.
fn encode_row<S: AsRef<[u8]>>(fields: &[S]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        writer.write_record(fields)?;
        writer.flush()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, ProvenanceStore) {
        let dir = TempDir::new().unwrap();
        let store = ProvenanceStore::open(dir.path().join("db"));
        (dir, store)
    }

    #[test]
    fn test_encode_row_quotes_commas() {
        let row = encode_row(&["m1", "Net", "LR=0.01, Epochs=10"]).unwrap();
        assert_eq!(row, b"m1,Net,\"LR=0.01, Epochs=10\"\n");
    }

    #[test]
    fn test_ensure_initialized_writes_header() {
        let (_dir, store) = temp_store();
        store.ensure_initialized(TableKind::Dataset).unwrap();
        let content = fs::read_to_string(store.table_path(TableKind::Dataset)).unwrap();
        assert_eq!(content, "dataset_id,name,creator,license\n");
    }

    #[test]
    fn test_load_missing_table() {
        let (_dir, store) = temp_store();
        let err = store.load_rows(TableKind::Edge).unwrap_err();
        assert!(matches!(err, Error::TableNotFound { table: "edges", .. }));
    }

    #[test]
    fn test_append_initializes_table() {
        let (_dir, store) = temp_store();
        store.append_row(TableKind::Edge, &["d1", "m1", "trained_on"]).unwrap();
        let rows = store.load_rows(TableKind::Edge).unwrap();
        assert_eq!(rows, vec![vec!["d1", "m1", "trained_on"]]);
    }

    #[test]
    fn test_append_row_wrong_width_writes_nothing() {
        let (_dir, store) = temp_store();
        store.ensure_initialized(TableKind::Edge).unwrap();
        let err = store.append_row(TableKind::Edge, &["d1", "m1"]).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { .. }));
        assert!(store.load_rows(TableKind::Edge).unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_is_malformed() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.config().data_dir()).unwrap();
        fs::write(store.table_path(TableKind::Dataset), "").unwrap();
        let err = store.load_rows(TableKind::Dataset).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn test_ends_with_newline() {
        let (dir, _store) = temp_store();
        let path = dir.path().join("t.csv");
        for (content, expected) in [("", true), ("a,b\n", true), ("a,b", false)] {
            fs::write(&path, content).unwrap();
            let mut file = File::open(&path).unwrap();
            assert_eq!(ends_with_newline(&mut file).unwrap(), expected, "{content:?}");
        }
    }
}
