//! Identifier generation for datasets, models and exported documents
//!
//! - Datasets are content-addressed: the id is the lowercase hex SHA-256 of
//!   the full file contents, so re-registering an unchanged file yields the
//!   same key.
//! - Models get a short random token (8 hex chars = 32 bits by default).
//!   Collisions are not detected.
//! - Exported metadata documents are named with a full v4 UUID.

use crate::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use uuid::Uuid;

/// Default model token length in hex characters (32 bits of entropy)
pub const DEFAULT_MODEL_ID_LEN: usize = 8;

/// Longest model token available from a single UUID
pub const MAX_MODEL_ID_LEN: usize = 32;

/// Content-derived dataset identifier.
///
/// # Errors
/// Returns `Error::Io` if the file cannot be opened or read.
///
/// # Examples
///
/// ```rust,no_run
/// let id = provenance_db::ids::dataset_id_for_file("data/mnist.csv")?;
/// assert_eq!(id.len(), 64);
/// # Ok::<(), provenance_db::Error>(())
/// ```
pub fn dataset_id_for_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path.as_ref())?;
    dataset_id_for_reader(file)
}

/// Hash everything readable from `reader` into a dataset identifier.
///
/// # Errors
/// Returns `Error::Io` if reading fails part way through.
pub fn dataset_id_for_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Random model token with the default length.
#[must_use]
pub fn new_model_id() -> String {
    new_model_id_with_len(DEFAULT_MODEL_ID_LEN)
}

/// Random model token of `len` lowercase hex characters.
///
/// `len` is clamped to `DEFAULT_MODEL_ID_LEN..=MAX_MODEL_ID_LEN` so a token
/// never carries fewer than 32 bits.
#[must_use]
pub fn new_model_id_with_len(len: usize) -> String {
    let len = len.clamp(DEFAULT_MODEL_ID_LEN, MAX_MODEL_ID_LEN);
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(len);
    token
}

/// Globally unique name for an exported metadata document.
#[must_use]
pub fn new_export_id() -> String {
    Uuid::new_v4().to_string()
}
