//! Dataset metadata export (schema.org JSON-LD)
//!
//! Produces one standalone document per dataset file, independent of the
//! provenance tables. The dataset is identified by its content hash and the
//! document is named `<export-id>_metadata.json`.
//!
//! ```text
//! {
//!     "@context": "https://schema.org/",
//!     "@type": "Dataset",
//!     "identifier": "<sha256>",
//!     ...
//!     "license": { "@type": "CreativeWork", "name": ..., "url": ... },
//!     "sourceFile": "<path>"
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ids, Error, Result};

/// Licenses accepted by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum License {
    /// Creative Commons Attribution
    CcBy,
    /// Creative Commons Attribution-ShareAlike
    CcBySa,
    /// MIT License
    Mit,
    /// GNU General Public License v3.0
    Gpl3,
    /// Apache License 2.0
    Apache2,
}

impl License {
    /// Every accepted license, in menu order.
    pub const ALL: [Self; 5] = [Self::CcBy, Self::CcBySa, Self::Mit, Self::Gpl3, Self::Apache2];

    /// Short key, e.g. `"GPL-3.0"`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CcBy => "CC-BY",
            Self::CcBySa => "CC-BY-SA",
            Self::Mit => "MIT",
            Self::Gpl3 => "GPL-3.0",
            Self::Apache2 => "Apache-2.0",
        }
    }

    /// Full license name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CcBy => "Creative Commons Attribution",
            Self::CcBySa => "Creative Commons Attribution-ShareAlike",
            Self::Mit => "MIT License",
            Self::Gpl3 => "GNU General Public License v3.0",
            Self::Apache2 => "Apache License 2.0",
        }
    }

    /// Reference URL for the license.
    #[must_use]
    pub fn url(self) -> String {
        format!("https://opensource.org/licenses/{}", self.key())
    }

    /// Ask for a license key until a valid one is read from `input`.
    ///
    /// The menu, the prompt and each rejection are written to `output`.
    ///
    /// # Errors
    /// Returns `Error::Io` on read or write failure, and
    /// `Error::InvalidInput` if `input` ends before a valid key is entered.
    pub fn prompt<R: BufRead, W: Write>(input: R, mut output: W) -> Result<Self> {
        writeln!(output, "Available Licenses:")?;
        for license in Self::ALL {
            writeln!(output, "- {}: {}", license.key(), license.name())?;
        }

        let mut lines = input.lines();
        loop {
            write!(output, "Choose a license (e.g., CC-BY, MIT, GPL-3.0): ")?;
            output.flush()?;
            let Some(line) = lines.next() else {
                return Err(Error::InvalidInput("no license chosen (input closed)".into()));
            };
            match line?.parse::<Self>() {
                Ok(license) => return Ok(license),
                Err(e) => writeln!(output, "❌ Error: {e}")?,
            }
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for License {
    type Err = Error;

    /// Exact key match (surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|license| license.key() == key)
            .ok_or_else(|| Error::InvalidLicense(key.to_string()))
    }
}

/// `license` object inside the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// Always `"CreativeWork"`
    #[serde(rename = "@type")]
    pub kind: String,
    /// Full license name
    pub name: String,
    /// License URL
    pub url: String,
}

impl From<License> for LicenseInfo {
    fn from(license: License) -> Self {
        Self {
            kind: "CreativeWork".to_string(),
            name: license.name().to_string(),
            url: license.url(),
        }
    }
}

/// schema.org `Dataset` description of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    /// Always `"https://schema.org/"`
    #[serde(rename = "@context")]
    pub context: String,
    /// Always `"Dataset"`
    #[serde(rename = "@type")]
    pub kind: String,
    /// Content hash of the source file
    pub identifier: String,
    /// Dataset title
    pub name: String,
    /// Author name
    pub author: String,
    /// RFC 3339 UTC creation instant
    pub date_created: String,
    /// Free-text description
    pub description: String,
    /// License block
    pub license: LicenseInfo,
    /// Path of the described file, as given
    pub source_file: String,
}

impl DatasetMetadata {
    /// Describe the file at `dataset_path`, hashing its contents.
    ///
    /// # Errors
    /// - `Error::InvalidLicense` if `license_key` is not an accepted key
    /// - `Error::Io` if the file cannot be read
    pub fn describe<P: AsRef<Path>>(
        dataset_path: P,
        title: &str,
        author: &str,
        description: &str,
        license_key: &str,
    ) -> Result<Self> {
        // License first: a bad key must not cost a full file hash.
        let license: License = license_key.parse()?;
        let path = dataset_path.as_ref();
        let identifier = ids::dataset_id_for_file(path)?;

        Ok(Self {
            context: "https://schema.org/".to_string(),
            kind: "Dataset".to_string(),
            identifier,
            name: title.to_string(),
            author: author.to_string(),
            date_created: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            description: description.to_string(),
            license: license.into(),
            source_file: path.display().to_string(),
        })
    }

    /// Serialize with 4-space indentation.
    ///
    /// # Errors
    /// Returns `Error::Json` if serialization fails.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}

/// Writes metadata documents into an output directory.
#[derive(Debug, Clone)]
pub struct MetadataExporter {
    output_dir: PathBuf,
}

impl MetadataExporter {
    /// Exporter writing into `output_dir` (created on first export).
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Describe `dataset_path` and write `<export-id>_metadata.json`.
    ///
    /// Returns the path of the written document.
    ///
    /// # Errors
    /// - `Error::InvalidLicense` for an unknown license key (nothing written)
    /// - `Error::Io` / `Error::Json` on read or write failure
    pub fn export<P: AsRef<Path>>(
        &self,
        dataset_path: P,
        title: &str,
        author: &str,
        description: &str,
        license_key: &str,
    ) -> Result<PathBuf> {
        let metadata =
            DatasetMetadata::describe(dataset_path, title, author, description, license_key)?;
        self.write(&metadata)
    }

    /// Write an already built document under a fresh export id.
    ///
    /// # Errors
    /// Returns `Error::Io` or `Error::Json` on failure.
    pub fn write(&self, metadata: &DatasetMetadata) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("{}_metadata.json", ids::new_export_id()));

        let json = metadata.to_pretty_json()?;
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(&json)?;
        writer.flush()?;

        info!(path = %path.display(), identifier = %metadata.identifier, "exported dataset metadata");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_parse() {
        assert_eq!("MIT".parse::<License>().unwrap(), License::Mit);
        assert_eq!(" GPL-3.0 ".parse::<License>().unwrap(), License::Gpl3);
        assert!(matches!(
            "CC BY 4.0".parse::<License>(),
            Err(Error::InvalidLicense(key)) if key == "CC BY 4.0"
        ));
        assert!("mit".parse::<License>().is_err());
    }

    #[test]
    fn test_license_prompt_retries_until_valid() {
        let mut output = Vec::new();
        let license = License::prompt(&b"CC BY 4.0\n\nGPL-3.0\n"[..], &mut output).unwrap();
        assert_eq!(license, License::Gpl3);

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Available Licenses:\n- CC-BY: Creative Commons Attribution\n"));
        assert_eq!(output.matches("Choose a license").count(), 3);
        assert_eq!(output.matches("Invalid license key").count(), 2);
    }

    #[test]
    fn test_license_prompt_input_closed() {
        let err = License::prompt(&b"bogus\n"[..], Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_license_url() {
        assert_eq!(License::Apache2.url(), "https://opensource.org/licenses/Apache-2.0");
        assert_eq!(License::CcBySa.name(), "Creative Commons Attribution-ShareAlike");
    }

    #[test]
    fn test_metadata_field_names() {
        let metadata = DatasetMetadata {
            context: "https://schema.org/".to_string(),
            kind: "Dataset".to_string(),
            identifier: "abc".to_string(),
            name: "MNIST".to_string(),
            author: "LeCun".to_string(),
            date_created: "2024-01-01T00:00:00Z".to_string(),
            description: "digits".to_string(),
            license: License::Mit.into(),
            source_file: "mnist.csv".to_string(),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        for expected in [
            "@context",
            "@type",
            "identifier",
            "name",
            "author",
            "dateCreated",
            "description",
            "license",
            "sourceFile",
        ] {
            assert!(keys.iter().any(|k| k.as_str() == expected), "missing {expected}");
        }
        assert_eq!(value["license"]["@type"], "CreativeWork");
        assert_eq!(value["license"]["name"], "MIT License");
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let metadata = DatasetMetadata {
            context: "https://schema.org/".to_string(),
            kind: "Dataset".to_string(),
            identifier: "abc".to_string(),
            name: "n".to_string(),
            author: "a".to_string(),
            date_created: "2024-01-01T00:00:00Z".to_string(),
            description: "d".to_string(),
            license: License::CcBy.into(),
            source_file: "f".to_string(),
        };
        let json = String::from_utf8(metadata.to_pretty_json().unwrap()).unwrap();
        assert!(json.starts_with("{\n    \"@context\": \"https://schema.org/\""));
    }
}
