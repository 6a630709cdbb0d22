//! Metadata sidecar documents.
//!
//! A sidecar is written once, next to its artifact, and never updated. Absent form fields are
//! persisted as explicit `null`s rather than omitted, so every sidecar has the same shape.
//! Provenance (`project`, `version`) is derived from the directory a sidecar is found in and
//! is only attached when reading.

use serde::{Deserialize, Serialize};

/// Descriptive form fields supplied alongside an upload.
///
/// `name` doubles as the project name; see [`vault_types::ProjectName::from_form`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}

/// The persisted sidecar document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub filename: String,
}

impl MetadataRecord {
    pub fn from_fields(fields: MetadataFields, filename: impl Into<String>) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            source: fields.source,
            date: fields.date,
            status: fields.status,
            filename: filename.into(),
        }
    }

    /// Serialises the record as pretty JSON with four-space indentation.
    pub fn to_document(&self) -> serde_json::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(buffer)
    }
}

/// A sidecar as listed by the catalog, tagged with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub record: MetadataRecord,
    pub project: String,
    pub version: String,
}
