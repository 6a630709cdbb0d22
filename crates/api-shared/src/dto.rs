//! JSON bodies exchanged over the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Human-readable confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Multipart form accepted by `POST /upload`.
///
/// Only used to document the request in the OpenAPI schema; the handler reads the parts
/// directly from the multipart stream.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// The artifact (.jpg, .jpeg, .png, .bmp or .zip)
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Project name; defaults to "default"
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}

/// One stored metadata record with its provenance.
///
/// Absent descriptive fields are `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DatasetRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub filename: String,
    /// Project directory the record was found in
    pub project: String,
    /// Version directory the record was found in, e.g. `v3`
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_record_keeps_nulls() {
        let record = DatasetRecord {
            name: None,
            description: None,
            source: Some("field camera".into()),
            date: None,
            status: None,
            filename: "robin.png".into(),
            project: "default".into(),
            version: "v1".into(),
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], serde_json::Value::Null);
        assert_eq!(json["source"], "field camera");
        assert_eq!(json["version"], "v1");
    }
}
