//! The ingestion pipeline.
//!
//! An upload is validated step by step, short-circuiting on the first failure:
//!
//! 1. a file part is present
//! 2. its measured size is within the limit
//! 3. its extension is allowed (case-insensitive)
//! 4. its filename is non-empty
//! 5. project and filename are safe path segments
//!
//! Then, holding the project's lock, the next version is resolved, the duplicate guard is
//! consulted, the version directory is created and the artifact written, a zip artifact is
//! expanded, and finally the metadata sidecar is written.
//!
//! Nothing is rolled back. If expansion fails the artifact stays in its version directory
//! (without a sidecar) and the error says where it was kept.

use crate::config::CoreConfig;
use crate::constants::UPLOAD_SUCCESS_MESSAGE;
use crate::duplicates::DuplicateGuard;
use crate::error::{IngestError, IngestResult};
use crate::layout::{next_version, LayoutResolver};
use crate::locks::ProjectLocks;
use crate::metadata::{MetadataFields, MetadataRecord};
use std::io::{Read, Seek, SeekFrom};
use std::sync::{Arc, PoisonError};
use vault_files::{FilesError, VersionStore};
use vault_types::{extension_of, ArtifactName, ProjectName, VersionNumber};

/// A file part received from a client.
#[derive(Debug)]
pub struct UploadedFile<R> {
    /// Client-supplied filename, exactly as received
    pub filename: String,

    /// File contents, positioned anywhere
    pub content: R,
}

impl<R> UploadedFile<R> {
    pub fn new(filename: impl Into<String>, content: R) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReceipt {
    pub project: ProjectName,
    pub version: VersionNumber,
    pub artifact: ArtifactName,
    pub size_bytes: u64,
    /// Number of entries expanded, for zip artifacts
    pub expanded_entries: Option<usize>,
    pub message: String,
}

/// Measures a stream by seeking to its end, then rewinds it.
fn measure<R: Seek>(content: &mut R) -> IngestResult<u64> {
    let size = content.seek(SeekFrom::End(0))?;
    content.seek(SeekFrom::Start(0))?;
    Ok(size)
}

/// Orchestrates validation, versioning and persistence of uploads.
#[derive(Debug, Clone)]
pub struct IngestService {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn VersionStore>,
    layout: LayoutResolver,
    guard: DuplicateGuard,
    locks: Arc<ProjectLocks>,
}

impl IngestService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<dyn VersionStore>) -> Self {
        Self {
            cfg,
            layout: LayoutResolver::new(store.clone()),
            guard: DuplicateGuard::new(store.clone()),
            store,
            locks: Arc::new(ProjectLocks::new()),
        }
    }

    pub fn layout(&self) -> &LayoutResolver {
        &self.layout
    }

    /// Validates and stores one upload.
    ///
    /// # Errors
    ///
    /// Returns the first failing validation step as its [`IngestError`] variant,
    /// `DuplicateFile` if the filename exists in any version of the project,
    /// `InvalidArchive` if a zip artifact cannot be expanded (the artifact remains stored),
    /// and `Unexpected` for storage or serialisation failures.
    pub fn ingest<R: Read + Seek>(
        &self,
        file: Option<UploadedFile<R>>,
        fields: MetadataFields,
    ) -> IngestResult<IngestReceipt> {
        let Some(mut file) = file else {
            return Err(IngestError::MissingFile);
        };

        let size = measure(&mut file.content)?;
        if size > self.cfg.max_upload_bytes() {
            return Err(IngestError::FileTooLarge {
                size,
                limit: self.cfg.max_upload_bytes(),
            });
        }

        let extension = extension_of(&file.filename);
        if !self.cfg.allowed_extensions().contains(&extension.as_str()) {
            return Err(IngestError::UnsupportedType { extension });
        }

        if file.filename.is_empty() {
            return Err(IngestError::EmptyFilename);
        }

        let project = ProjectName::from_form(fields.name.as_deref())?;
        let artifact = ArtifactName::new(file.filename.as_str())?;

        tracing::info!(
            "upload received: project={} filename={} size={}",
            project,
            artifact,
            size
        );

        let lock = self.locks.for_project(&project);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let labels = self.layout.existing_versions(&project)?;
        let version = next_version(labels.iter().map(String::as_str));

        if let Some(existing) = self.guard.find_duplicate(&project, &labels, &artifact)? {
            tracing::warn!(
                "duplicate file '{}' already exists in {}/{}",
                artifact,
                project,
                existing
            );
            return Err(IngestError::DuplicateFile {
                filename: artifact.to_string(),
                version: existing,
            });
        }

        self.store.create_version(&project, version)?;
        let written = self
            .store
            .write_artifact(&project, version, &artifact, &mut file.content)?;
        tracing::info!("artifact saved: {}/{}/{}", project, version, artifact);

        let expanded_entries = if artifact.is_archive() {
            match self.store.expand_archive(&project, version, &artifact) {
                Ok(count) => {
                    tracing::info!(
                        "archive expanded: {}/{}/{} ({} entries)",
                        project,
                        version,
                        artifact.expansion_dir_name(),
                        count
                    );
                    Some(count)
                }
                Err(FilesError::InvalidArchive(reason)) => {
                    let stored_at = format!("{project}/{version}/{artifact}");
                    tracing::warn!("invalid zip archive kept at {}: {}", stored_at, reason);
                    return Err(IngestError::InvalidArchive { stored_at, reason });
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };

        let record = MetadataRecord::from_fields(fields, artifact.as_str());
        self.store
            .write_sidecar(&project, version, &artifact, &record.to_document()?)?;
        tracing::info!(
            "metadata saved: {}/{}/{}",
            project,
            version,
            artifact.sidecar_name()
        );

        Ok(IngestReceipt {
            project,
            version,
            artifact,
            size_bytes: written,
            expanded_entries,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestErrorKind;
    use std::io::{Cursor, Write};
    use std::path::PathBuf;
    use vault_files::MemoryStore;
    use zip::write::SimpleFileOptions;

    fn service_with_limit(store: &Arc<MemoryStore>, limit: u64) -> IngestService {
        let cfg = CoreConfig::new(PathBuf::from("uploads"), limit).unwrap();
        IngestService::new(Arc::new(cfg), store.clone())
    }

    fn service(store: &Arc<MemoryStore>) -> IngestService {
        service_with_limit(store, 1024)
    }

    fn upload(name: &str, bytes: &[u8]) -> Option<UploadedFile<Cursor<Vec<u8>>>> {
        Some(UploadedFile::new(name, Cursor::new(bytes.to_vec())))
    }

    fn project_fields(name: &str) -> MetadataFields {
        MetadataFields {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_first_upload_is_version_one() {
        let store = Arc::new(MemoryStore::new());
        let receipt = service(&store)
            .ingest(upload("robin.png", b"img"), project_fields("birds"))
            .unwrap();

        assert_eq!(receipt.version, VersionNumber::FIRST);
        assert_eq!(receipt.size_bytes, 3);
        assert_eq!(receipt.message, "File and metadata uploaded successfully");
        assert_eq!(store.file("birds/v1/robin.png"), Some(b"img".to_vec()));
        assert!(store.file("birds/v1/robin_meta.json").is_some());
    }

    #[test]
    fn test_versions_increment_past_gaps() {
        let store = Arc::new(MemoryStore::new());
        store.insert_dir("birds/v1");
        store.insert_dir("birds/v3");

        let receipt = service(&store)
            .ingest(upload("robin.png", b"img"), project_fields("birds"))
            .unwrap();

        assert_eq!(receipt.version, VersionNumber::new(4));
        assert!(store.file("birds/v4/robin.png").is_some());
    }

    #[test]
    fn test_default_project_when_name_missing_or_empty() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        let first = svc
            .ingest(upload("a.png", b"a"), MetadataFields::default())
            .unwrap();
        let second = svc.ingest(upload("b.png", b"b"), project_fields("")).unwrap();

        assert_eq!(first.project.as_str(), "default");
        assert_eq!(second.project.as_str(), "default");
        assert_eq!(second.version, VersionNumber::new(2));
    }

    #[test]
    fn test_missing_file() {
        let store = Arc::new(MemoryStore::new());
        let err = service(&store)
            .ingest::<Cursor<Vec<u8>>>(None, project_fields("birds"))
            .unwrap_err();

        assert_eq!(err.kind(), IngestErrorKind::MissingFile);
        assert!(!store.has_dir("birds"));
    }

    #[test]
    fn test_oversized_file_rejected_before_any_directory() {
        let store = Arc::new(MemoryStore::new());
        let err = service_with_limit(&store, 4)
            .ingest(upload("robin.png", b"12345"), project_fields("birds"))
            .unwrap_err();

        assert!(matches!(err, IngestError::FileTooLarge { size: 5, limit: 4 }));
        assert!(!store.has_dir("birds"));
    }

    #[test]
    fn test_size_exactly_at_limit_is_accepted() {
        let store = Arc::new(MemoryStore::new());
        let receipt = service_with_limit(&store, 4)
            .ingest(upload("robin.png", b"1234"), project_fields("birds"))
            .unwrap();

        assert_eq!(receipt.size_bytes, 4);
    }

    #[test]
    fn test_size_is_measured_from_the_start() {
        let store = Arc::new(MemoryStore::new());
        let mut content = Cursor::new(b"abcdef".to_vec());
        content.set_position(4);

        let receipt = service(&store)
            .ingest(
                Some(UploadedFile::new("robin.png", content)),
                project_fields("birds"),
            )
            .unwrap();

        assert_eq!(receipt.size_bytes, 6);
        assert_eq!(store.file("birds/v1/robin.png"), Some(b"abcdef".to_vec()));
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        assert!(svc
            .ingest(upload("PHOTO.JPG", b"x"), project_fields("p"))
            .is_ok());
        let err = svc
            .ingest(upload("anim.gif", b"x"), project_fields("p"))
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedType { ref extension } if extension == ".gif"));
        assert_eq!(err.to_string(), "Unsupported file type: .gif");
    }

    #[test]
    fn test_empty_filename_fails_extension_check_first() {
        let store = Arc::new(MemoryStore::new());
        let err = service(&store)
            .ingest(upload("", b"x"), project_fields("p"))
            .unwrap_err();

        assert_eq!(err.kind(), IngestErrorKind::UnsupportedType);
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        let err = svc
            .ingest(upload("../escape.png", b"x"), project_fields("p"))
            .unwrap_err();
        assert_eq!(err.kind(), IngestErrorKind::InvalidName);

        let err = svc
            .ingest(upload("fine.png", b"x"), project_fields("../../etc"))
            .unwrap_err();
        assert_eq!(err.kind(), IngestErrorKind::InvalidName);
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_in_any_earlier_version_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        svc.ingest(upload("robin.png", b"1"), project_fields("birds"))
            .unwrap();
        svc.ingest(upload("wren.png", b"2"), project_fields("birds"))
            .unwrap();

        let err = svc
            .ingest(upload("robin.png", b"3"), project_fields("birds"))
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::DuplicateFile { ref version, .. } if version == "v1"
        ));
        assert!(!store.has_dir("birds/v3"));
    }

    #[test]
    fn test_same_filename_in_other_project_is_fine() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        svc.ingest(upload("robin.png", b"1"), project_fields("birds"))
            .unwrap();

        let receipt = svc
            .ingest(upload("robin.png", b"1"), project_fields("garden"))
            .unwrap();

        assert_eq!(receipt.version, VersionNumber::FIRST);
    }

    #[test]
    fn test_zip_is_stored_and_expanded() {
        let store = Arc::new(MemoryStore::new());
        let bytes = zip_bytes(&[("one.png", b"1"), ("sub/two.png", b"2")]);

        let receipt = service(&store)
            .ingest(upload("Batch.ZIP", &bytes), project_fields("birds"))
            .unwrap();

        assert_eq!(receipt.expanded_entries, Some(2));
        assert!(store.file("birds/v1/Batch.ZIP").is_some());
        assert_eq!(store.file("birds/v1/Batch/sub/two.png"), Some(b"2".to_vec()));
        assert!(store.file("birds/v1/Batch_meta.json").is_some());
    }

    #[test]
    fn test_corrupt_zip_keeps_artifact_without_sidecar() {
        let store = Arc::new(MemoryStore::new());
        let err = service(&store)
            .ingest(upload("broken.zip", b"not a zip"), project_fields("birds"))
            .unwrap_err();

        assert_eq!(err.kind(), IngestErrorKind::InvalidArchive);
        assert!(err.to_string().contains("birds/v1/broken.zip"));
        assert_eq!(store.file("birds/v1/broken.zip"), Some(b"not a zip".to_vec()));
        assert!(!store.has_dir("birds/v1/broken"));
        assert!(store.file("birds/v1/broken_meta.json").is_none());
    }

    #[test]
    fn test_sidecar_contents() {
        let store = Arc::new(MemoryStore::new());
        let fields = MetadataFields {
            name: Some("birds".into()),
            description: Some("a robin".into()),
            source: None,
            date: Some("2024-05-01".into()),
            status: Some("raw".into()),
        };

        service(&store)
            .ingest(upload("robin.png", b"img"), fields)
            .unwrap();

        let sidecar = store.file("birds/v1/robin_meta.json").unwrap();
        let record: MetadataRecord = serde_json::from_slice(&sidecar).unwrap();
        assert_eq!(
            record,
            MetadataRecord {
                name: Some("birds".into()),
                description: Some("a robin".into()),
                source: None,
                date: Some("2024-05-01".into()),
                status: Some("raw".into()),
                filename: "robin.png".into(),
            }
        );
    }

    #[test]
    fn test_concurrent_uploads_get_distinct_versions() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = svc.clone();
                std::thread::spawn(move || {
                    svc.ingest(
                        upload(&format!("img{i}.png"), b"x"),
                        project_fields("race"),
                    )
                    .unwrap()
                    .version
                })
            })
            .collect();

        let mut versions: Vec<u64> = handles
            .into_iter()
            .map(|h| h.join().unwrap().get())
            .collect();
        versions.sort_unstable();

        assert_eq!(versions, (1..=8).collect::<Vec<_>>());
    }
}
