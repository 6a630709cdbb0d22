//! Zip expansion shared by the filesystem and in-memory stores.

use crate::FilesError;
use std::io::{self, Read, Seek};
use std::path::PathBuf;

/// One entry of an archive, relative to the expansion directory.
///
/// File contents are streamed out of the archive as the sink reads them.
pub(crate) enum ArchiveEntry<'a> {
    Dir(PathBuf),
    File(PathBuf, &'a mut dyn Read),
}

/// Remembers the first failure of the decompressing side of a copy.
struct EntryReader<R> {
    inner: R,
    failure: Option<String>,
}

impl<R: Read> Read for EntryReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|e| {
            if self.failure.is_none() {
                self.failure = Some(e.to_string());
            }
            e
        })
    }
}

/// Hands every entry of a zip archive to `sink`.
///
/// A read failure while the sink drains an entry is reported as
/// [`FilesError::InvalidArchive`], whatever error the sink returned for it. Failures of the
/// sink's own writes are passed through. Entries whose names would escape the expansion
/// directory are skipped.
pub(crate) fn expand_zip<R, F>(reader: R, mut sink: F) -> Result<usize, FilesError>
where
    R: Read + Seek,
    F: FnMut(ArchiveEntry<'_>) -> Result<(), FilesError>,
{
    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| FilesError::InvalidArchive(e.to_string()))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| {
            FilesError::InvalidArchive(format!("cannot read entry {index}: {e}"))
        })?;

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };

        if entry.is_dir() {
            sink(ArchiveEntry::Dir(relative))?;
        } else {
            let mut contents = EntryReader {
                inner: entry,
                failure: None,
            };
            let outcome = sink(ArchiveEntry::File(relative.clone(), &mut contents));
            if let Some(reason) = contents.failure {
                return Err(FilesError::InvalidArchive(format!(
                    "cannot decompress entry {}: {reason}",
                    relative.display()
                )));
            }
            outcome?;
        }
        written += 1;
    }

    Ok(written)
}
