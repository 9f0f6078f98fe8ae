use crate::cases::{CaseFile, FileCategory};
use crate::error::IngestError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Handle to a locally previewable copy of an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef {
    id: u64,
    source: String,
}

#[cfg(test)]
impl PreviewRef {
    /// Where the preview was taken from (path or in-memory label)
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashSet<u64>,
}

/// Allocates preview handles and tracks which are still live.
///
/// Cloning shares the same registry, so worker threads can allocate while
/// the case store releases.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn allocate(&self, source: impl Into<String>) -> PreviewRef {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id);
        PreviewRef {
            id,
            source: source.into(),
        }
    }

    /// Releases a handle. Returns false if it was not live.
    pub fn release(&self, preview: &PreviewRef) -> bool {
        let released = self.lock().live.remove(&preview.id);
        if released {
            debug!(preview = preview.id, source = %preview.source, "preview released");
        } else {
            warn!(preview = preview.id, "release of unknown preview handle ignored");
        }
        released
    }

    #[cfg(test)]
    pub fn is_live(&self, preview: &PreviewRef) -> bool {
        self.lock().live.contains(&preview.id)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }
}

/// Reads and encodes one file from disk
pub fn ingest_file(path: &Path, previews: &PreviewRegistry) -> Result<CaseFile, IngestError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| IngestError::NoFileName(path.to_path_buf()))?;

    let bytes = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    debug!(file = %name, mime = %mime_type, size = bytes.len(), "ingested file");

    Ok(build_case_file(
        name,
        mime_type,
        &bytes,
        previews.allocate(path.display().to_string()),
    ))
}

/// Wraps bytes already in memory (e.g. a voice recording)
pub fn ingest_bytes(
    name: &str,
    mime_type: &str,
    bytes: &[u8],
    previews: &PreviewRegistry,
) -> CaseFile {
    build_case_file(
        name.to_string(),
        mime_type.to_string(),
        bytes,
        previews.allocate(format!("memory:{}", name)),
    )
}

/// Ingests a batch of files. All succeed or none are returned; previews of
/// files read before a failure are released.
pub fn ingest_batch(
    paths: &[PathBuf],
    previews: &PreviewRegistry,
) -> Result<Vec<CaseFile>, IngestError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match ingest_file(path, previews) {
            Ok(file) => files.push(file),
            Err(error) => {
                warn!(path = %path.display(), %error, "dropping attachment batch");
                for file in &files {
                    previews.release(&file.preview);
                }
                return Err(error);
            }
        }
    }
    Ok(files)
}

fn build_case_file(name: String, mime_type: String, bytes: &[u8], preview: PreviewRef) -> CaseFile {
    CaseFile {
        name,
        category: FileCategory::from_mime(&mime_type),
        mime_type,
        size_bytes: bytes.len() as u64,
        preview,
        encoded_content: STANDARD.encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_ingest_file_encodes_and_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.pdf", b"%PDF-1.4");
        let previews = PreviewRegistry::new();

        let file = ingest_file(&path, &previews).unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.category, FileCategory::Pdf);
        assert_eq!(file.size_bytes, 8);
        assert_eq!(file.encoded_content, STANDARD.encode(b"%PDF-1.4"));
        assert!(previews.is_live(&file.preview));
    }

    #[test]
    fn test_ingest_file_unknown_extension_is_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blob.zzqx", b"\x00\x01");
        let file = ingest_file(&path, &PreviewRegistry::new()).unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
        assert_eq!(file.category, FileCategory::Other);
    }

    #[test]
    fn test_ingest_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let previews = PreviewRegistry::new();
        let result = ingest_file(&dir.path().join("nope.png"), &previews);
        assert!(matches!(result, Err(IngestError::Read { .. })));
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_batch_with_one_failure_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(&dir, "a.png", b"png");
        let third = write_file(&dir, "c.txt", b"text");
        let missing = dir.path().join("b.mp3");
        let previews = PreviewRegistry::new();

        let result = ingest_batch(&[first, missing, third], &previews);
        assert!(result.is_err());
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_batch_success_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_file(&dir, "one.png", b"1"),
            write_file(&dir, "two.wav", b"22"),
        ];
        let previews = PreviewRegistry::new();
        let files = ingest_batch(&paths, &previews).unwrap();
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["one.png", "two.wav"]);
        assert_eq!(files[1].category, FileCategory::Audio);
        assert_eq!(previews.live_count(), 2);
    }

    #[test]
    fn test_ingest_bytes() {
        let previews = PreviewRegistry::new();
        let file = ingest_bytes("voice-input.wav", "audio/wav", b"RIFF", &previews);
        assert_eq!(file.category, FileCategory::Audio);
        assert_eq!(file.size_bytes, 4);
        assert_eq!(file.preview.source(), "memory:voice-input.wav");
    }

    #[test]
    fn test_release_is_exactly_once() {
        let previews = PreviewRegistry::new();
        let handle = previews.allocate("x");
        assert!(previews.release(&handle));
        assert!(!previews.release(&handle));
        assert_eq!(previews.live_count(), 0);
    }
}
