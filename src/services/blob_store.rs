use std::path::{Path, PathBuf};

/// Filesystem-backed storage for uploaded and processed images.
///
/// Uploads are written under the client-supplied filename; a repeated
/// filename overwrites the previous upload (last write wins, no dedup).
/// Filenames are used as given, so callers on untrusted input inherit a
/// path-traversal exposure; the service runs on trusted input by contract.
pub struct BlobStore {
    upload_dir: PathBuf,
    processed_dir: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at the two directories, creating them if absent.
    pub async fn new(
        upload_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let upload_dir = upload_dir.into();
        let processed_dir = processed_dir.into();

        tokio::fs::create_dir_all(&upload_dir)
            .await
            .map_err(|e| StorageError::Bootstrap(upload_dir.display().to_string(), e))?;
        tokio::fs::create_dir_all(&processed_dir)
            .await
            .map_err(|e| StorageError::Bootstrap(processed_dir.display().to_string(), e))?;

        Ok(Self { upload_dir, processed_dir })
    }

    /// Persist uploaded bytes under the given filename, returning the path.
    pub async fn save_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.upload_dir.join(filename);
        tokio::fs::write(&path, data).await.map_err(StorageError::Io)?;
        Ok(path)
    }

    /// Output path for a given input: `<processed_dir>/<basename(input)>`.
    /// `None` when the input path has no final component.
    pub fn processed_path(&self, input_path: &Path) -> Option<PathBuf> {
        crate::models::job::processed_path(&self.processed_dir, input_path)
    }

    /// Whether a stored file currently exists and is a regular file.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create storage directory {0}: {1}")]
    Bootstrap(String, #[source] std::io::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}
