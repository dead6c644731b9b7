//! File storage abstraction layer.
//!
//! Uploaded images are written through the [`FileStorage`] trait so the
//! backend can change without touching the blog service. Records keep only the
//! storage key; the public URL is derived on read.
//!
//! # Example
//!
//! ```ignore
//! use quillboard_core::file_storage::{FileStorage, LocalFileStorage};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(
//!     PathBuf::from("storage/app/public"),
//!     "http://localhost:3000/storage".to_string(),
//! );
//!
//! let key = storage.save("blogs/5f1c.png", &bytes).await?;
//! let url = storage.get_url(&key)?;
//! storage.delete(&key).await?;
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;
use tokio::fs;

/// Image types accepted for upload.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Upload ceiling (2 MB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Abstract trait for file storage backends.
pub trait FileStorage: Send + Sync {
    /// Save file content under `key` and return the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Delete a file by key. A missing file is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Public URL for a stored key.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;

    /// Largest accepted upload in bytes.
    fn max_file_size(&self) -> usize {
        DEFAULT_MAX_FILE_SIZE
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    InvalidFileSize { max_bytes: usize },

    #[error("MIME type '{received}' not allowed. Allowed types: {}", .allowed.join(", "))]
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    /// Errors caused by the upload itself rather than the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Checks an upload against the MIME allow-list and the size ceiling.
pub fn validate_upload(content_type: &str, len: usize, max_bytes: usize) -> Result<(), StorageError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err(StorageError::InvalidMimeType {
            received: mime,
            allowed: ALLOWED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
        });
    }

    if len > max_bytes {
        return Err(StorageError::InvalidFileSize { max_bytes });
    }

    Ok(())
}

/// File extension to store an accepted image type under.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type.split(';').next().unwrap_or_default().trim() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Local filesystem-based file storage implementation.
#[derive(Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    /// Validate storage key format to prevent path traversal.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    fn max_file_size(&self) -> usize {
        self.max_file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (LocalFileStorage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("quillboard-storage-{}", uuid::Uuid::new_v4()));
        let storage = LocalFileStorage::new(dir.clone(), "http://localhost:3000/storage".into());
        (storage, dir)
    }

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert!(LocalFileStorage::validate_key("blogs/cover.png").is_ok());
        assert!(LocalFileStorage::validate_key("blogs/abc-123.jpg").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("").is_err());
    }

    #[test]
    fn test_get_url_handles_trailing_slash() {
        let storage = LocalFileStorage::new(
            PathBuf::from("./uploads"),
            "http://localhost:3000/storage/".to_string(),
        );
        let url = storage.get_url("blogs/cover.png").unwrap();
        assert_eq!(url, "http://localhost:3000/storage/blogs/cover.png");
    }

    #[test]
    fn test_validate_upload_allow_list() {
        for mime in ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"] {
            assert!(validate_upload(mime, 10, DEFAULT_MAX_FILE_SIZE).is_ok(), "{mime}");
        }
        let err = validate_upload("application/pdf", 10, DEFAULT_MAX_FILE_SIZE).unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validate_upload_size() {
        assert!(validate_upload("image/png", DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILE_SIZE).is_ok());
        let err = validate_upload("image/png", DEFAULT_MAX_FILE_SIZE + 1, DEFAULT_MAX_FILE_SIZE)
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileSize { .. }));
    }

    #[test]
    fn test_validate_upload_ignores_parameters() {
        assert!(validate_upload("IMAGE/PNG; charset=binary", 1, 10).is_ok());
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/webp"), "webp");
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let (storage, dir) = temp_storage();
        let key = storage.save("blogs/a.png", b"png-bytes").await.unwrap();
        assert!(dir.join(&key).exists());

        storage.delete(&key).await.unwrap();
        assert!(!dir.join(&key).exists());

        // deleting again is not an error
        storage.delete(&key).await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_save_rejects_oversized() {
        let dir = std::env::temp_dir().join("quillboard-storage-oversized");
        let storage = LocalFileStorage::with_max_size(dir, "http://x".into(), 4);
        let err = storage.save("blogs/big.png", b"12345").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileSize { max_bytes: 4 }));
    }
}
