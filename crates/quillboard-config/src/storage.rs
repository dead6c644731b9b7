use std::env;
use std::path::PathBuf;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory uploaded files are written to.
    pub dir: PathBuf,
    /// Public URL prefix the directory is served under.
    pub base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("storage/app/public"),
            base_url: "http://localhost:3000/storage".to_string(),
            max_upload_bytes: 2 * 1024 * 1024,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dir: env::var("STORAGE_DIR").map(PathBuf::from).unwrap_or(defaults.dir),
            base_url: env::var("STORAGE_BASE_URL").unwrap_or(defaults.base_url),
            max_upload_bytes: env_or("UPLOAD_MAX_BYTES", defaults.max_upload_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_uploads_to_two_megabytes() {
        assert_eq!(StorageConfig::default().max_upload_bytes, 2_097_152);
    }
}
