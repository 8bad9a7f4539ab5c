// Local filesystem adapter - File system operations through std::fs

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::domain::errors::*;
use crate::ports::*;

/// Local filesystem adapter
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    /// Create new filesystem adapter
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        Ok(file_path.is_file())
    }

    async fn create_temp_dir(&self, prefix: &str) -> Result<TempDir, DomainError> {
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|e| DomainError::FsFail(format!("Failed to create temp directory: {}", e)))
    }

    async fn get_file_size(&self, file_path: &Path) -> Result<u64, DomainError> {
        let metadata = fs::metadata(file_path)
            .map_err(|e| DomainError::FsFail(format!("Failed to get file size: {}", e)))?;
        Ok(metadata.len())
    }
}
