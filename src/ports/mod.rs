// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::config_initialization::ToolSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::planner::command::FfmpegCommand;

/// Port for the external command-line media tool
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// Locate the tool executable, if it is installed
    fn locate(&self) -> Option<PathBuf>;

    /// Run one command to completion. A non-zero exit is an error.
    async fn run(&self, stage: &str, command: &FfmpegCommand) -> Result<(), DomainError>;
}

/// Port for the in-process media library
#[async_trait]
pub trait MediaLibraryPort: Send + Sync {
    /// Open a source file. The handle is released when dropped.
    async fn open(&self, path: &Path) -> Result<Box<dyn MediaClip>, DomainError>;
}

/// An opened source owned by a single operation
pub trait MediaClip: Send {
    /// Total duration of the source
    fn duration(&self) -> TimeSpec;

    /// Current output dimensions
    fn size(&self) -> FrameSize;

    /// Capabilities used to pick a sub-range method
    fn capabilities(&self) -> MediaCapabilities;

    /// Restrict all further output to `range`
    fn subclip(&mut self, range: TimeRange, method: SubrangeMethod) -> Result<(), DomainError>;

    /// Scale all further output to `size`
    fn resize(&mut self, size: FrameSize) -> Result<(), DomainError>;

    /// Encode the current window as a video file
    fn write_videofile(
        &mut self,
        output: &Path,
        encoding: &ClipEncoding,
    ) -> Result<OutputReport, DomainError>;

    /// Encode the current window as an animated GIF
    fn write_gif(&mut self, output: &Path, fps: u32) -> Result<OutputReport, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Create a scratch directory removed when the guard drops
    async fn create_temp_dir(&self, prefix: &str) -> Result<TempDir, DomainError>;

    /// Size of a file in bytes
    async fn get_file_size(&self, file_path: &Path) -> Result<u64, DomainError>;
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Load configuration from file, layering it over the current values
    async fn load_config(&self, file_path: &Path) -> Result<(), DomainError>;

    /// Apply environment overrides
    async fn apply_environment(&self) -> Result<usize, DomainError>;

    /// Snapshot of the effective settings
    async fn settings(&self) -> ToolSettings;

    /// Validate configuration
    async fn validate_config(&self) -> Result<(), DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}
