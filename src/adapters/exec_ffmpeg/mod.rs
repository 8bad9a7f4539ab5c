//! External ffmpeg execution adapter
//!
//! Runs planned commands as child processes. The tool's own diagnostics go
//! straight to our stderr; stdout is discarded so reports stay clean.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::planner::command::FfmpegCommand;
use crate::ports::*;

/// Subprocess-based adapter for the ffmpeg command-line tool
pub struct FfmpegCliAdapter {
    program: PathBuf,
}

impl FfmpegCliAdapter {
    /// Create an adapter for the given executable name or path
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl MediaToolPort for FfmpegCliAdapter {
    fn locate(&self) -> Option<PathBuf> {
        match which::which(&self.program) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("{} not found: {}", self.program.display(), e);
                None
            }
        }
    }

    async fn run(&self, stage: &str, command: &FfmpegCommand) -> Result<(), DomainError> {
        info!("Running {}: {}", stage, command);

        let status = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                DomainError::ToolNotFound(format!("{}: {}", command.program().display(), e))
            })?;

        if status.success() {
            debug!("{} finished", stage);
            Ok(())
        } else {
            Err(DomainError::ToolFailed {
                stage: stage.to_string(),
                status: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_missing_program() {
        let adapter = FfmpegCliAdapter::new("snipkit-definitely-not-installed-tool");
        assert!(adapter.locate().is_none());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_recoverable() {
        let adapter = FfmpegCliAdapter::new("snipkit-definitely-not-installed-tool");
        let command = FfmpegCommand::new("snipkit-definitely-not-installed-tool").input("in.mp4");
        let error = adapter.run("palettegen", &command).await.unwrap_err();
        assert!(error.is_recoverable_by_fallback());
    }
}
