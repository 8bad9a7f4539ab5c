// Clip interactor - Orchestrates the clip extraction use case

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::config_initialization::ToolSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Default clip length in seconds
pub const DEFAULT_CLIP_DURATION: f64 = 7.0;

/// Interactor for the clip extraction use case
pub struct ClipInteractor {
    media_port: Arc<dyn MediaLibraryPort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
    settings: ToolSettings,
}

impl ClipInteractor {
    /// Create new clip interactor with injected ports
    pub fn new(
        media_port: Arc<dyn MediaLibraryPort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
        settings: ToolSettings,
    ) -> Self {
        Self {
            media_port,
            fs_port,
            log_port,
            settings,
        }
    }

    /// Extract the requested sub-clip
    pub async fn execute(&self, request: ClipRequest) -> Result<ClipReport, DomainError> {
        let started = Instant::now();

        if !self.fs_port.file_exists(&request.input).await? {
            return Err(DomainError::FileNotFound(request.input.display().to_string()));
        }

        self.log_port
            .info(&format!("Loading {}", request.input.display()))
            .await;

        // Handle lives until the end of this scope on every path
        let mut clip = self.media_port.open(&request.input).await?;
        let source_duration = clip.duration();

        let requested = TimeRange::new(
            TimeSpec::from_seconds(request.start),
            TimeSpec::from_seconds(request.duration),
        );
        let clamped = RangeClamper::clamp(&requested, source_duration)?;
        if clamped.truncated {
            self.log_port
                .warn(&format!(
                    "Requested end {} is beyond the media duration {}; clip shortened to {}",
                    requested.end(),
                    source_duration,
                    clamped.range.duration
                ))
                .await;
        }
        let range = clamped.range;

        let method = SubrangeMethod::detect(&clip.capabilities())?;
        self.log_port
            .debug(&format!("Sub-range method: {:?}", method))
            .await;
        clip.subclip(range, method)?;

        let output = match request.output {
            Some(path) => path,
            None => OutputNaming::default_clip_path(&request.input, &range)?,
        };

        self.log_port
            .info(&format!(
                "Extracting {} -> {} ({})",
                range.start,
                range.end(),
                range.duration
            ))
            .await;
        self.log_port
            .info(&format!("Writing {}", output.display()))
            .await;

        let encoding = self.settings.clip_encoding(request.fps);
        let written = clip.write_videofile(&output, &encoding)?;
        drop(clip);

        self.log_port
            .info(&format!("Done: {}", output.display()))
            .await;

        Ok(ClipReport {
            input: request.input,
            output,
            range,
            truncated: clamped.truncated,
            method,
            frames_written: written.frames_written,
            file_size: written.file_size,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// Request for clip extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    pub input: PathBuf,
    /// Start in seconds; negative values are treated as 0
    pub start: f64,
    /// Length in seconds; negative values are treated as 0
    pub duration: f64,
    pub output: Option<PathBuf>,
    pub fps: Option<u32>,
}

impl ClipRequest {
    /// Request with the default start and duration
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            start: 0.0,
            duration: DEFAULT_CLIP_DURATION,
            output: None,
            fps: None,
        }
    }
}

/// Result of a finished extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub range: TimeRange,
    /// The requested end was reduced to the media duration
    pub truncated: bool,
    pub method: SubrangeMethod,
    pub frames_written: u64,
    pub file_size: u64,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = ClipRequest::new("clip.mp4");
        assert_eq!(request.start, 0.0);
        assert_eq!(request.duration, 7.0);
        assert!(request.output.is_none());
        assert!(request.fps.is_none());
    }
}
