// GIF interactor - Drives the converter state machine across both backends

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::config_initialization::ToolSettings;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::{SnipkitError, SnipkitResult};
use crate::planner::palette::{PaletteJob, PaletteOptions, PalettePipeline};
use crate::ports::*;

/// Default GIF frame rate
pub const DEFAULT_GIF_FPS: u32 = 15;

const PALETTE_FILE: &str = "palette.png";

/// Interactor for the GIF conversion use case
pub struct GifInteractor {
    tool_port: Arc<dyn MediaToolPort>,
    media_port: Arc<dyn MediaLibraryPort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
    settings: ToolSettings,
}

impl GifInteractor {
    /// Create new GIF interactor with injected ports
    pub fn new(
        tool_port: Arc<dyn MediaToolPort>,
        media_port: Arc<dyn MediaLibraryPort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
        settings: ToolSettings,
    ) -> Self {
        Self {
            tool_port,
            media_port,
            fs_port,
            log_port,
            settings,
        }
    }

    /// Convert `request.input` to an animated GIF
    pub async fn execute(&self, request: ConversionRequest) -> SnipkitResult<ConversionReport> {
        let started = Instant::now();
        let mut state = ConverterState::Start;
        let mut program: Option<PathBuf> = None;
        let mut primary_failure: Option<String> = None;
        let mut fallback_failure: Option<DomainError> = None;
        let mut backend = GifBackend::ExternalTool;
        let mut frames_written = None;

        loop {
            state = match state {
                ConverterState::Start => ConverterState::CheckToolAvailable,
                ConverterState::CheckToolAvailable => {
                    if request.force_fallback {
                        self.log_port
                            .info("External tool disabled by --force-fallback")
                            .await;
                        primary_failure = Some("skipped by --force-fallback".to_string());
                    } else {
                        program = self.tool_port.locate();
                        match &program {
                            Some(path) => {
                                self.log_port
                                    .info(&format!("Using ffmpeg at {}", path.display()))
                                    .await
                            }
                            None => {
                                let missing = DomainError::ToolNotFound(
                                    self.settings.ffmpeg_program.display().to_string(),
                                );
                                self.log_port
                                    .warn(&format!("{}; using the media library", missing))
                                    .await;
                                primary_failure = Some(missing.to_string());
                            }
                        }
                    }
                    BackendSelector::after_tool_check(program.is_some(), request.force_fallback)
                }
                ConverterState::RunPrimary => {
                    let outcome = match &program {
                        Some(path) => self.run_primary(&request, path).await,
                        None => Err(DomainError::ToolNotFound(
                            self.settings.ffmpeg_program.display().to_string(),
                        )),
                    };
                    if let Err(e) = &outcome {
                        if !e.is_recoverable_by_fallback() {
                            self.log_port
                                .error(&format!("Palette pipeline could not start: {}", e))
                                .await;
                        }
                        primary_failure = Some(e.to_string());
                    }
                    BackendSelector::after_primary(&outcome)
                }
                ConverterState::PrimaryFailed => {
                    self.log_port
                        .warn(&format!(
                            "ffmpeg pipeline failed ({}); falling back to the media library",
                            primary_failure.as_deref().unwrap_or("unknown error")
                        ))
                        .await;
                    ConverterState::RunFallback
                }
                ConverterState::RunFallback => {
                    backend = GifBackend::Library;
                    let outcome = self.run_fallback(&request).await;
                    let next = BackendSelector::after_fallback(&outcome);
                    match outcome {
                        Ok(report) => frames_written = Some(report.frames_written),
                        Err(e) => fallback_failure = Some(e),
                    }
                    next
                }
                ConverterState::Done => break,
                ConverterState::Fatal => {
                    let fallback = fallback_failure.unwrap_or_else(|| {
                        DomainError::ProcessingError("media library produced no output".to_string())
                    });
                    self.log_port
                        .error(&format!("Media library fallback failed: {}", fallback))
                        .await;
                    return Err(SnipkitError::FallbackFailed {
                        primary: primary_failure.unwrap_or_else(|| "not run".to_string()),
                        fallback,
                    });
                }
            };
        }

        self.log_port
            .info(&format!("GIF created at {}", request.output.display()))
            .await;

        let file_size = self.fs_port.get_file_size(&request.output).await.ok();
        Ok(ConversionReport {
            input: request.input,
            output: request.output,
            backend,
            fell_back: backend == GifBackend::Library,
            size: request.size,
            fps: request.fps,
            window: request.window,
            frames_written,
            file_size,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Two-pass palette pipeline through the external tool
    async fn run_primary(&self, request: &ConversionRequest, program: &Path) -> Result<(), DomainError> {
        let scratch = self.fs_port.create_temp_dir("snipkit-palette-").await?;
        let palette = scratch.path().join(PALETTE_FILE);

        let job = PaletteJob {
            input: &request.input,
            output: &request.output,
            size: request.size,
            window: request.window,
            fps: request.fps,
        };
        let options = PaletteOptions {
            program,
            log_level: &self.settings.ffmpeg_log_level,
            dither: &self.settings.dither,
        };
        let pipeline = PalettePipeline::plan(&job, &options, &palette);

        for (stage, command) in pipeline.stages() {
            self.log_port
                .debug(&format!("Running {}: {}", stage, command))
                .await;
            self.tool_port.run(stage, command).await?;
        }
        Ok(())
    }

    /// In-process conversion through the media library
    async fn run_fallback(&self, request: &ConversionRequest) -> Result<OutputReport, DomainError> {
        self.log_port
            .info(&format!("Loading {}", request.input.display()))
            .await;
        let mut clip = self.media_port.open(&request.input).await?;

        if let Some(range) = request.window.resolve(clip.duration()) {
            let clamped = RangeClamper::clamp(&range, clip.duration())?;
            if clamped.truncated {
                self.log_port
                    .warn(&format!(
                        "Requested end {} is beyond the media duration {}",
                        range.end(),
                        clip.duration()
                    ))
                    .await;
            }
            let method = SubrangeMethod::detect(&clip.capabilities())?;
            clip.subclip(clamped.range, method)?;
        }

        if needs_resize(clip.size(), request.size) {
            self.log_port
                .debug(&format!("Resizing {} to {}", clip.size(), request.size))
                .await;
            clip.resize(request.size)?;
        }

        self.log_port
            .info(&format!("Writing {} at {} fps", request.output.display(), request.fps))
            .await;
        clip.write_gif(&request.output, request.fps)
    }
}

/// Request for GIF conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub size: FrameSize,
    pub window: SeekWindow,
    pub fps: u32,
    /// Skip the external tool entirely
    pub force_fallback: bool,
}

impl ConversionRequest {
    /// Request at 1280x720, 15 fps, untrimmed
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            size: FrameSize::default(),
            window: SeekWindow::default(),
            fps: DEFAULT_GIF_FPS,
            force_fallback: false,
        }
    }
}

/// Result of a finished conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backend: GifBackend,
    pub fell_back: bool,
    pub size: FrameSize,
    pub fps: u32,
    pub window: SeekWindow,
    /// Only known when the media library wrote the file
    pub frames_written: Option<u64>,
    pub file_size: Option<u64>,
    pub elapsed_seconds: f64,
}
