//! In-process media backend using libav bindings
//!
//! Opens a source once, answers duration/size/capability queries from the
//! demuxer, and re-encodes the selected window either as an H.264/AAC clip
//! or as an animated GIF.

mod clip_writer;
mod gif_writer;
mod scaler;
pub mod timing;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ffmpeg_next::format::context::Input;
use ffmpeg_next::media;
use ffmpeg_next::Rational;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::ports::*;
use timing::{seconds_to_av_time, stream_origin, ts_to_seconds, DecodeWindow};

/// Media library adapter backed by libavformat/libavcodec
pub struct LibavMediaAdapter;

impl LibavMediaAdapter {
    pub fn new() -> Result<Self, DomainError> {
        ffmpeg_next::init().map_err(|e| {
            DomainError::BackendUnavailable(format!("FFmpeg initialization failed: {}", e))
        })?;
        ffmpeg_next::util::log::set_level(ffmpeg_next::util::log::Level::Error);
        Ok(Self)
    }
}

#[async_trait]
impl MediaLibraryPort for LibavMediaAdapter {
    async fn open(&self, path: &Path) -> Result<Box<dyn MediaClip>, DomainError> {
        let clip = LibavClip::open(path)?;
        Ok(Box::new(clip))
    }
}

/// An opened source. The demuxer is closed when the clip is dropped.
pub struct LibavClip {
    path: PathBuf,
    input: Input,
    video_index: usize,
    audio_index: Option<usize>,
    duration: TimeSpec,
    source_size: FrameSize,
    frame_rate: Rational,
    /// Stream clock value of media time zero
    origin: f64,
    capabilities: MediaCapabilities,
    target_size: Option<FrameSize>,
    window: Option<(TimeRange, SubrangeMethod)>,
    consumed: bool,
}

impl LibavClip {
    /// Open `path` and read the stream layout
    pub fn open(path: &Path) -> Result<Self, DomainError> {
        let mut input = ffmpeg_next::format::input(&path).map_err(|e| {
            DomainError::ProcessingError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let (video_index, source_size, frame_rate, stream_duration, origin, decodable) = {
            let stream = input.streams().best(media::Type::Video).ok_or_else(|| {
                DomainError::ProcessingError(format!("No video stream in {}", path.display()))
            })?;
            let parameters = stream.parameters();
            let decodable = ffmpeg_next::decoder::find(parameters.id()).is_some();
            let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)
                .and_then(|context| context.decoder().video())
                .map_err(|e| {
                    DomainError::ProcessingError(format!("Failed to read video parameters: {}", e))
                })?;
            let size = FrameSize::new(decoder.width(), decoder.height()).map_err(|_| {
                DomainError::ProcessingError("Video stream reports no dimensions".to_string())
            })?;
            let stream_duration = ts_to_seconds(stream.duration().max(0), stream.time_base());
            let origin = stream_origin(stream.start_time(), stream.time_base());
            (
                stream.index(),
                size,
                stream.avg_frame_rate(),
                stream_duration,
                origin,
                decodable,
            )
        };
        let audio_index = input
            .streams()
            .best(media::Type::Audio)
            .filter(|stream| ffmpeg_next::decoder::find(stream.parameters().id()).is_some())
            .map(|stream| stream.index());

        let container_duration = input.duration();
        let duration = if container_duration > 0 {
            container_duration as f64 / ffmpeg_next::ffi::AV_TIME_BASE as f64
        } else {
            stream_duration
        };

        let seekable = input.seek(0, ..1).is_ok();

        debug!(
            "Opened {}: {}s from {}s, {}, video stream {}, audio stream {:?}, seekable={}",
            path.display(),
            duration,
            origin,
            source_size,
            video_index,
            audio_index,
            seekable
        );

        Ok(Self {
            path: path.to_path_buf(),
            input,
            video_index,
            audio_index,
            duration: TimeSpec::from_seconds(duration),
            source_size,
            frame_rate,
            origin,
            capabilities: MediaCapabilities {
                seekable,
                decodable,
            },
            target_size: None,
            window: None,
            consumed: false,
        })
    }

    /// Output dimensions after any resize
    fn output_size(&self) -> FrameSize {
        self.target_size.unwrap_or(self.source_size)
    }

    /// Position the demuxer for a new export and return the window to keep,
    /// expressed on the stream clock
    fn prepare_read(&mut self) -> Result<DecodeWindow, DomainError> {
        let (window, method) = match self.window {
            Some((range, method)) => (
                DecodeWindow {
                    start: range.start.seconds,
                    end: range.end().seconds,
                },
                method,
            ),
            None => (DecodeWindow::unbounded(), SubrangeMethod::Decode),
        };
        let window = window.shifted(self.origin);

        let rewind = self.consumed || (method == SubrangeMethod::Seek && window.start > self.origin);
        if rewind {
            if !self.capabilities.seekable {
                return Err(DomainError::ProcessingError(format!(
                    "{} cannot be read twice: source is not seekable",
                    self.path.display()
                )));
            }
            let target = match method {
                SubrangeMethod::Seek => seconds_to_av_time(window.start),
                SubrangeMethod::Decode => 0,
            };
            self.input
                .seek(target, ..target)
                .map_err(|e| DomainError::ProcessingError(format!("Failed to seek: {}", e)))?;
        }
        self.consumed = true;

        Ok(window)
    }

    /// Source frame rate, or 30 fps when the container does not report one
    fn source_frame_rate(&self) -> Rational {
        if self.frame_rate.numerator() > 0 && self.frame_rate.denominator() > 0 {
            self.frame_rate
        } else {
            Rational::new(30, 1)
        }
    }
}

impl MediaClip for LibavClip {
    fn duration(&self) -> TimeSpec {
        self.duration
    }

    fn size(&self) -> FrameSize {
        self.output_size()
    }

    fn capabilities(&self) -> MediaCapabilities {
        self.capabilities
    }

    fn subclip(&mut self, range: TimeRange, method: SubrangeMethod) -> Result<(), DomainError> {
        if method == SubrangeMethod::Seek && !self.capabilities.seekable {
            return Err(DomainError::BackendUnavailable(format!(
                "{} does not support seeking",
                self.path.display()
            )));
        }
        if !self.capabilities.decodable {
            return Err(DomainError::BackendUnavailable(format!(
                "no decoder for the video stream of {}",
                self.path.display()
            )));
        }
        debug!("Restricting {} to {} via {:?}", self.path.display(), range, method);
        self.window = Some((range, method));
        Ok(())
    }

    fn resize(&mut self, size: FrameSize) -> Result<(), DomainError> {
        self.target_size = Some(size);
        Ok(())
    }

    fn write_videofile(
        &mut self,
        output: &Path,
        encoding: &ClipEncoding,
    ) -> Result<OutputReport, DomainError> {
        let window = self.prepare_read()?;
        let frame_rate = match encoding.fps {
            Some(fps) => Rational::new(fps as i32, 1),
            None => self.source_frame_rate(),
        };
        let job = clip_writer::ClipJob {
            video_index: self.video_index,
            audio_index: self.audio_index,
            size: self.output_size(),
            frame_rate,
            window,
            encoding,
        };
        clip_writer::write_clip(&mut self.input, output, &job)
    }

    fn write_gif(&mut self, output: &Path, fps: u32) -> Result<OutputReport, DomainError> {
        let window = self.prepare_read()?;
        let job = gif_writer::GifJob {
            video_index: self.video_index,
            size: self.output_size(),
            fps,
            window,
        };
        gif_writer::write_gif(&mut self.input, output, &job)
    }
}

impl Drop for LibavClip {
    fn drop(&mut self) {
        debug!("Releasing media handle for {}", self.path.display());
    }
}

/// Size of a finished output, or 0 when it cannot be read
pub(crate) fn output_file_size(path: &Path) -> u64 {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            warn!("Failed to read size of {}: {}", path.display(), e);
            0
        }
    }
}

/// Remove an output that received no frames and report why
pub(crate) fn discard_empty_output(path: &Path) -> DomainError {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove empty output {}: {}", path.display(), e);
    }
    DomainError::ProcessingError("no video frames fall inside the requested range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp4");
        std::fs::write(&path, b"ftyp").unwrap();

        let error = discard_empty_output(&path);

        assert!(!path.exists());
        assert!(matches!(error, DomainError::ProcessingError(_)));
    }

    #[test]
    fn test_output_file_size_of_missing_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(output_file_size(&dir.path().join("missing.gif")), 0);
    }
}
