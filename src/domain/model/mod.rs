// Domain models - Core types and data structures

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::domain::errors::DomainError;

/// Time specification - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Zero seconds
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Clamp negative (and NaN) values to zero
    pub fn non_negative(self) -> Self {
        if self.seconds > 0.0 {
            self
        } else {
            Self::zero()
        }
    }

    /// Whole seconds, truncated toward zero
    pub fn whole_seconds(&self) -> i64 {
        self.seconds.trunc() as i64
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// A `(start, duration)` window in seconds. Both parts are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: TimeSpec,
    pub duration: TimeSpec,
}

impl TimeRange {
    /// Create a range, treating negative inputs as zero
    pub fn new(start: TimeSpec, duration: TimeSpec) -> Self {
        Self {
            start: start.non_negative(),
            duration: duration.non_negative(),
        }
    }

    /// Create a range from start and end points
    pub fn between(start: TimeSpec, end: TimeSpec) -> Self {
        let start = start.non_negative();
        Self::new(start, TimeSpec::from_seconds(end.seconds - start.seconds))
    }

    pub fn end(&self) -> TimeSpec {
        TimeSpec::from_seconds(self.start.seconds + self.duration.seconds)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}s -> {:.2}s ({:.2}s)",
            self.start.seconds,
            self.end().seconds,
            self.duration.seconds
        )
    }
}

/// Optional trim for the GIF converter. No trimming when both parts are absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeekWindow {
    pub start: Option<TimeSpec>,
    pub duration: Option<TimeSpec>,
}

impl SeekWindow {
    pub fn new(start: Option<f64>, duration: Option<f64>) -> Self {
        Self {
            start: start.map(|s| TimeSpec::from_seconds(s).non_negative()),
            duration: duration.map(|d| TimeSpec::from_seconds(d).non_negative()),
        }
    }

    /// Whether the window leaves the source untrimmed
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.duration.is_none()
    }

    /// Resolve the window against a source duration
    pub fn resolve(&self, source_duration: TimeSpec) -> Option<TimeRange> {
        if self.is_unbounded() {
            return None;
        }
        let start = self.start.unwrap_or_else(TimeSpec::zero);
        let duration = self.duration.unwrap_or_else(|| {
            TimeSpec::from_seconds(source_duration.seconds - start.seconds).non_negative()
        });
        Some(TimeRange::new(start, duration))
    }
}

/// Output frame dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Create a frame size; both dimensions must be positive
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::BadArgs(
                "Frame dimensions must be positive".to_string(),
            ));
        }
        Ok(Self { width, height })
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Capabilities an opened media handle reports about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaCapabilities {
    /// The container accepts timestamp seeks
    pub seekable: bool,
    /// A decoder exists for the primary video stream
    pub decodable: bool,
}

/// How a media handle restricts itself to a sub-range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubrangeMethod {
    /// Seek the demuxer near the start, then decode and drop up to it
    Seek,
    /// Decode from the beginning and drop everything before the start
    Decode,
}

impl SubrangeMethod {
    /// Pick the sub-range method once per opened handle
    pub fn detect(capabilities: &MediaCapabilities) -> Result<Self, DomainError> {
        match (capabilities.decodable, capabilities.seekable) {
            (true, true) => Ok(SubrangeMethod::Seek),
            (true, false) => Ok(SubrangeMethod::Decode),
            (false, _) => Err(DomainError::BackendUnavailable(
                "media library exposes no sub-range operation for this source".to_string(),
            )),
        }
    }
}

/// Fixed encoding parameters for extracted clips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipEncoding {
    pub video_codec: String,
    pub audio_codec: String,
    pub threads: usize,
    /// Output frame rate; `None` keeps the source rate
    pub fps: Option<u32>,
}

impl Default for ClipEncoding {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            threads: 4,
            fps: None,
        }
    }
}

/// Which GIF backend produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GifBackend {
    /// External command-line tool with the two-pass palette pipeline
    ExternalTool,
    /// In-process media library
    Library,
}

impl fmt::Display for GifBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GifBackend::ExternalTool => write!(f, "external tool"),
            GifBackend::Library => write!(f, "media library"),
        }
    }
}

/// States of the GIF converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterState {
    Start,
    CheckToolAvailable,
    RunPrimary,
    PrimaryFailed,
    RunFallback,
    Done,
    Fatal,
}

/// Summary written by a media-library export
#[derive(Debug, Clone, PartialEq)]
pub struct OutputReport {
    pub frames_written: u64,
    pub file_size: u64,
    pub processing_time: Duration,
}

#[cfg(test)]
mod tests;
