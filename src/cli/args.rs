//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::app::clip_interactor::{ClipRequest, DEFAULT_CLIP_DURATION};
use crate::app::gif_interactor::{ConversionRequest, DEFAULT_GIF_FPS};
use crate::config_initialization::SettingsOverrides;
use crate::domain::errors::DomainError;
use crate::domain::model::{FrameSize, SeekWindow};

/// Parse a time in seconds; `inf` and `NaN` are rejected
fn parse_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("'{}' is not a number of seconds: {}", value, e))?;
    if !seconds.is_finite() {
        return Err(format!("'{}' is not a finite number of seconds", value));
    }
    Ok(seconds)
}

/// Arguments for extract-clip
#[derive(Args, Debug, Clone)]
pub struct ClipArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Start time in seconds
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true, value_parser = parse_seconds)]
    pub start: f64,

    /// Clip length in seconds
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_CLIP_DURATION,
        allow_negative_numbers = true,
        value_parser = parse_seconds
    )]
    pub duration: f64,

    /// Output file path (default: <stem>_clip_<start>_<duration>.mp4)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output frame rate (default: source rate)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,
}

impl ClipArgs {
    pub fn into_request(self) -> ClipRequest {
        ClipRequest {
            input: self.input,
            start: self.start,
            duration: self.duration,
            output: self.output,
            fps: self.fps,
        }
    }
}

/// Arguments for mp4-to-gif
#[derive(Args, Debug, Clone)]
pub struct GifArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Output GIF path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output width in pixels
    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Start time in seconds
    #[arg(short, long, allow_negative_numbers = true, value_parser = parse_seconds)]
    pub start: Option<f64>,

    /// Length in seconds
    #[arg(short, long, allow_negative_numbers = true, value_parser = parse_seconds)]
    pub duration: Option<f64>,

    /// Output frame rate
    #[arg(short, long, default_value_t = DEFAULT_GIF_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Skip ffmpeg and convert with the media library
    #[arg(long)]
    pub force_fallback: bool,

    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Dither algorithm for paletteuse
    #[arg(long)]
    pub dither: Option<String>,
}

impl GifArgs {
    /// Settings given on the command line
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            ffmpeg_program: self.ffmpeg.clone(),
            dither: self.dither.clone(),
        }
    }

    pub fn into_request(self) -> Result<ConversionRequest, DomainError> {
        Ok(ConversionRequest {
            input: self.input,
            output: self.output,
            size: FrameSize::new(self.width, self.height)?,
            window: SeekWindow::new(self.start, self.duration),
            fps: self.fps,
            force_fallback: self.force_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("74"), Ok(74.0));
        assert_eq!(parse_seconds("-3.5"), Ok(-3.5));
        assert!(parse_seconds("inf").is_err());
        assert!(parse_seconds("NaN").is_err());
        assert!(parse_seconds("1:30").is_err());
    }
}
