//! Animated GIF export from a decode window

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::Flags as ScalingFlags;
use gif::{Encoder, Frame, Repeat};
use tracing::{debug, info};

use super::scaler::FrameScaler;
use super::timing::{ts_to_seconds, DecodeWindow, FrameTicker, Position};
use crate::domain::errors::DomainError;
use crate::domain::model::{FrameSize, OutputReport};

/// Quantizer speed passed to the gif crate (1 = best, 30 = fastest)
const QUANTIZE_SPEED: i32 = 10;

pub struct GifJob {
    pub video_index: usize,
    pub size: FrameSize,
    pub fps: u32,
    pub window: DecodeWindow,
}

/// Frame delay in hundredths of a second, at least 1
pub fn frame_delay(fps: u32) -> u16 {
    let fps = fps.max(1) as f64;
    (100.0 / fps).round().clamp(1.0, u16::MAX as f64) as u16
}

fn gif_error(action: &'static str) -> impl FnOnce(gif::EncodingError) -> DomainError {
    move |e| DomainError::ProcessingError(format!("{}: {}", action, e))
}

struct GifSink {
    encoder: Encoder<BufWriter<File>>,
    width: u16,
    height: u16,
    delay: u16,
    frames_written: u64,
}

impl GifSink {
    fn create(path: &Path, size: FrameSize, fps: u32) -> Result<Self, DomainError> {
        let width = u16::try_from(size.width)
            .map_err(|_| DomainError::BadArgs(format!("GIF width {} is too large", size.width)))?;
        let height = u16::try_from(size.height)
            .map_err(|_| DomainError::BadArgs(format!("GIF height {} is too large", size.height)))?;

        let file = File::create(path).map_err(|e| {
            DomainError::FsFail(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let mut encoder = Encoder::new(BufWriter::new(file), width, height, &[])
            .map_err(gif_error("Failed to create GIF encoder"))?;
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(gif_error("Failed to set GIF repeat"))?;

        Ok(Self {
            encoder,
            width,
            height,
            delay: frame_delay(fps),
            frames_written: 0,
        })
    }

    /// Write `copies` identical frames from tightly packed RGBA pixels
    fn write(&mut self, rgba: &[u8], copies: u64) -> Result<(), DomainError> {
        if copies == 0 {
            return Ok(());
        }
        let mut pixels = rgba.to_vec();
        let mut frame = Frame::from_rgba_speed(self.width, self.height, &mut pixels, QUANTIZE_SPEED);
        frame.delay = self.delay;
        for _ in 0..copies {
            self.encoder
                .write_frame(&frame)
                .map_err(gif_error("Failed to write GIF frame"))?;
            self.frames_written += 1;
        }
        Ok(())
    }

    /// Write the trailer and flush the file
    fn finish(self) -> Result<u64, DomainError> {
        let mut writer = self
            .encoder
            .into_inner()
            .map_err(|e| DomainError::FsFail(format!("Failed to finish GIF: {}", e)))?;
        writer
            .flush()
            .map_err(|e| DomainError::FsFail(format!("Failed to flush GIF: {}", e)))?;
        Ok(self.frames_written)
    }
}

/// Copy an RGBA frame into a packed buffer, dropping row padding
fn packed_rgba(frame: &VideoFrame) -> Vec<u8> {
    let width = frame.width() as usize * 4;
    let height = frame.height() as usize;
    let stride = frame.stride(0);
    let data = frame.data(0);

    let mut packed = Vec::with_capacity(width * height);
    for row in 0..height {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + width]);
    }
    packed
}

/// Decode `job.window` from `input` and write it as a looping GIF
pub fn write_gif(
    input: &mut Input,
    output_path: &Path,
    job: &GifJob,
) -> Result<OutputReport, DomainError> {
    let started = Instant::now();

    let (ist_index, time_base, mut decoder) = {
        let stream = input
            .stream(job.video_index)
            .ok_or_else(|| DomainError::ProcessingError("Video stream not accessible".to_string()))?;
        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|e| DomainError::ProcessingError(format!("Failed to create video decoder: {}", e)))?;
        (stream.index(), stream.time_base(), decoder)
    };

    info!("Encoding GIF {} at {} fps", job.size, job.fps);

    let mut sink = GifSink::create(output_path, job.size, job.fps)?;
    let mut scaler = FrameScaler::new(Pixel::RGBA, job.size, ScalingFlags::LANCZOS);
    let mut ticker = FrameTicker::new(job.fps as f64, job.window.length());
    let mut last_frame: Option<Vec<u8>> = None;
    let mut decoded = VideoFrame::empty();
    let mut done = false;

    let mut handle_frame = |decoded: &VideoFrame,
                            last_frame: &mut Option<Vec<u8>>|
     -> Result<bool, DomainError> {
        let Some(ts) = decoded.timestamp().or(decoded.pts()) else {
            return Ok(false);
        };
        let seconds = ts_to_seconds(ts, time_base);
        match job.window.position(seconds) {
            Position::Before => Ok(false),
            Position::After => Ok(true),
            Position::Inside => {
                let slots = ticker.advance(seconds - job.window.start);
                if !slots.is_empty() {
                    let rgba = packed_rgba(&scaler.scale(decoded)?);
                    sink.write(&rgba, slots.end - slots.start)?;
                    *last_frame = Some(rgba);
                }
                Ok(ticker.is_full())
            }
        }
    };

    for (stream, packet) in input.packets() {
        if stream.index() != ist_index {
            continue;
        }
        decoder.send_packet(&packet).map_err(|e| {
            DomainError::ProcessingError(format!("Failed to send packet to decoder: {}", e))
        })?;
        while !done && decoder.receive_frame(&mut decoded).is_ok() {
            done = handle_frame(&decoded, &mut last_frame)?;
        }
        if done {
            break;
        }
    }

    if !done {
        let _ = decoder.send_eof();
        while !done && decoder.receive_frame(&mut decoded).is_ok() {
            done = handle_frame(&decoded, &mut last_frame)?;
        }
    }
    drop(handle_frame);

    if let Some(rgba) = last_frame {
        let tail = ticker.pad();
        sink.write(&rgba, tail.end - tail.start)?;
    }

    let frames_written = sink.finish()?;
    if frames_written == 0 {
        return Err(super::discard_empty_output(output_path));
    }

    debug!("GIF written: {} frames", frames_written);

    Ok(OutputReport {
        frames_written,
        file_size: super::output_file_size(output_path),
        processing_time: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_delay() {
        assert_eq!(frame_delay(10), 10);
        assert_eq!(frame_delay(15), 7);
        assert_eq!(frame_delay(30), 3);
        assert_eq!(frame_delay(0), 100);
        assert_eq!(frame_delay(500), 1);
    }
}
