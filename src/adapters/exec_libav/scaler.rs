//! Pixel format and size conversion for decoded frames

use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};

use crate::domain::errors::DomainError;
use crate::domain::model::FrameSize;

/// Converts frames to one pixel format and size.
///
/// The underlying context is rebuilt whenever the decoder changes its output
/// format or dimensions mid-stream.
pub struct FrameScaler {
    target: Pixel,
    size: FrameSize,
    flags: ScalingFlags,
    context: Option<(ScalingContext, Pixel, u32, u32)>,
}

impl FrameScaler {
    pub fn new(target: Pixel, size: FrameSize, flags: ScalingFlags) -> Self {
        Self {
            target,
            size,
            flags,
            context: None,
        }
    }

    pub fn scale(&mut self, frame: &VideoFrame) -> Result<VideoFrame, DomainError> {
        let (format, width, height) = (frame.format(), frame.width(), frame.height());

        let stale = match &self.context {
            Some((_, f, w, h)) => *f != format || *w != width || *h != height,
            None => true,
        };
        if stale {
            let context = ScalingContext::get(
                format,
                width,
                height,
                self.target,
                self.size.width,
                self.size.height,
                self.flags,
            )
            .map_err(|e| DomainError::ProcessingError(format!("Failed to create scaler: {}", e)))?;
            self.context = Some((context, format, width, height));
        }

        let mut scaled = VideoFrame::empty();
        if let Some((context, _, _, _)) = self.context.as_mut() {
            context
                .run(frame, &mut scaled)
                .map_err(|e| DomainError::ProcessingError(format!("Scaling failed: {}", e)))?;
        }
        Ok(scaled)
    }
}
