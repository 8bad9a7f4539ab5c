// Domain rules - Business logic and policies

use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Result of fitting a requested range into the source media
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedRange {
    pub range: TimeRange,
    /// The requested end was beyond the source and got reduced
    pub truncated: bool,
}

/// Business rules for fitting clip ranges to media duration
pub struct RangeClamper;

impl RangeClamper {
    /// Reduce the end of `requested` to `source_duration` when it overshoots.
    ///
    /// A start at or past the end of the source, or a zero duration, leaves
    /// nothing to extract and is rejected.
    pub fn clamp(
        requested: &TimeRange,
        source_duration: TimeSpec,
    ) -> Result<ClampedRange, DomainError> {
        let start = requested.start.non_negative();
        let mut end = requested.end();

        if source_duration.seconds > 0.0 && start.seconds >= source_duration.seconds {
            return Err(DomainError::InvalidTimeRange(format!(
                "start {:.2}s is at or beyond the media duration {:.2}s",
                start.seconds, source_duration.seconds
            )));
        }

        if end.seconds <= start.seconds {
            return Err(DomainError::InvalidTimeRange(format!(
                "the range starting at {:.2}s is empty",
                start.seconds
            )));
        }

        // An unknown (zero) source duration leaves the request untouched
        let truncated = source_duration.seconds > 0.0 && end.seconds > source_duration.seconds;
        if truncated {
            end = source_duration;
        }

        Ok(ClampedRange {
            range: TimeRange::between(start, end),
            truncated,
        })
    }
}

/// Business rules for naming outputs
pub struct OutputNaming;

impl OutputNaming {
    /// Default clip name: `<stem>_clip_<start>_<duration>.mp4` in the working
    /// directory, with both numbers truncated to whole seconds.
    pub fn default_clip_path(input: &Path, range: &TimeRange) -> Result<PathBuf, DomainError> {
        let stem = input
            .file_stem()
            .ok_or_else(|| DomainError::BadArgs("Invalid input file path".to_string()))?
            .to_string_lossy();

        Ok(PathBuf::from(format!(
            "{}_clip_{}_{}.mp4",
            stem,
            range.start.whole_seconds(),
            range.duration.whole_seconds()
        )))
    }
}

/// Business rules for choosing the GIF backend
pub struct BackendSelector;

impl BackendSelector {
    /// Next state after checking tool availability
    pub fn after_tool_check(tool_available: bool, force_fallback: bool) -> ConverterState {
        if tool_available && !force_fallback {
            ConverterState::RunPrimary
        } else {
            ConverterState::RunFallback
        }
    }

    /// Next state after the primary backend finished
    pub fn after_primary(outcome: &Result<(), DomainError>) -> ConverterState {
        match outcome {
            Ok(()) => ConverterState::Done,
            Err(_) => ConverterState::PrimaryFailed,
        }
    }

    /// Next state after the fallback backend finished
    pub fn after_fallback<T>(outcome: &Result<T, DomainError>) -> ConverterState {
        match outcome {
            Ok(_) => ConverterState::Done,
            Err(_) => ConverterState::Fatal,
        }
    }
}

/// Resize only when the source differs from the target
pub fn needs_resize(current: FrameSize, target: FrameSize) -> bool {
    current != target
}
