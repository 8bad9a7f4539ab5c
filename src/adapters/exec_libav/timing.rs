//! Timestamp bookkeeping for decode windows and constant-rate output

use std::ops::Range;

use ffmpeg_next::Rational;

/// Convert a stream timestamp to seconds
pub fn ts_to_seconds(ts: i64, time_base: Rational) -> f64 {
    if time_base.denominator() == 0 {
        return 0.0;
    }
    ts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Seconds in `AV_TIME_BASE` units, as expected by container seeks
pub fn seconds_to_av_time(seconds: f64) -> i64 {
    (seconds.max(0.0) * ffmpeg_next::ffi::AV_TIME_BASE as f64) as i64
}

/// `AV_NOPTS_VALUE`
const NO_PTS: i64 = i64::MIN;

/// First presentation time of a stream in seconds, 0 when the container
/// does not report one
pub fn stream_origin(start_time: i64, time_base: Rational) -> f64 {
    if start_time == NO_PTS {
        return 0.0;
    }
    ts_to_seconds(start_time, time_base)
}

/// Where a decoded timestamp falls relative to the export window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    Inside,
    After,
}

/// Half-open `[start, end)` window in source seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeWindow {
    pub start: f64,
    pub end: f64,
}

impl DecodeWindow {
    pub fn unbounded() -> Self {
        Self {
            start: 0.0,
            end: f64::INFINITY,
        }
    }

    /// Move a window given in media time onto the stream clock
    pub fn shifted(self, origin: f64) -> Self {
        Self {
            start: self.start + origin,
            end: self.end + origin,
        }
    }

    pub fn position(&self, seconds: f64) -> Position {
        if seconds < self.start {
            Position::Before
        } else if seconds >= self.end {
            Position::After
        } else {
            Position::Inside
        }
    }

    /// Length of the window, `None` when it runs to the end of the source
    pub fn length(&self) -> Option<f64> {
        self.end.is_finite().then(|| self.end - self.start)
    }
}

/// Maps variable-rate decoded frames onto a constant output rate.
///
/// Each output slot `n` sits at `n / fps` seconds and takes the first frame
/// at or after half a slot before it. Frames between slots are dropped and
/// gaps are filled by repeating a frame. With a known output length, slots
/// past its end are never handed out.
#[derive(Debug, Clone)]
pub struct FrameTicker {
    interval: f64,
    next_slot: u64,
    limit: Option<u64>,
}

impl FrameTicker {
    pub fn new(fps: f64, length: Option<f64>) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        let interval = 1.0 / fps;
        Self {
            interval,
            next_slot: 0,
            limit: length.map(|l| (l / interval).round().max(0.0) as u64),
        }
    }

    /// Output slots a frame shown at `relative` seconds fills
    pub fn advance(&mut self, relative: f64) -> Range<u64> {
        let first = self.next_slot;
        while (self.next_slot as f64 - 0.5) * self.interval <= relative && !self.is_full() {
            self.next_slot += 1;
        }
        first..self.next_slot
    }

    /// Slots still missing before the output length is reached
    pub fn pad(&mut self) -> Range<u64> {
        let first = self.next_slot;
        if let Some(limit) = self.limit {
            self.next_slot = self.next_slot.max(limit);
        }
        first..self.next_slot
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.next_slot >= limit)
    }

    pub fn slots_written(&self) -> u64 {
        self.next_slot
    }
}
