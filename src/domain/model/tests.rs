// Unit tests for domain models

use super::*;

#[test]
fn test_time_spec_non_negative() {
    assert_eq!(TimeSpec::from_seconds(-3.0).non_negative(), TimeSpec::zero());
    assert_eq!(TimeSpec::from_seconds(f64::NAN).non_negative(), TimeSpec::zero());
    assert_eq!(TimeSpec::from_seconds(2.5).non_negative().seconds, 2.5);
}

#[test]
fn test_time_spec_whole_seconds_truncates() {
    assert_eq!(TimeSpec::from_seconds(12.9).whole_seconds(), 12);
    assert_eq!(TimeSpec::from_seconds(0.4).whole_seconds(), 0);
}

#[test]
fn test_time_spec_display() {
    assert_eq!(TimeSpec::from_seconds(3723.456).to_string(), "1:02:03.456");
    assert_eq!(TimeSpec::from_seconds(123.5).to_string(), "2:03.500");
}

#[test]
fn test_time_range_clamps_negative_inputs() {
    let range = TimeRange::new(TimeSpec::from_seconds(-5.0), TimeSpec::from_seconds(-1.0));
    assert_eq!(range.start, TimeSpec::zero());
    assert_eq!(range.duration, TimeSpec::zero());
    assert_eq!(range.end(), TimeSpec::zero());
}

#[test]
fn test_time_range_end() {
    let range = TimeRange::new(TimeSpec::from_seconds(12.0), TimeSpec::from_seconds(7.0));
    assert_eq!(range.end().seconds, 19.0);
}

#[test]
fn test_time_range_between() {
    let range = TimeRange::between(TimeSpec::from_seconds(10.0), TimeSpec::from_seconds(4.0));
    assert_eq!(range.start.seconds, 10.0);
    assert_eq!(range.duration, TimeSpec::zero());
}

#[test]
fn test_seek_window_unbounded() {
    let window = SeekWindow::new(None, None);
    assert!(window.is_unbounded());
    assert_eq!(window.resolve(TimeSpec::from_seconds(120.0)), None);
}

#[test]
fn test_seek_window_start_only_runs_to_media_end() {
    let window = SeekWindow::new(Some(100.0), None);
    let range = window.resolve(TimeSpec::from_seconds(120.0)).unwrap();
    assert_eq!(range.start.seconds, 100.0);
    assert_eq!(range.duration.seconds, 20.0);
}

#[test]
fn test_seek_window_duration_only_starts_at_zero() {
    let window = SeekWindow::new(None, Some(4.0));
    let range = window.resolve(TimeSpec::from_seconds(120.0)).unwrap();
    assert_eq!(range.start, TimeSpec::zero());
    assert_eq!(range.duration.seconds, 4.0);
}

#[test]
fn test_frame_size_validation() {
    assert!(FrameSize::new(0, 720).is_err());
    assert!(FrameSize::new(1280, 0).is_err());
    let size = FrameSize::new(640, 360).unwrap();
    assert_eq!(size.to_string(), "640x360");
    assert_eq!(FrameSize::default(), FrameSize { width: 1280, height: 720 });
}

#[test]
fn test_subrange_method_detection() {
    let both = MediaCapabilities { seekable: true, decodable: true };
    assert_eq!(SubrangeMethod::detect(&both).unwrap(), SubrangeMethod::Seek);

    let decode_only = MediaCapabilities { seekable: false, decodable: true };
    assert_eq!(SubrangeMethod::detect(&decode_only).unwrap(), SubrangeMethod::Decode);

    let neither = MediaCapabilities { seekable: true, decodable: false };
    assert!(matches!(
        SubrangeMethod::detect(&neither),
        Err(DomainError::BackendUnavailable(_))
    ));
}

#[test]
fn test_clip_encoding_defaults() {
    let encoding = ClipEncoding::default();
    assert_eq!(encoding.video_codec, "libx264");
    assert_eq!(encoding.audio_codec, "aac");
    assert_eq!(encoding.threads, 4);
    assert_eq!(encoding.fps, None);
}
