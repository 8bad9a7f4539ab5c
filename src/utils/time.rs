//! Time formatting utilities

/// Format seconds the way the media tool accepts them on its command line.
///
/// Whole values print without a fractional part (`74`), others keep up to
/// millisecond precision (`2.5`, `0.125`).
pub fn format_seconds(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let millis = (seconds * 1000.0).round() / 1000.0;
    format!("{}", millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds_have_no_fraction() {
        assert_eq!(format_seconds(74.0), "74");
        assert_eq!(format_seconds(0.0), "0");
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(format_seconds(2.5), "2.5");
        assert_eq!(format_seconds(0.125), "0.125");
        assert_eq!(format_seconds(1.0004), "1");
    }

    #[test]
    fn test_invalid_values_become_zero() {
        assert_eq!(format_seconds(-3.0), "0");
        assert_eq!(format_seconds(f64::NAN), "0");
    }
}
