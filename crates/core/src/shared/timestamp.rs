//! Text shown for a playback position: the status clock and the on-frame
//! overlay labels.

/// Seconds of video elapsed at `frame` for a source running at `fps`.
///
/// A non-positive rate yields zero rather than a non-finite value.
pub fn position_secs(frame: usize, fps: f64) -> f64 {
    if fps > 0.0 {
        frame as f64 / fps
    } else {
        0.0
    }
}

/// `HH:MM:SS`, as reported by status queries.
pub fn format_clock(frame: usize, fps: f64) -> String {
    let total = position_secs(frame, fps) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// `HH:MM:SS.mmm`, as drawn on top of each rendered frame.
pub fn format_overlay_clock(frame: usize, fps: f64) -> String {
    let total_ms = (position_secs(frame, fps) * 1000.0).round() as u64;
    let secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        total_ms % 1000
    )
}

/// `Speed: 2x`, `Speed: 0.5x`.
pub fn format_speed(speed: f64) -> String {
    format!("Speed: {speed}x")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::start(0, 30.0, "00:00:00")]
    #[case::one_second(30, 30.0, "00:00:01")]
    #[case::partial_second_truncates(59, 30.0, "00:00:01")]
    #[case::minutes(25 * 125, 25.0, "00:02:05")]
    #[case::hours(10 * 3661, 10.0, "01:01:01")]
    #[case::zero_fps(100, 0.0, "00:00:00")]
    fn test_format_clock(#[case] frame: usize, #[case] fps: f64, #[case] expected: &str) {
        assert_eq!(format_clock(frame, fps), expected);
    }

    #[rstest]
    #[case::start(0, 10.0, "00:00:00.000")]
    #[case::tenths(5, 10.0, "00:00:00.500")]
    #[case::over_a_minute(610, 10.0, "00:01:01.000")]
    #[case::quarter_rate(3, 4.0, "00:00:00.750")]
    #[case::no_float_truncation(29, 100.0, "00:00:00.290")]
    fn test_format_overlay_clock(#[case] frame: usize, #[case] fps: f64, #[case] expected: &str) {
        assert_eq!(format_overlay_clock(frame, fps), expected);
    }

    #[rstest]
    #[case(0.5, "Speed: 0.5x")]
    #[case(1.0, "Speed: 1x")]
    #[case(4.0, "Speed: 4x")]
    fn test_format_speed(#[case] speed: f64, #[case] expected: &str) {
        assert_eq!(format_speed(speed), expected);
    }

    #[test]
    fn test_position_secs_negative_fps_is_zero() {
        assert_eq!(position_secs(10, -1.0), 0.0);
    }
}
