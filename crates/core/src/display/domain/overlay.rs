use crate::shared::timestamp::{format_overlay_clock, format_speed};

/// Text drawn on top of a rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlaySpec {
    pub timestamp_text: String,
    pub speed_text: String,
}

impl OverlaySpec {
    /// Overlay for `frame` of a video running at `fps`, played at `speed`.
    pub fn for_frame(frame: usize, fps: f64, speed: f64) -> Self {
        Self {
            timestamp_text: format_overlay_clock(frame, fps),
            speed_text: format_speed(speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_frame() {
        let overlay = OverlaySpec::for_frame(25, 10.0, 2.0);
        assert_eq!(overlay.timestamp_text, "00:00:02.500");
        assert_eq!(overlay.speed_text, "Speed: 2x");
    }
}
