use std::time::Duration;

use crate::playback::playback_error::PlaybackError;
use crate::shared::constants::VALID_SPEEDS;

/// Accepts only the multipliers in [`VALID_SPEEDS`].
pub fn validate_speed(speed: f64) -> Result<f64, PlaybackError> {
    if VALID_SPEEDS.contains(&speed) {
        Ok(speed)
    } else {
        Err(PlaybackError::InvalidSpeed(speed))
    }
}

/// Delay between two presented frames: `1 / (fps * speed)` seconds.
pub fn frame_interval(fps: f64, speed: f64) -> Duration {
    let rate = fps * speed;
    if rate.is_finite() && rate > 0.0 {
        Duration::from_secs_f64(1.0 / rate)
    } else {
        Duration::ZERO
    }
}
