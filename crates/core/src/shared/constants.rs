/// Playback speed multipliers accepted by `play` and `set_speed`.
pub const VALID_SPEEDS: &[f64] = &[0.5, 1.0, 2.0, 4.0];

pub const DEFAULT_SPEED: f64 = 1.0;

/// Frames the display thread may have queued before new frames are dropped.
pub const DISPLAY_QUEUE_CAPACITY: usize = 2;

/// Non-sequential reads closer than this many frames ahead of the decoder
/// decode forward instead of seeking.
pub const MAX_FORWARD_DECODE: usize = 48;
