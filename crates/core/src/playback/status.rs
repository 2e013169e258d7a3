use std::path::PathBuf;

use serde::Serialize;

use crate::playback::run_state::RunState;

/// Point-in-time copy of the controller state, taken under one lock hold.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub loaded: bool,
    pub run_state: RunState,
    pub is_playing: bool,
    pub is_paused: bool,
    pub current_frame: usize,
    pub total_frames: usize,
    pub speed: f64,
    pub native_fps: f64,
    /// `HH:MM:SS` of `current_frame` at the native frame rate.
    pub timestamp: String,
    pub source_path: Option<PathBuf>,
    /// Why the playback loop last stopped on its own, if it failed.
    pub last_error: Option<String>,
}
