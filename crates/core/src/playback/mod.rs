pub mod playback_controller;
pub mod playback_error;
mod playback_loop;
pub mod run_state;
pub mod speed;
pub mod status;
