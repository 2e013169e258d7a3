use std::path::PathBuf;

/// Properties of an opened video, read once when the source is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Native frame rate; always positive for an opened source.
    pub fps: f64,
    /// Always non-zero for an opened source.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: PathBuf,
}

impl VideoMetadata {
    /// Playback length at the native frame rate, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.total_frames as f64 / self.fps
    }
}
