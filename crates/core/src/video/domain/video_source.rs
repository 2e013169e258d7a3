use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open video {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },
    #[error("frame {index} is outside 0..{total_frames}")]
    OutOfRange { index: usize, total_frames: usize },
    #[error("failed to decode frame {index}: {reason}")]
    Decode { index: usize, reason: String },
    #[error("stream ended before frame {index}")]
    EndOfStream { index: usize },
    #[error("video source is not open")]
    NotOpen,
}

impl SourceError {
    pub fn invalid_path(path: &Path, reason: impl ToString) -> Self {
        Self::InvalidPath {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(index: usize, reason: impl ToString) -> Self {
        Self::Decode {
            index,
            reason: reason.to_string(),
        }
    }
}

/// Frame-indexed access to a video file.
///
/// The playback loop is the only caller once a source is loaded, so
/// implementations need no internal synchronization; `Send` lets the source
/// move onto that thread.
pub trait VideoSource: Send {
    /// Opens `path` and reads its frame count and native frame rate.
    ///
    /// Fails with [`SourceError::InvalidPath`] when the file is missing, is
    /// not a decodable video, or reports a zero frame count or frame rate.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, SourceError>;

    /// Decodes the frame at `index`, where `0 <= index < total_frames`.
    fn read_frame(&mut self, index: usize) -> Result<Frame, SourceError>;

    /// Releases the decode handle. Calling it again is a no-op.
    fn close(&mut self);
}

/// Builds a fresh, unopened source for each `load`.
pub type SourceFactory = Box<dyn Fn() -> Box<dyn VideoSource> + Send + Sync>;

/// Rejects indices past the end of an opened video.
pub fn check_index(index: usize, total_frames: usize) -> Result<(), SourceError> {
    if index < total_frames {
        Ok(())
    } else {
        Err(SourceError::OutOfRange {
            index,
            total_frames,
        })
    }
}
