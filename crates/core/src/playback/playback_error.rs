use serde::Serialize;
use thiserror::Error;

use crate::shared::constants::VALID_SPEEDS;
use crate::video::domain::video_source::SourceError;

/// Failure categories reported to command callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidPath,
    NotLoaded,
    AlreadyLoading,
    OutOfRange,
    InvalidSpeed,
    DecodeError,
    ShutDown,
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("{0}")]
    InvalidPath(String),
    #[error("No video loaded")]
    NotLoaded,
    #[error("Another video is being loaded")]
    AlreadyLoading,
    #[error("{0}")]
    OutOfRange(String),
    #[error("Invalid speed {0}. Must be one of: {}", speeds_list())]
    InvalidSpeed(f64),
    #[error("{0}")]
    Decode(String),
    #[error("Player is shut down")]
    ShutDown,
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::InvalidPath(_) => ErrorKind::InvalidPath,
            PlaybackError::NotLoaded => ErrorKind::NotLoaded,
            PlaybackError::AlreadyLoading => ErrorKind::AlreadyLoading,
            PlaybackError::OutOfRange(_) => ErrorKind::OutOfRange,
            PlaybackError::InvalidSpeed(_) => ErrorKind::InvalidSpeed,
            PlaybackError::Decode(_) => ErrorKind::DecodeError,
            PlaybackError::ShutDown => ErrorKind::ShutDown,
        }
    }
}

impl From<SourceError> for PlaybackError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidPath { .. } => PlaybackError::InvalidPath(err.to_string()),
            SourceError::OutOfRange { .. } => PlaybackError::OutOfRange(err.to_string()),
            SourceError::Decode { .. } | SourceError::EndOfStream { .. } | SourceError::NotOpen => {
                PlaybackError::Decode(err.to_string())
            }
        }
    }
}

fn speeds_list() -> String {
    VALID_SPEEDS
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_invalid_speed_message_lists_allowed_speeds() {
        let err = PlaybackError::InvalidSpeed(3.0);
        assert_eq!(err.to_string(), "Invalid speed 3. Must be one of: 0.5, 1, 2, 4");
        assert_eq!(err.kind(), ErrorKind::InvalidSpeed);
    }

    #[test]
    fn test_shut_down_has_its_own_kind() {
        let err = PlaybackError::ShutDown;
        assert_eq!(err.kind(), ErrorKind::ShutDown);
        assert_eq!(err.to_string(), "Player is shut down");
    }

    #[test]
    fn test_source_errors_map_to_kinds() {
        let cases = [
            (SourceError::invalid_path(Path::new("/x"), "gone"), ErrorKind::InvalidPath),
            (
                SourceError::OutOfRange {
                    index: 5,
                    total_frames: 5,
                },
                ErrorKind::OutOfRange,
            ),
            (SourceError::decode(2, "bad data"), ErrorKind::DecodeError),
            (SourceError::EndOfStream { index: 7 }, ErrorKind::DecodeError),
        ];
        for (source_err, kind) in cases {
            assert_eq!(PlaybackError::from(source_err).kind(), kind);
        }
    }

    #[test]
    fn test_mapped_error_keeps_source_message() {
        let err = PlaybackError::from(SourceError::decode(2, "bad data"));
        assert_eq!(err.to_string(), "failed to decode frame 2: bad data");
    }
}
