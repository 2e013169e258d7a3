use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::playback::playback_controller::PlaybackController;
use crate::playback::playback_error::{ErrorKind, PlaybackError};
use crate::playback::status::PlaybackStatus;

/// Acknowledgment of a successful command.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommandResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl CommandResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            speed: None,
            path: None,
        }
    }

    fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Failed command, as reported to a remote client.
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<PlaybackError> for ServiceError {
    fn from(err: PlaybackError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub type ServiceResult = Result<CommandResponse, ServiceError>;

/// Request-layer facade: one method per remote operation, each answering
/// with a human-readable acknowledgment or a typed failure.
pub struct PlayerService {
    controller: PlaybackController,
}

impl PlayerService {
    pub fn new(controller: PlaybackController) -> Self {
        Self { controller }
    }

    pub fn load(&self, path: &Path) -> ServiceResult {
        self.controller.load(path)?;
        let mut response = CommandResponse::message("Video loaded successfully");
        response.path = Some(path.to_path_buf());
        Ok(response)
    }

    pub fn play(&self, speed: Option<f64>) -> ServiceResult {
        self.controller.play(speed)?;
        let speed = self.controller.status().speed;
        Ok(CommandResponse::message("Video playback started").with_speed(speed))
    }

    pub fn pause(&self) -> ServiceResult {
        self.controller.pause()?;
        Ok(CommandResponse::message("Video playback paused"))
    }

    pub fn stop(&self) -> ServiceResult {
        self.controller.stop()?;
        Ok(CommandResponse::message("Video playback stopped"))
    }

    pub fn reset(&self) -> ServiceResult {
        self.controller.reset()?;
        Ok(CommandResponse::message("Video reset to beginning"))
    }

    pub fn set_speed(&self, speed: f64) -> ServiceResult {
        self.controller.set_speed(speed)?;
        Ok(CommandResponse::message(format!("Speed set to {speed}x")).with_speed(speed))
    }

    pub fn unload(&self) -> ServiceResult {
        self.controller.unload()?;
        Ok(CommandResponse::message("Video unloaded"))
    }

    /// Never fails: an empty controller reports `loaded: false`.
    pub fn status(&self) -> PlaybackStatus {
        self.controller.status()
    }

    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::display::domain::frame_sink::NullFrameSink;

    fn service() -> PlayerService {
        PlayerService::new(PlaybackController::with_ffmpeg(Arc::new(NullFrameSink)))
    }

    #[test]
    fn test_unloaded_status_serializes_loaded_false() {
        let json = serde_json::to_value(service().status()).unwrap();
        assert_eq!(json["loaded"], false);
        assert_eq!(json["run_state"], "stopped");
        assert_eq!(json["timestamp"], "00:00:00");
    }

    #[test]
    fn test_play_without_video_reports_not_loaded() {
        let err = service().play(None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotLoaded);
        assert_eq!(err.message, "No video loaded");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "NotLoaded");
    }

    #[test]
    fn test_load_missing_file_reports_invalid_path() {
        let err = service().load(Path::new("/no/such/file")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
        assert!(err.message.contains("/no/such/file"));
    }

    #[test]
    fn test_set_speed_acknowledges_with_speed() {
        let response = service().set_speed(0.5).unwrap();
        assert_eq!(response.message, "Speed set to 0.5x");
        assert_eq!(response.speed, Some(0.5));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_set_speed_rejects_negative() {
        let err = service().set_speed(-1.0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSpeed);
    }
}
