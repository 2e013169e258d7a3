use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use playdeck_core::playback::speed::validate_speed;
use playdeck_core::shared::constants::DEFAULT_SPEED;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid JSON in config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid default_speed {0} in config")]
    InvalidSpeed(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub enabled: bool,
    /// Where the display surface keeps the current frame. Defaults to a
    /// file in the system temp directory.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_path: None,
        }
    }
}

impl DisplaySettings {
    pub fn resolved_snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("playdeck").join("current.png"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_speed: f64,
    pub display: DisplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            display: DisplaySettings::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("playdeck").join("config.json"))
    }

    /// Loads `explicit`, or the per-user config file when none is given.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate_speed(settings.default_speed)
            .map_err(|_| ConfigError::InvalidSpeed(settings.default_speed))?;
        log::info!("Loaded config from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("config.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.display.enabled);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"default_speed": 2.0}"#);
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.default_speed, 2.0);
        assert_eq!(settings.display, DisplaySettings::default());
    }

    #[test]
    fn test_display_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"display": {"enabled": false, "snapshot_path": "/tmp/frame.png"}}"#,
        );
        let settings = Settings::load_from(&path).unwrap();
        assert!(!settings.display.enabled);
        assert_eq!(
            settings.display.resolved_snapshot_path(),
            PathBuf::from("/tmp/frame.png")
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_disallowed_speed_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"default_speed": 3.0}"#);
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"default_speed": 0.5}"#);
        assert_eq!(Settings::load(Some(path.as_path())).unwrap().default_speed, 0.5);
    }

    #[test]
    fn test_default_snapshot_path_is_in_temp_dir() {
        let path = DisplaySettings::default().resolved_snapshot_path();
        assert!(path.starts_with(std::env::temp_dir()));
    }
}
