use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::detection_filter::FilterSettings;
use crate::detection::domain::inference_settings::{InferenceSettings, Preset};
use crate::shared::constants::DEFAULT_IMGSZ;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("no config directory on this platform")]
    NoConfigDir,
    #[error("settings I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Thresholds and city remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub preset: Preset,
    pub inference: InferenceSettings,
    pub filter: FilterSettings,
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_city() -> String {
    "shibuya".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Settings {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            inference: preset.inference(DEFAULT_IMGSZ),
            filter: preset.filter(),
            city: default_city(),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("LitterScan").join("settings.json"))
    }

    /// Loads the saved settings, falling back to defaults when there are none
    /// or the file cannot be read.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using defaults");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_minimum_preset() {
        let s = Settings::default();
        assert_eq!(s.preset, Preset::Minimum);
        assert_relative_eq!(s.inference.conf, 0.05);
        assert_eq!(s.inference.imgsz, 640);
        assert_eq!(s.city, "shibuya");
    }

    #[test]
    fn test_from_preset_copies_filter() {
        let s = Settings::from_preset(Preset::Strict);
        assert_relative_eq!(s.filter.cap_min, 0.75);
        assert_relative_eq!(s.inference.iou, 0.50);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = Settings::from_preset(Preset::Recommended);
        s.inference.tta = true;
        s.filter.can_min = 0.42;
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_missing_city_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut json = serde_json::to_value(Settings::default()).unwrap();
        json.as_object_mut().unwrap().remove("city");
        fs::write(&path, json.to_string()).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap().city, "shibuya");
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load_from(&dir.path().join("absent.json")),
            Err(SettingsError::Io { .. })
        ));
    }
}
