use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::alerts::model::TierThresholds;
use super::error::{Result, WatchError};

/// Service settings, persisted as settings.json.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub thresholds: TierThresholds,
    /// Delay between evaluations in the watch loop
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Location updates closer than this to the last evaluated point are skipped
    #[serde(default = "default_min_location_delta_m")]
    pub min_location_delta_m: f64,
    /// Clear notified state for events whose teams are no longer favorites
    #[serde(default)]
    pub clear_stale_on_unfavorite: bool,
}

fn default_poll_interval_ms() -> u64 {
    30_000
}

fn default_min_location_delta_m() -> f64 {
    50.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thresholds: TierThresholds::default(),
            poll_interval_ms: default_poll_interval_ms(),
            min_location_delta_m: default_min_location_delta_m(),
            clear_stale_on_unfavorite: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.nearby_km.is_finite() && t.nearby_km >= 0.0) {
            return Err(WatchError::Config(format!("nearby_km must be >= 0, got {}", t.nearby_km)));
        }
        if !(t.proximity_m.is_finite() && t.proximity_m >= 0.0) {
            return Err(WatchError::Config(format!(
                "proximity_m must be >= 0, got {}",
                t.proximity_m
            )));
        }
        if !(self.min_location_delta_m.is_finite() && self.min_location_delta_m >= 0.0) {
            return Err(WatchError::Config(format!(
                "min_location_delta_m must be >= 0, got {}",
                self.min_location_delta_m
            )));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Missing, unreadable or invalid files fall back to defaults.
    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            match fs::read_to_string(&self.config_path) {
                Ok(content) => match serde_json::from_str::<Settings>(&content) {
                    Ok(settings) => match settings.validate() {
                        Ok(()) => return settings,
                        Err(e) => log::warn!("Ignoring {:?}: {}", self.config_path, e),
                    },
                    Err(e) => log::warn!("Malformed settings in {:?}: {}", self.config_path, e),
                },
                Err(e) => log::warn!("Cannot read {:?}: {}", self.config_path, e),
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("nested"));

        let default = manager.load();
        assert_eq!(default, Settings::default());
        assert_eq!(default.thresholds.nearby_km, 5.0);

        let new_settings = Settings {
            thresholds: TierThresholds {
                nearby_km: 2.0,
                proximity_m: 150.0,
            },
            poll_interval_ms: 5_000,
            min_location_delta_m: 25.0,
            clear_stale_on_unfavorite: true,
        };

        manager.save(&new_settings).unwrap();
        assert_eq!(manager.load(), new_settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(manager.path(), r#"{ "poll_interval_ms": 1000 }"#).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.poll_interval_ms, 1000);
        assert_eq!(loaded.thresholds, TierThresholds::default());
        assert!(!loaded.clear_stale_on_unfavorite);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(manager.path(), "not json").unwrap();
        assert_eq!(manager.load(), Settings::default());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        let mut settings = Settings::default();
        settings.thresholds.proximity_m = -1.0;

        assert!(matches!(manager.save(&settings), Err(WatchError::Config(_))));
        assert!(!manager.path().exists());
    }
}
