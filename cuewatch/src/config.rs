//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory, unless a path is
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ie::{Color, Cue, Line, TargetColor};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window to capture (from `xcap::Window::app_name()`).
    ///
    /// If multiple windows share the same app name, the first match is used.
    /// `None` captures the primary monitor instead.
    pub app_name: Option<String>,

    /// Poll interval (seconds) for `watch`.
    pub poll_delay_s: f32,

    /// Cues checked against every capture.
    pub cues: Vec<Cue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: None,
            poll_delay_s: 1.0,
            cues: vec![Cue::new(
                "rgb-bar",
                Line::MIDDLE_ROW,
                vec![
                    TargetColor::required(Color::new(237, 28, 36), 3),
                    TargetColor::required(Color::new(34, 177, 76), 3),
                    TargetColor::required(Color::new(0, 162, 232), 3),
                ],
            )],
        }
    }
}

impl Config {
    /// Default path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("cuewatch.json"))
    }

    /// Resolve an explicit path or fall back to [`Config::path`].
    pub fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::path(),
        }
    }

    /// Load configuration, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration. A missing file yields the defaults.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::try_load(&dir.path().join("nope.json")).unwrap();

        assert_eq!(cfg.poll_delay_s, 1.0);
        assert_eq!(cfg.cues.len(), 1);
        assert_eq!(cfg.cues[0].name, "rgb-bar");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cuewatch.json");

        let mut cfg = Config::default();
        cfg.app_name = Some("sober".to_string());
        cfg.poll_delay_s = 0.25;
        cfg.save(&path).unwrap();

        let loaded = Config::try_load(&path).unwrap();
        assert_eq!(loaded.app_name.as_deref(), Some("sober"));
        assert_eq!(loaded.poll_delay_s, 0.25);
        assert_eq!(loaded.cues, cfg.cues);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cuewatch.json");
        fs::write(&path, r#"{"app_name": "RobloxPlayerBeta.exe"}"#).unwrap();

        let cfg = Config::try_load(&path).unwrap();
        assert_eq!(cfg.app_name.as_deref(), Some("RobloxPlayerBeta.exe"));
        assert_eq!(cfg.poll_delay_s, 1.0);
        assert_eq!(cfg.cues.len(), 1);
    }

    #[test]
    fn test_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cuewatch.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::try_load(&path).is_err());
        assert_eq!(Config::load_or_default(&path).cues.len(), 1);
    }
}
