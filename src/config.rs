// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file named by `DAMAGE_REVIEW_CONFIG`, or
//! `damage-review.yaml` in the working directory. Every key is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "DAMAGE_REVIEW_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "damage-review.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub editor: EditorConfig,
}

/// Location and layout of the inspection store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub root: PathBuf,
    /// File extensions listed as inspection images (lowercase, no dot)
    pub image_extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest extent a resize may produce, in natural pixels
    pub min_box_extent: i64,
    /// Resize handle hit radius, in frame pixels
    pub handle_radius: f32,
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            editor: EditorConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("inspections"),
            image_extensions: ["jpg", "jpeg", "png", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_box_extent: 1,
            handle_radius: 6.0,
            history_limit: 50,
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        Ok(config.sanitized())
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load from the environment-selected or default config location.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load(&path)
    }

    fn sanitized(mut self) -> Self {
        if self.editor.min_box_extent < 1 {
            log::warn!(
                "min_box_extent {} is below 1, using 1",
                self.editor.min_box_extent
            );
            self.editor.min_box_extent = 1;
        }
        for ext in &mut self.store.image_extensions {
            *ext = ext.trim_start_matches('.').to_lowercase();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("editor:\n  handle_radius: 9.5\n").unwrap();
        assert_eq!(config.editor.handle_radius, 9.5);
        assert_eq!(config.editor.min_box_extent, 1);
        assert_eq!(config.editor.history_limit, 50);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_sanitizes_values() {
        let yaml = "store:\n  image_extensions: ['.JPG', png]\neditor:\n  min_box_extent: 0\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.store.image_extensions, vec!["jpg", "png"]);
        assert_eq!(config.editor.min_box_extent, 1);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("editor: [1, 2").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "store:\n  root: /data/inspections\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.store.root, PathBuf::from("/data/inspections"));
    }
}
