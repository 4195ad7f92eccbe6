use crate::audio::analyser::AnalyserOptions;
use crate::data::assets;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_ui_fps")]
    pub ui_fps: u32,

    #[serde(default)]
    pub transparent_background: bool,

    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default)]
    pub analyser: AnalyserConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyserConfig {
    #[serde(default = "default_min_decibels")]
    pub min_decibels: f32,
    #[serde(default = "default_max_decibels")]
    pub max_decibels: f32,
    #[serde(default = "default_smoothing")]
    pub smoothing_time_constant: f32,
}

fn default_theme() -> String {
    "system".to_string()
}
fn default_ui_fps() -> u32 {
    60
}
fn default_volume() -> f32 {
    1.0
}
fn default_min_decibels() -> f32 {
    -100.0
}
fn default_max_decibels() -> f32 {
    -30.0
}
fn default_smoothing() -> f32 {
    0.8
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
            smoothing_time_constant: default_smoothing(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            ui_fps: default_ui_fps(),
            transparent_background: false,
            volume: default_volume(),
            analyser: AnalyserConfig::default(),
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        let _ = assets::ensure_assets_ready();
        Self::load_from(&assets::resolve_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        match toml::from_str::<Config>(&raw) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                log::warn!("invalid config {}: {e}; using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    /// Display refresh interval bounds.
    pub fn frame_rate(&self) -> u32 {
        self.ui_fps.clamp(30, 120)
    }

    pub fn analyser_options(&self) -> AnalyserOptions {
        let a = self.analyser;
        let defaults = AnalyserOptions::default();
        if !(a.min_decibels < a.max_decibels) {
            log::warn!(
                "analyser min_decibels {} must be below max_decibels {}; using defaults",
                a.min_decibels,
                a.max_decibels
            );
            return AnalyserOptions {
                smoothing_time_constant: a.smoothing_time_constant.clamp(0.0, 1.0),
                ..defaults
            };
        }
        AnalyserOptions {
            min_decibels: a.min_decibels,
            max_decibels: a.max_decibels,
            smoothing_time_constant: a.smoothing_time_constant.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_default_matches_code_default() {
        let cfg: Config = toml::from_str(include_str!("../../config/default.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn missing_fields_fall_back() {
        let cfg: Config = toml::from_str("theme = \"mocha\"\n[analyser]\nsmoothing_time_constant = 0.5\n").unwrap();
        assert_eq!(cfg.theme, "mocha");
        assert_eq!(cfg.ui_fps, 60);
        assert_eq!(cfg.analyser.min_decibels, -100.0);
        assert_eq!(cfg.analyser_options().smoothing_time_constant, 0.5);
    }

    #[test]
    fn bad_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, "ui_fps = \"fast\"").unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let missing = dir.path().join("nope.toml");
        assert_eq!(Config::load_from(&missing).unwrap(), Config::default());
    }

    #[test]
    fn inverted_decibel_range_is_rejected() {
        let mut cfg = Config::default();
        cfg.analyser.min_decibels = -20.0;
        cfg.analyser.max_decibels = -90.0;
        let opts = cfg.analyser_options();
        assert_eq!(opts.min_decibels, -100.0);
        assert_eq!(opts.max_decibels, -30.0);
    }

    #[test]
    fn frame_rate_is_bounded() {
        let mut cfg = Config::default();
        cfg.ui_fps = 1000;
        assert_eq!(cfg.frame_rate(), 120);
        cfg.ui_fps = 0;
        assert_eq!(cfg.frame_rate(), 30);
    }
}
