use anyhow::{Context, Result};
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_ASSET_DIR: &str = "SPECTRUM_PLAYER_ASSET_DIR";
const APP_DIR: &str = "spectrum-player";

const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/default.toml");

const THEMES: [(&str, &str); 5] = [
    ("themes/system.toml", include_str!("../../themes/system.toml")),
    ("themes/catppuccin_latte.toml", include_str!("../../themes/catppuccin_latte.toml")),
    ("themes/catppuccin_frappe.toml", include_str!("../../themes/catppuccin_frappe.toml")),
    ("themes/catppuccin_macchiato.toml", include_str!("../../themes/catppuccin_macchiato.toml")),
    ("themes/catppuccin_mocha.toml", include_str!("../../themes/catppuccin_mocha.toml")),
];

pub fn resolve_asset_root() -> PathBuf {
    if let Some(p) = std::env::var_os(ENV_ASSET_DIR) {
        return PathBuf::from(p);
    }
    // Linux: $XDG_CONFIG_HOME/spectrum-player, macOS: ~/Library/Application Support/spectrum-player
    BaseDirs::new()
        .map(|d| d.config_dir().join(APP_DIR))
        .unwrap_or_else(local_config_root)
}

pub fn resolve_asset_path(rel: &Path) -> PathBuf {
    resolve_asset_root().join(rel)
}

pub fn resolve_config_path() -> PathBuf {
    resolve_asset_path(Path::new("config/default.toml"))
}

pub fn ensure_assets_ready() -> Result<PathBuf> {
    let root = resolve_asset_root();
    ensure_all_assets(&root)?;
    Ok(root)
}

/// Built-in copy of an asset, used when the on-disk one is unreadable.
pub fn embedded(rel: &str) -> Option<&'static str> {
    if rel == "config/default.toml" {
        return Some(DEFAULT_CONFIG_TOML);
    }
    THEMES.iter().find(|(p, _)| *p == rel).map(|(_, raw)| *raw)
}

fn local_config_root() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join(APP_DIR)
}

fn ensure_all_assets(root: &Path) -> Result<()> {
    write_if_missing(&root.join("config/default.toml"), DEFAULT_CONFIG_TOML)?;
    for (rel, raw) in THEMES {
        write_if_missing(&root.join(rel), raw)?;
    }
    Ok(())
}

fn ensure_dir(p: &Path) -> Result<()> {
    fs::create_dir_all(p).with_context(|| format!("mkdir {}", p.display()))
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
