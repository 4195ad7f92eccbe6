use crate::data::assets;
use crate::ui::theme::{detect_color_capability, Theme, ThemeName, ThemePalette};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

pub struct ThemeLoader;

#[derive(Debug, Deserialize)]
struct ThemeToml {
    text: String,
    subtext: String,
    base: String,
    surface: String,
    accent: String,
    accent3: String,
}

impl ThemeLoader {
    pub fn load(name: &str) -> Result<Theme> {
        let _ = assets::ensure_assets_ready();
        let name = ThemeName::from_str_or_system(name);
        let rel = name.asset_path();

        let path = assets::resolve_asset_path(std::path::Path::new(rel));
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("theme {} unreadable ({e}); using built-in copy", path.display());
                assets::embedded(rel)
                    .with_context(|| format!("no built-in theme {rel}"))?
                    .to_string()
            }
        };
        Self::parse(name, &raw)
    }

    fn parse(name: ThemeName, raw: &str) -> Result<Theme> {
        let t: ThemeToml = toml::from_str(raw).context("parse theme")?;
        Ok(Theme {
            name,
            palette: ThemePalette {
                text: parse_hex(&t.text),
                subtext: parse_hex(&t.subtext),
                base: parse_hex(&t.base),
                surface: parse_hex(&t.surface),
                accent: parse_hex(&t.accent),
                accent3: parse_hex(&t.accent3),
            },
            capability: detect_color_capability(),
        })
    }
}

fn parse_hex(s: &str) -> (u8, u8, u8) {
    let s = s.trim_start_matches('#');
    let channel = |i: usize| s.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok()).unwrap_or(255);
    (channel(0), channel(2), channel(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("#1a1a1a"), (26, 26, 26));
        assert_eq!(parse_hex("ff4081"), (255, 64, 129));
        assert_eq!(parse_hex("#12"), (18, 255, 255));
    }

    #[test]
    fn builtin_themes_parse() {
        for name in [ThemeName::System, ThemeName::Latte, ThemeName::Frappe, ThemeName::Macchiato, ThemeName::Mocha] {
            let raw = assets::embedded(name.asset_path()).unwrap();
            let theme = ThemeLoader::parse(name, raw).unwrap();
            assert_eq!(theme.name, name);
        }
    }
}
