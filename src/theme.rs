//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Mole colours by kind: plain, double, triple, armored.
    pub moles: [Color; 4],
    /// Empty hole.
    pub hole: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, combo).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text, key hints.
    pub inactive_fg: Color,
    /// "MISSED" and the miss flash.
    pub miss: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults: exact hex values from onedark.theme.
    pub fn onedark_default() -> Self {
        Self {
            moles: [
                Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
                Color::Rgb(0x61, 0xAF, 0xEF), // cpu_box / blue
                Color::Rgb(0xE5, 0xC0, 0x7B), // title / gold
                Color::Rgb(0xC6, 0x78, 0xDD), // net_box / magenta
            ],
            hole: Color::Rgb(0x28, 0x2C, 0x34),        // main_bg
            bg: Color::Rgb(0x31, 0x35, 0x3F),          // meter_bg
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),    // div_line
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),     // main_fg
            title: Color::Rgb(0xE5, 0xC0, 0x7B),       // title
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70), // inactive_fg
            miss: Color::Rgb(0xE0, 0x6C, 0x75),        // cpu_end / red
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Default theme for a palette when no file is loaded.
    pub fn for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override mole colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.moles = [
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                ];
                self.miss = Color::Rgb(0xFF, 0x00, 0x00);
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito style: no red/green pair carries meaning.
                self.moles = [
                    Color::Rgb(0x00, 0x77, 0xBB), // blue
                    Color::Rgb(0xEE, 0x77, 0x33), // orange
                    Color::Rgb(0xBB, 0xBB, 0x00), // yellow
                    Color::Rgb(0xEE, 0x33, 0x77), // magenta
                ];
                self.miss = Color::Rgb(0xCC, 0x33, 0x11);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            moles: [
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.moles[0]),
                get("cpu_box").unwrap_or(d.moles[1]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.moles[2]),
                get("net_box").unwrap_or(d.moles[3]),
            ],
            hole: get("main_bg").unwrap_or(d.hole),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
            miss: get("cpu_end")
                .or_else(|| get("temp_end"))
                .unwrap_or(d.miss),
        }
    }

    #[inline]
    pub fn mole_color(&self, kind: crate::game::MoleKind) -> Color {
        self.moles[usize::from(kind.color_index()) % 4]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(eq) = rest.find('=') {
            let value = rest[eq + 1..]
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            if !value.is_empty() {
                map.insert(key.to_string(), value);
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MoleKind;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12345"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GGHHII"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_moles() {
        let map = parse_theme_file(
            "# comment\ntheme[mem_box]=\"#010203\"\ntheme[cpu_end]='#FF0000'\nnot a theme line",
        );
        let t = Theme::from_map(&map);
        assert_eq!(t.mole_color(MoleKind::Plain), Color::Rgb(1, 2, 3));
        assert_eq!(t.miss, Color::Rgb(255, 0, 0));
        assert_eq!(t.bg, Theme::onedark_default().bg);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let t = Theme::load(
            Some(Path::new("/definitely/not/here.theme")),
            crate::Palette::Colorblind,
        )
        .unwrap();
        assert_eq!(t.moles[0], Color::Rgb(0x00, 0x77, 0xBB));
    }
}
