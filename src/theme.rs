//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Colours for the board and HUD, loadable from a btop-style theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile number colours by value band: 1–3, 4–6, 7–9.
    pub value_low: Color,
    pub value_mid: Color,
    pub value_high: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, clock).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Active drag selection.
    pub selection: Color,
    /// Hint highlight.
    pub hint: Color,
    /// Bomb mode / low-clock warning.
    pub danger: Color,
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
    /// Hardcoded One Dark defaults, matching onedark.theme hex values.
    pub fn onedark_default() -> Self {
        Self {
            value_low: parse_hex("#98C379").unwrap(), // green
            value_mid: parse_hex("#61AFEF").unwrap(), // blue
            value_high: parse_hex("#C678DD").unwrap(), // magenta
            bg: parse_hex("#31353F").unwrap(),
            div_line: parse_hex("#3F444F").unwrap(),
            main_fg: parse_hex("#ABB2BF").unwrap(),
            title: parse_hex("#E5C07B").unwrap(),
            selection: parse_hex("#E5C07B").unwrap(), // amber
            hint: parse_hex("#56B6C2").unwrap(),      // cyan
            danger: parse_hex("#E06C75").unwrap(),    // red
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"`.
    /// Falls back to One Dark defaults if path is None or missing/invalid.
    /// `palette` selects a colour variant over whatever was loaded.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override value-band and highlight colours for accessibility variants.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.value_low = parse_hex("#00FF00").unwrap();
                self.value_mid = parse_hex("#00FFFF").unwrap();
                self.value_high = parse_hex("#FF00FF").unwrap();
                self.selection = parse_hex("#FFFF00").unwrap();
                self.hint = parse_hex("#FFFFFF").unwrap();
                self.danger = parse_hex("#FF0000").unwrap();
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito-ish: avoid red/green opposition.
                self.value_low = parse_hex("#0077BB").unwrap();
                self.value_mid = parse_hex("#EE7733").unwrap();
                self.value_high = parse_hex("#EE3377").unwrap();
                self.selection = parse_hex("#BBBB00").unwrap();
                self.hint = parse_hex("#009988").unwrap();
                self.danger = parse_hex("#CC3311").unwrap();
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        // Keys match onedark.theme; fallbacks are that file's hex values.
        Self {
            value_low: get("mem_box")
                .or_else(|| get("cpu_start"))
                .unwrap_or_else(|| parse_hex("#98C379").unwrap()),
            value_mid: get("cpu_box").unwrap_or_else(|| parse_hex("#61AFEF").unwrap()),
            value_high: get("net_box").unwrap_or_else(|| parse_hex("#C678DD").unwrap()),
            bg: get("meter_bg").unwrap_or_else(|| parse_hex("#31353F").unwrap()),
            div_line: get("div_line").unwrap_or_else(|| parse_hex("#3F444F").unwrap()),
            main_fg: get("main_fg").unwrap_or_else(|| parse_hex("#ABB2BF").unwrap()),
            title: get("title").unwrap_or_else(|| parse_hex("#E5C07B").unwrap()),
            selection: get("title")
                .or_else(|| get("cpu_mid"))
                .unwrap_or_else(|| parse_hex("#E5C07B").unwrap()),
            hint: get("hi_fg")
                .or_else(|| get("proc_misc"))
                .unwrap_or_else(|| parse_hex("#56B6C2").unwrap()),
            danger: get("cpu_end")
                .or_else(|| get("temp_end"))
                .unwrap_or_else(|| parse_hex("#E06C75").unwrap()),
        }
    }

    /// Number colour for a tile value (1..=9).
    #[inline]
    pub fn value_color(&self, value: u8) -> Color {
        match value {
            1..=3 => self.value_low,
            4..=6 => self.value_mid,
            _ => self.value_high,
        }
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
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
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
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let (r, g, b) = if s.len() == 6 {
        let r =
            u8::from_str_radix(&s[0..2], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let g =
            u8::from_str_radix(&s[2..4], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let b =
            u8::from_str_radix(&s[4..6], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        (r, g, b)
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let g = u8::from_str_radix(&s[1..2], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let b = u8::from_str_radix(&s[2..3], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        (r, g, b)
    } else {
        return Err(ThemeError::InvalidHex(s.to_string()));
    };
    Ok(Color::Rgb(r, g, b))
}
