//! Colours: built-in palettes and btop-style `theme[key]="#rrggbb"` files.

use crate::Palette;
use crate::field::Cell;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours indexed by cell value - 1 (I, L, J, O, T, S, Z).
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, hints).
    pub main_fg: Color,
    /// Titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex colour: {0}")]
    InvalidHex(String),
}

/// Theme file keys for the piece colours, in cell-value order.
const PIECE_KEYS: [&str; 7] = [
    "piece_i", "piece_l", "piece_j", "piece_o", "piece_t", "piece_s", "piece_z",
];

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Saturated arcade palette on black.
    pub fn classic() -> Self {
        Self {
            pieces: [
                Color::Rgb(0x00, 0x00, 0xFF), // I
                Color::Rgb(0xFF, 0x00, 0xFF), // L
                Color::Rgb(0xFF, 0xFF, 0x00), // J
                Color::Rgb(0x00, 0xFF, 0x00), // O
                Color::Rgb(0xFF, 0x99, 0x00), // T
                Color::Rgb(0xFF, 0x00, 0x00), // S
                Color::Rgb(0x00, 0xFF, 0xFF), // Z
            ],
            bg: Color::Rgb(0x00, 0x00, 0x00),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }

    /// Loads `path` over the defaults. Missing keys keep their default colour.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = Self::classic();
        theme.apply_palette(palette);
        if let Some(path) = path {
            let text = std::fs::read_to_string(path)?;
            theme.apply_map(&parse_theme_file(&text))?;
        }
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0xFF, 0xFF),
                ];
                self.main_fg = Color::White;
            }
            Palette::Colorblind => {
                self.pieces = [
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xBB, 0xBB, 0x00),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x33, 0xBB, 0xEE),
                ];
            }
        }
    }

    fn apply_map(&mut self, map: &HashMap<String, String>) -> Result<(), ThemeError> {
        for (slot, key) in self.pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        for (key, slot) in [
            ("bg", &mut self.bg),
            ("div_line", &mut self.div_line),
            ("main_fg", &mut self.main_fg),
            ("title", &mut self.title),
        ] {
            if let Some(v) = map.get(key) {
                *slot = parse_hex(v)?;
            }
        }
        Ok(())
    }

    /// Colour for a non-empty cell value.
    #[inline]
    pub fn cell_color(&self, cell: Cell) -> Color {
        self.pieces[(cell as usize).saturating_sub(1) % self.pieces.len()]
    }
}

/// `theme[key]="value"` lines into a map; comments and junk lines are skipped.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let rest = line.strip_prefix("theme[")?;
            let (key, rest) = rest.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    // from_str_radix alone would take a leading '+'.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
