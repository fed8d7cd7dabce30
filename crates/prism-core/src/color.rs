//! Colors and per-level color ramps.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 24-bit ANSI foreground escape sequence for this color.
    pub fn ansi_fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Error for color strings that aren't `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color: {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Default light-theme ramp: hot pink, royal blue, lime green, orange,
/// blue violet, dodger blue.
pub const DEFAULT_LIGHT: [Color; 6] = [
    Color::rgb(0xFF, 0x69, 0xB4),
    Color::rgb(0x41, 0x69, 0xE1),
    Color::rgb(0x32, 0xCD, 0x32),
    Color::rgb(0xFF, 0xA5, 0x00),
    Color::rgb(0x8A, 0x2B, 0xE2),
    Color::rgb(0x1E, 0x90, 0xFF),
];

/// Default dark-theme ramp, the darker variants of [`DEFAULT_LIGHT`].
pub const DEFAULT_DARK: [Color; 6] = [
    Color::rgb(0xDC, 0x5A, 0x96),
    Color::rgb(0x37, 0x5A, 0xBE),
    Color::rgb(0x28, 0xAF, 0x28),
    Color::rgb(0xDC, 0x8C, 0x00),
    Color::rgb(0x78, 0x28, 0xBE),
    Color::rgb(0x19, 0x78, 0xD2),
];

/// Ordered colors indexed by nesting level modulo length.
///
/// Never empty, so [`ColorRamp::color_for`] cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    colors: Vec<Color>,
}

impl ColorRamp {
    /// Builds a ramp; an empty list falls back to `fallback`.
    pub fn new(colors: Vec<Color>, fallback: &[Color]) -> Self {
        if !colors.is_empty() {
            return Self { colors };
        }
        let colors = if fallback.is_empty() {
            DEFAULT_DARK.to_vec()
        } else {
            fallback.to_vec()
        };
        Self { colors }
    }

    /// Parses hex strings leniently: a bad entry takes the fallback color
    /// for the same slot instead of failing the whole ramp.
    pub fn from_hex<S: AsRef<str>>(entries: &[S], fallback: &[Color]) -> Self {
        let colors = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry.as_ref().parse().unwrap_or_else(|e| {
                    let slot = fallback
                        .get(i % fallback.len().max(1))
                        .copied()
                        .unwrap_or(DEFAULT_DARK[i % DEFAULT_DARK.len()]);
                    tracing::warn!("{}, using {} for level {}", e, slot, i);
                    slot
                })
            })
            .collect();
        Self::new(colors, fallback)
    }

    pub fn color_for(&self, level: usize) -> Color {
        self.colors[level % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}
