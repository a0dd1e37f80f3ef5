use std::fmt;
use std::str::FromStr;

use crate::LogotraceError;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color::new(0, 0, 0);
pub const WHITE: Color = Color::new(255, 255, 255);

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from the first three bytes of a pixel.
    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2])
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Two colors match when every channel differs by at most `tolerance`.
    pub fn matches(&self, other: &Color, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }

    /// Perceived brightness using the Rec. 601 weights.
    pub fn luminance(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    /// Share of each channel in the channel sum. Black counts as neutral gray.
    pub fn ratios(&self) -> [f64; 3] {
        let sum = self.r as u32 + self.g as u32 + self.b as u32;
        if sum == 0 {
            return [1.0 / 3.0; 3];
        }
        let sum = sum as f64;
        [
            self.r as f64 / sum,
            self.g as f64 / sum,
            self.b as f64 / sum,
        ]
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = LogotraceError;

    /// Parse `#rgb`, `#rrggbb`, or either form without the leading `#`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || LogotraceError::InvalidColor(value.to_string());
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Color::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

/// A color sample that also carries coverage, e.g. the mean of a pixel region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWithAlpha {
    pub color: Color,
    pub alpha: u8,
}
