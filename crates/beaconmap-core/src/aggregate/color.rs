//! RGB colours and the beacon palette

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Base colours assigned to beacons in order of first appearance
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#FFA500", "#800080",
    "#008000", "#000080",
];

/// An opaque 8-bit RGB colour.
///
/// Serialized as a CSS hex string (`#rrggbb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
}

impl Rgb {
    /// Black
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create from channels
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create from CSS hex color (`#rrggbb` or `#rgb`)
    pub fn from_css_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    /// Convert to CSS hex color
    pub fn to_css_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Convert to CSS `rgb()` notation
    pub fn to_css_rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    /// Scale every channel by `factor` (clamped to `[0, 1]`), rounding to nearest
    pub fn scale(&self, factor: f64) -> Self {
        let f = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let channel = |c: u8| (c as f64 * f).round() as u8;
        Self::new(channel(self.red), channel(self.green), channel(self.blue))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_css_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{}'", s)))
    }
}

/// The built-in palette as colours
pub fn default_palette() -> Vec<Rgb> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|hex| Rgb::from_css_hex(hex))
        .collect()
}

/// Colour for the beacon at `index` (order of first appearance), cycling
/// through `palette`. Falls back to the built-in palette when it is empty.
pub fn palette_color(palette: &[Rgb], index: usize) -> Rgb {
    if palette.is_empty() {
        let builtin = default_palette();
        return builtin[index % builtin.len()];
    }
    palette[index % palette.len()]
}
