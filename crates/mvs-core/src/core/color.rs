use phf::{Map, phf_map};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static NAMED_COLORS: Map<&'static str, u32> = phf_map! {
    "white" => 0xffffff, "black" => 0x000000, "gray" => 0x808080, "grey" => 0x808080,
    "silver" => 0xc0c0c0, "lightgray" => 0xd3d3d3, "darkgray" => 0xa9a9a9,
    "red" => 0xff0000, "darkred" => 0x8b0000, "crimson" => 0xdc143c, "salmon" => 0xfa8072,
    "tomato" => 0xff6347, "coral" => 0xff7f50, "orange" => 0xffa500, "darkorange" => 0xff8c00,
    "gold" => 0xffd700, "yellow" => 0xffff00, "khaki" => 0xf0e68c, "olive" => 0x808000,
    "green" => 0x008000, "lime" => 0x00ff00, "forestgreen" => 0x228b22, "seagreen" => 0x2e8b57,
    "teal" => 0x008080, "cyan" => 0x00ffff, "aqua" => 0x00ffff, "turquoise" => 0x40e0d0,
    "skyblue" => 0x87ceeb, "steelblue" => 0x4682b4, "blue" => 0x0000ff, "navy" => 0x000080,
    "royalblue" => 0x4169e1, "purple" => 0x800080, "violet" => 0xee82ee, "magenta" => 0xff00ff,
    "fuchsia" => 0xff00ff, "orchid" => 0xda70d6, "pink" => 0xffc0cb, "hotpink" => 0xff69b4,
    "brown" => 0xa52a2a, "chocolate" => 0xd2691e, "tan" => 0xd2b48c, "beige" => 0xf5f5dc,
    "maroon" => 0x800000, "indigo" => 0x4b0082,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid color '{0}': expected a color name, #rgb or #rrggbb")]
pub struct ColorParseError(pub String);

/// A packed 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const DEFAULT: Color = Self::WHITE;

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn from_hex(value: u32) -> Self {
        Self(value & 0xffffff)
    }

    pub fn hex(self) -> u32 {
        self.0
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// Decodes `#rgb`, `#rrggbb` or a color name. Names are case-insensitive.
    pub fn decode(text: &str) -> Result<Self, ColorParseError> {
        let trimmed = text.trim();
        let invalid = || ColorParseError(text.to_string());

        if let Some(digits) = trimmed.strip_prefix('#') {
            if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            return match digits.len() {
                6 => u32::from_str_radix(digits, 16)
                    .map(Self)
                    .map_err(|_| invalid()),
                3 => {
                    let short = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
                    let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                    Ok(Self((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
                }
                _ => Err(invalid()),
            };
        }

        NAMED_COLORS
            .get(trimmed.to_ascii_lowercase().as_str())
            .map(|value| Self(*value))
            .ok_or_else(invalid)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::decode(&text).map_err(serde::de::Error::custom)
    }
}
