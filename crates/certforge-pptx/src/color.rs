//! Text color resolution.
//!
//! A color arrives in one of three modes: a named swatch, a decimal
//! `r,g,b` triplet, or a `#RRGGBB` hex string. Malformed text never fails
//! the run; it resolves to black and carries a warning for the caller to
//! surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An RGB color, every channel in 0..=255 by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorSpec {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorSpec {
    /// Fallback for unusable input
    pub const BLACK: ColorSpec = ColorSpec::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Six uppercase hex digits, as DrawingML `a:srgbClr` expects
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Fixed palette offered for the name text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swatch {
    #[serde(alias = "negro")]
    Black,
    #[serde(alias = "azul")]
    Blue,
    #[serde(alias = "rojo")]
    Red,
    #[serde(alias = "verde")]
    Green,
    #[serde(alias = "gris", alias = "grey")]
    Gray,
}

impl Swatch {
    /// Every swatch in display order
    pub const ALL: [Swatch; 5] = [
        Swatch::Black,
        Swatch::Blue,
        Swatch::Red,
        Swatch::Green,
        Swatch::Gray,
    ];

    pub fn color(self) -> ColorSpec {
        match self {
            Swatch::Black => ColorSpec::new(0, 0, 0),
            Swatch::Blue => ColorSpec::new(0, 0, 180),
            Swatch::Red => ColorSpec::new(180, 0, 0),
            Swatch::Green => ColorSpec::new(0, 140, 0),
            Swatch::Gray => ColorSpec::new(90, 90, 90),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Swatch::Black => "black",
            Swatch::Blue => "blue",
            Swatch::Red => "red",
            Swatch::Green => "green",
            Swatch::Gray => "gray",
        }
    }
}

impl FromStr for Swatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "black" | "negro" => Ok(Swatch::Black),
            "blue" | "azul" => Ok(Swatch::Blue),
            "red" | "rojo" => Ok(Swatch::Red),
            "green" | "verde" => Ok(Swatch::Green),
            "gray" | "grey" | "gris" => Ok(Swatch::Gray),
            other => Err(format!(
                "unknown color '{}' (expected one of: black, blue, red, green, gray)",
                other
            )),
        }
    }
}

/// Malformed color text, recovered by falling back to black
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidColorInput {
    #[error("invalid RGB value '{0}': expected three integers 0-255 separated by commas; using black")]
    Rgb(String),

    #[error("invalid hex color '{0}': expected #RRGGBB; using black")]
    Hex(String),
}

/// User color choice, one mode at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "kebab-case")]
pub enum ColorInput {
    Named(Swatch),
    RgbText(String),
    HexText(String),
}

impl Default for ColorInput {
    fn default() -> Self {
        ColorInput::Named(Swatch::Black)
    }
}

/// Outcome of resolving a [`ColorInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorResolution {
    pub color: ColorSpec,
    pub warning: Option<InvalidColorInput>,
}

impl ColorInput {
    /// Resolve to a color; never fails
    pub fn resolve(&self) -> ColorResolution {
        let (color, warning) = match self {
            ColorInput::Named(swatch) => (Some(swatch.color()), None),
            ColorInput::RgbText(text) => (
                parse_rgb_text(text),
                Some(InvalidColorInput::Rgb(text.clone())),
            ),
            ColorInput::HexText(text) => (
                parse_hex_text(text),
                Some(InvalidColorInput::Hex(text.clone())),
            ),
        };

        match color {
            Some(color) => ColorResolution {
                color,
                warning: None,
            },
            None => ColorResolution {
                color: ColorSpec::BLACK,
                warning,
            },
        }
    }
}

/// Parse `"r, g, b"` with each component in 0..=255
pub fn parse_rgb_text(text: &str) -> Option<ColorSpec> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b] => Some(ColorSpec::new(
            parse_channel(r)?,
            parse_channel(g)?,
            parse_channel(b)?,
        )),
        _ => None,
    }
}

fn parse_channel(text: &str) -> Option<u8> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<u8>().ok()
}

/// Parse `"#RRGGBB"`, case-insensitive
pub fn parse_hex_text(text: &str) -> Option<ColorSpec> {
    let digits = text.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(ColorSpec::new(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_swatches() {
        assert_eq!(
            ColorInput::Named(Swatch::Blue).resolve().color,
            ColorSpec::new(0, 0, 180)
        );
        assert_eq!(Swatch::Gray.color(), ColorSpec::new(90, 90, 90));
        assert_eq!(Swatch::ALL.len(), 5);
        assert!(ColorInput::Named(Swatch::Red).resolve().warning.is_none());
    }

    #[test]
    fn test_swatch_from_str() {
        assert_eq!("Azul".parse::<Swatch>(), Ok(Swatch::Blue));
        assert_eq!("grey".parse::<Swatch>(), Ok(Swatch::Gray));
        assert!("purple".parse::<Swatch>().is_err());
    }

    #[test]
    fn test_rgb_text() {
        let resolved = ColorInput::RgbText("34, 139,34".to_string()).resolve();
        assert_eq!(resolved.color, ColorSpec::new(34, 139, 34));
        assert!(resolved.warning.is_none());
    }

    #[test]
    fn test_rgb_text_invalid_falls_back_to_black() {
        for bad in ["256,0,0", "-1,0,0", "1,2", "1,2,3,4", "a,b,c", "", "1.5,2,3"] {
            let resolved = ColorInput::RgbText(bad.to_string()).resolve();
            assert_eq!(resolved.color, ColorSpec::BLACK, "input {:?}", bad);
            assert_eq!(resolved.warning, Some(InvalidColorInput::Rgb(bad.to_string())));
        }
    }

    #[test]
    fn test_hex_text() {
        assert_eq!(parse_hex_text("#228B22"), Some(ColorSpec::new(34, 139, 34)));
        assert_eq!(parse_hex_text("#228b22"), Some(ColorSpec::new(34, 139, 34)));
        assert_eq!(parse_hex_text("#FFFFFF"), Some(ColorSpec::new(255, 255, 255)));
    }

    #[test]
    fn test_hex_text_invalid_falls_back_to_black() {
        for bad in ["228B22", "#228B2", "#228B22F", "#GGGGGG", "#", ""] {
            let resolved = ColorInput::HexText(bad.to_string()).resolve();
            assert_eq!(resolved.color, ColorSpec::BLACK, "input {:?}", bad);
            assert!(resolved.warning.is_some());
        }
    }

    #[test]
    fn test_to_hex_and_display() {
        let color = ColorSpec::new(34, 139, 34);
        assert_eq!(color.to_hex(), "228B22");
        assert_eq!(color.to_string(), "#228B22");
        assert_eq!(ColorSpec::new(0, 0, 180).to_hex(), "0000B4");
    }

    #[test]
    fn test_color_input_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            color: ColorInput,
        }

        let named: Wrapper = toml::from_str(r#"color = { mode = "named", value = "verde" }"#).unwrap();
        assert_eq!(named.color, ColorInput::Named(Swatch::Green));

        let hex: Wrapper =
            toml::from_str(r##"color = { mode = "hex-text", value = "#228B22" }"##).unwrap();
        assert_eq!(hex.color, ColorInput::HexText("#228B22".to_string()));

        let unknown = toml::from_str::<Wrapper>(r#"color = { mode = "named", value = "purple" }"#);
        assert!(unknown.is_err());
    }
}
