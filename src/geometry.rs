//! Shared geometric and color primitives used across document and editor modules.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Box reported by the surface while a handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color `{0}`")]
pub struct ParseColorError(pub String);

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb`; the leading `#` is optional.
    pub fn from_hex(value: &str) -> Result<Self, ParseColorError> {
        let digits = value.trim().trim_start_matches('#');
        let invalid = || ParseColorError(value.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |index: usize| channel(&digits[index..=index].repeat(2));
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Largest uniform scale at which `content` fits inside `container`.
pub fn fit_scale(container: Size, content: Size) -> f64 {
    let content_width = if content.width > 0.0 { content.width } else { 1.0 };
    let content_height = if content.height > 0.0 { content.height } else { 1.0 };
    (container.width / content_width).min(container.height / content_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_long_and_short_hex() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::new(255, 128, 0));
        assert_eq!(Color::from_hex("0f0").unwrap(), Color::new(0, 255, 0));
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn color_serializes_as_lowercase_hex_string() {
        let json = serde_json::to_string(&Color::new(255, 0, 171)).unwrap();
        assert_eq!(json, "\"#ff00ab\"");
        let parsed: Color = serde_json::from_str("\"#FF00AB\"").unwrap();
        assert_eq!(parsed, Color::new(255, 0, 171));
    }

    #[test]
    fn fit_scale_uses_tighter_axis() {
        let scale = fit_scale(Size::new(900.0, 600.0), Size::new(1800.0, 600.0));
        assert_eq!(scale, 0.5);
    }

    #[test]
    fn fit_scale_treats_empty_content_as_unit() {
        let scale = fit_scale(Size::new(300.0, 200.0), Size::new(0.0, 0.0));
        assert_eq!(scale, 200.0);
    }
}
