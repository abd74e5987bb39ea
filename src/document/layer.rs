use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Color;

/// Layout floor for text wrapping width, in document units.
pub const MIN_LAYER_WIDTH: f64 = 20.0;
const MIN_FONT_SIZE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[serde(rename = "normal")]
    Normal,
    #[default]
    #[serde(rename = "bold")]
    Bold,
    #[serde(rename = "italic")]
    Italic,
    #[serde(rename = "bold italic")]
    BoldItalic,
}

impl FontStyle {
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::BoldItalic => "bold italic",
        }
    }

    pub const fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    pub const fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// One text overlay. Coordinates are in background-native units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width: f64,
    pub draggable: bool,
    pub font_family: String,
    pub font_size: f64,
    pub font_style: FontStyle,
    pub fill: Color,
    pub opacity: f64,
    pub align: TextAlign,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
}

impl TextLayer {
    pub fn new(id: LayerId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width: 200.0,
            draggable: true,
            font_family: "Roboto".to_string(),
            font_size: 48.0,
            font_style: FontStyle::Bold,
            fill: Color::BLACK,
            opacity: 1.0,
            align: TextAlign::Left,
            shadow_color: None,
            shadow_blur: None,
            shadow_offset_x: None,
            shadow_offset_y: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = clamp_width(width);
        self
    }

    pub fn has_unit_scale(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow_color.is_some()
    }
}

pub fn clamp_width(width: f64) -> f64 {
    if width.is_nan() {
        MIN_LAYER_WIDTH
    } else {
        width.max(MIN_LAYER_WIDTH)
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

fn clamp_font_size(size: f64) -> f64 {
    if size.is_nan() {
        MIN_FONT_SIZE
    } else {
        size.max(MIN_FONT_SIZE)
    }
}

/// Partial property update for a layer; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub width: Option<f64>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_style: Option<FontStyle>,
    pub fill: Option<Color>,
    pub opacity: Option<f64>,
    pub align: Option<TextAlign>,
    pub shadow_color: Option<Option<Color>>,
    pub shadow_blur: Option<Option<f64>>,
    pub shadow_offset_x: Option<Option<f64>>,
    pub shadow_offset_y: Option<Option<f64>>,
}

impl LayerPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch with invariant clamping. Returns whether anything changed.
    pub fn apply(&self, layer: &mut TextLayer) -> bool {
        let before = layer.clone();
        if let Some(text) = &self.text {
            layer.text.clone_from(text);
        }
        if let Some(x) = self.x {
            layer.x = x;
        }
        if let Some(y) = self.y {
            layer.y = y;
        }
        if let Some(rotation) = self.rotation {
            layer.rotation = rotation;
        }
        if let Some(scale_x) = self.scale_x {
            layer.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            layer.scale_y = scale_y;
        }
        if let Some(width) = self.width {
            layer.width = clamp_width(width);
        }
        if let Some(font_family) = &self.font_family {
            layer.font_family.clone_from(font_family);
        }
        if let Some(font_size) = self.font_size {
            layer.font_size = clamp_font_size(font_size);
        }
        if let Some(font_style) = self.font_style {
            layer.font_style = font_style;
        }
        if let Some(fill) = self.fill {
            layer.fill = fill;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = clamp_opacity(opacity);
        }
        if let Some(align) = self.align {
            layer.align = align;
        }
        if let Some(shadow_color) = self.shadow_color {
            layer.shadow_color = shadow_color;
        }
        if let Some(shadow_blur) = self.shadow_blur {
            layer.shadow_blur = shadow_blur.map(|blur| blur.max(0.0));
        }
        if let Some(shadow_offset_x) = self.shadow_offset_x {
            layer.shadow_offset_x = shadow_offset_x;
        }
        if let Some(shadow_offset_y) = self.shadow_offset_y {
            layer.shadow_offset_y = shadow_offset_y;
        }
        *layer != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_serializes_with_snapshot_field_names() {
        let layer = TextLayer::new(LayerId(7), "hello").at(10.0, 20.0);
        let value = serde_json::to_value(&layer).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["scaleX"], 1.0);
        assert_eq!(value["fontFamily"], "Roboto");
        assert_eq!(value["fontStyle"], "bold");
        assert_eq!(value["fill"], "#000000");
        assert_eq!(value["align"], "left");
        assert!(value.get("shadowColor").is_none());
    }

    #[test]
    fn font_style_accepts_combined_variant() {
        let style: FontStyle = serde_json::from_str("\"bold italic\"").unwrap();
        assert_eq!(style, FontStyle::BoldItalic);
        assert!(style.is_bold());
        assert!(style.is_italic());
    }

    #[test]
    fn patch_clamps_width_opacity_and_font_size() {
        let mut layer = TextLayer::new(LayerId(1), "a");
        let patch = LayerPatch {
            width: Some(4.0),
            opacity: Some(1.7),
            font_size: Some(-3.0),
            ..LayerPatch::default()
        };

        assert!(patch.apply(&mut layer));
        assert_eq!(layer.width, MIN_LAYER_WIDTH);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.font_size, 1.0);
    }

    #[test]
    fn patch_reports_no_change_for_identical_values() {
        let mut layer = TextLayer::new(LayerId(1), "same");
        assert!(!LayerPatch::text("same").apply(&mut layer));
        assert!(!LayerPatch::default().apply(&mut layer));
        assert!(LayerPatch::default().is_empty());
    }

    #[test]
    fn patch_can_set_and_clear_shadow() {
        let mut layer = TextLayer::new(LayerId(1), "a");
        let patch = LayerPatch {
            shadow_color: Some(Some(Color::WHITE)),
            shadow_blur: Some(Some(4.0)),
            ..LayerPatch::default()
        };
        assert!(patch.apply(&mut layer));
        assert!(layer.has_shadow());

        let clear = LayerPatch {
            shadow_color: Some(None),
            ..LayerPatch::default()
        };
        assert!(clear.apply(&mut layer));
        assert!(!layer.has_shadow());
    }
}
