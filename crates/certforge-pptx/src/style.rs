//! Text style applied to a substituted field.

use serde::{Deserialize, Serialize};

use crate::color::ColorSpec;
use crate::error::{PptxError, Result};

/// Fonts the converter is known to render
pub const FONT_ALLOW_LIST: [&str; 4] = [
    "DejaVu Sans",
    "DejaVu Serif",
    "Liberation Sans",
    "Liberation Serif",
];

/// Smallest accepted size in points
pub const MIN_SIZE_POINTS: u32 = 8;

/// Largest accepted size in points
pub const MAX_SIZE_POINTS: u32 = 72;

/// Default size for the name field
pub const DEFAULT_SIZE_POINTS: u32 = 25;

/// Font, size, weight, slant and color of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStyle {
    pub font_name: String,
    pub size_points: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: ColorSpec,
}

impl Default for FieldStyle {
    fn default() -> Self {
        Self {
            font_name: FONT_ALLOW_LIST[0].to_string(),
            size_points: DEFAULT_SIZE_POINTS,
            bold: true,
            italic: true,
            color: ColorSpec::BLACK,
        }
    }
}

impl FieldStyle {
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    pub fn with_size(mut self, size_points: u32) -> Self {
        self.size_points = size_points;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_color(mut self, color: ColorSpec) -> Self {
        self.color = color;
        self
    }

    /// Check the font against the allow-list and the size against its bounds
    pub fn validate(&self) -> Result<()> {
        if !FONT_ALLOW_LIST.contains(&self.font_name.as_str()) {
            return Err(PptxError::invalid_style(format!(
                "font '{}' is not available (choose one of: {})",
                self.font_name,
                FONT_ALLOW_LIST.join(", ")
            )));
        }

        if !(MIN_SIZE_POINTS..=MAX_SIZE_POINTS).contains(&self.size_points) {
            return Err(PptxError::invalid_style(format!(
                "size {} is outside {}..={}",
                self.size_points, MIN_SIZE_POINTS, MAX_SIZE_POINTS
            )));
        }

        Ok(())
    }

    /// Size in hundredths of a point, the unit of DrawingML `sz`
    pub fn size_hundredths(&self) -> u32 {
        self.size_points * 100
    }
}
