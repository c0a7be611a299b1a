use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use scantron_core::ValidationError;

/// 8-bit sRGB color. Serialized as `"#rrggbb"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const RED: Color = Color([255, 0, 0]);
    pub const GREEN: Color = Color([0, 128, 0]);
    pub const BLUE: Color = Color([0, 0, 255]);
    pub const YELLOW: Color = Color([255, 255, 0]);
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color {0:?} (expected a name or #rrggbb / #rgb)")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let named = match s.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::RED),
            "green" => Some(Color::GREEN),
            "blue" => Some(Color::BLUE),
            "yellow" => Some(Color::YELLOW),
            _ => None,
        };
        if let Some(c) = named {
            return Ok(c);
        }

        let err = || ColorParseError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Color([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            3 => {
                // #rgb expands each digit: #f80 == #ff8800
                Ok(Color([
                    channel(&hex[0..1])? * 17,
                    channel(&hex[1..2])? * 17,
                    channel(&hex[2..3])? * 17,
                ]))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// Visual parameters of a marker.
///
/// Defaults: radius 9 px, solid black fill and border, 2 px border,
/// opacity 0.7. Set `fill` or `border` to `None` to skip that part.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkStyle {
    /// Circle radius in reference-image pixels.
    pub radius: f32,
    pub fill: Option<Color>,
    pub border: Option<Color>,
    /// Border line width in pixels, centered on the circle outline.
    pub border_width: f32,
    /// Opacity applied to fill and border, in `[0, 1]`.
    pub opacity: f32,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            radius: 9.0,
            fill: Some(Color::BLACK),
            border: Some(Color::BLACK),
            border_width: 2.0,
            opacity: 0.7,
        }
    }
}

impl MarkStyle {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field, reason| Err(ValidationError::InvalidStyle { field, reason });
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return invalid("radius", "must be a positive finite number");
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return invalid("border_width", "must be a finite number >= 0");
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return invalid("opacity", "must be within [0, 1]");
        }
        Ok(())
    }

    /// Distance from the center beyond which the marker paints nothing.
    pub(crate) fn outer_extent(&self) -> f32 {
        let stroke = if self.border.is_some() {
            0.5 * self.border_width
        } else {
            0.0
        };
        self.radius + stroke + 1.0
    }
}
