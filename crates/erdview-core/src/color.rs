//! CSS colors for themes, highlight accents and export backgrounds.
//!
//! [`Color`] wraps the `color` crate's `DynamicColor`, so anything a style
//! sheet accepts (`"#007bff"`, `"rgb(0 123 255)"`, `"white"`) can come
//! straight from a config file.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};

/// A parsed CSS color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses a CSS color string.
    ///
    /// ```
    /// use erdview_core::color::Color;
    ///
    /// let accent = Color::new("#007bff").unwrap();
    /// assert_eq!(accent.to_rgba8(), [0, 123, 255, 255]);
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(css: &str) -> Result<Self, String> {
        DynamicColor::from_str(css)
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{css}`: {err}"))
    }

    /// Opacity between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// 8-bit sRGB components `[r, g, b, a]`, as a raster backend wants them.
    pub fn to_rgba8(self) -> [u8; 4] {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        [rgba.r, rgba.g, rgba.b, rgba.a]
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}
