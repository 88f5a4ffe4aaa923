//! Configuration types for erdview.
//!
//! All types implement [`serde::Deserialize`] and every section falls back to
//! its defaults when omitted, so an empty TOML document is a valid config.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`ViewportConfig`] - Zoom limits and step.
//! - [`StyleConfig`] - Colors used for rendering and highlighting.
//! - [`LayoutConfig`] - Grid placement of entities.
//! - [`ExportConfig`] - Raster export settings.
//!
//! # Example
//!
//! ```
//! # use erdview::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.viewport().max_zoom(), 3.0);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use erdview_core::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    viewport: ViewportConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        viewport: ViewportConfig,
        style: StyleConfig,
        layout: LayoutConfig,
        export: ExportConfig,
    ) -> Self {
        Self {
            viewport,
            style,
            layout,
            export,
        }
    }

    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Checks every section and reports the first invalid value.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending key.
    pub fn validate(&self) -> Result<(), String> {
        self.viewport.validate()?;
        self.style.validate()?;
        self.layout.validate()?;
        self.export.validate()
    }
}

/// Zoom limits and step for the viewport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
            zoom_step: 0.1,
        }
    }
}

impl ViewportConfig {
    pub fn new(min_zoom: f32, max_zoom: f32, zoom_step: f32) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom_step,
        }
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Zoom change applied by a button press or a wheel notch.
    pub fn zoom_step(&self) -> f32 {
        self.zoom_step
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(format!(
                "viewport.min_zoom must be a positive number, got {}",
                self.min_zoom
            ));
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= self.min_zoom) {
            return Err(format!(
                "viewport.max_zoom must be at least min_zoom ({}), got {}",
                self.min_zoom, self.max_zoom
            ));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(format!(
                "viewport.zoom_step must be a positive number, got {}",
                self.zoom_step
            ));
        }
        Ok(())
    }
}

/// Colors used for rendering and highlighting, as CSS color strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    accent_color: String,
    background_color: String,
    entity_fill_color: String,
    entity_header_color: String,
    entity_stroke_color: String,
    relation_color: String,
    text_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            accent_color: "#007bff".to_string(),
            background_color: "white".to_string(),
            entity_fill_color: "#ffffff".to_string(),
            entity_header_color: "#e8f0fe".to_string(),
            entity_stroke_color: "#4a5568".to_string(),
            relation_color: "#4a5568".to_string(),
            text_color: "#1a202c".to_string(),
        }
    }
}

impl StyleConfig {
    /// Highlight color for selected and adjacent relations.
    pub fn accent_color(&self) -> Result<Color, String> {
        parse_color("style.accent_color", &self.accent_color)
    }

    /// Background painted behind the diagram and under raster exports.
    pub fn background_color(&self) -> Result<Color, String> {
        parse_color("style.background_color", &self.background_color)
    }

    pub fn entity_fill_color(&self) -> Result<Color, String> {
        parse_color("style.entity_fill_color", &self.entity_fill_color)
    }

    pub fn entity_header_color(&self) -> Result<Color, String> {
        parse_color("style.entity_header_color", &self.entity_header_color)
    }

    pub fn entity_stroke_color(&self) -> Result<Color, String> {
        parse_color("style.entity_stroke_color", &self.entity_stroke_color)
    }

    pub fn relation_color(&self) -> Result<Color, String> {
        parse_color("style.relation_color", &self.relation_color)
    }

    pub fn text_color(&self) -> Result<Color, String> {
        parse_color("style.text_color", &self.text_color)
    }

    fn validate(&self) -> Result<(), String> {
        self.accent_color()?;
        self.background_color()?;
        self.entity_fill_color()?;
        self.entity_header_color()?;
        self.entity_stroke_color()?;
        self.relation_color()?;
        self.text_color()?;
        Ok(())
    }
}

fn parse_color(key: &str, value: &str) -> Result<Color, String> {
    Color::new(value).map_err(|err| format!("Invalid {key} in config: {err}"))
}

/// Grid placement of entities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of grid columns; `0` picks `ceil(sqrt(n))`.
    columns: usize,
    horizontal_gap: f32,
    vertical_gap: f32,
    padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 0,
            horizontal_gap: 80.0,
            vertical_gap: 60.0,
            padding: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn new(columns: usize, horizontal_gap: f32, vertical_gap: f32, padding: f32) -> Self {
        Self {
            columns,
            horizontal_gap,
            vertical_gap,
            padding,
        }
    }

    /// Columns to use for `entity_count` entities.
    pub fn columns_for(&self, entity_count: usize) -> usize {
        if self.columns > 0 {
            return self.columns;
        }
        let mut columns = 1;
        while columns * columns < entity_count {
            columns += 1;
        }
        columns
    }

    pub fn horizontal_gap(&self) -> f32 {
        self.horizontal_gap
    }

    pub fn vertical_gap(&self) -> f32 {
        self.vertical_gap
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    fn validate(&self) -> Result<(), String> {
        for (key, value) in [
            ("layout.horizontal_gap", self.horizontal_gap),
            ("layout.vertical_gap", self.vertical_gap),
            ("layout.padding", self.padding),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{key} must be a non-negative number, got {value}"));
            }
        }
        Ok(())
    }
}

/// Raster export settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    raster_scale: f32,
    font_family: String,
    load_system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            raster_scale: 2.0,
            font_family: "Arial".to_string(),
            load_system_fonts: true,
        }
    }
}

impl ExportConfig {
    pub fn new(raster_scale: f32, font_family: impl Into<String>, load_system_fonts: bool) -> Self {
        Self {
            raster_scale,
            font_family: font_family.into(),
            load_system_fonts,
        }
    }

    /// Device pixels per scene unit in raster exports.
    pub fn raster_scale(&self) -> f32 {
        self.raster_scale
    }

    /// Font family used to resolve text in raster exports.
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Whether raster exports load the system font database.
    pub fn load_system_fonts(&self) -> bool {
        self.load_system_fonts
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.raster_scale.is_finite() && self.raster_scale > 0.0) {
            return Err(format!(
                "export.raster_scale must be a positive number, got {}",
                self.raster_scale
            ));
        }
        Ok(())
    }
}
