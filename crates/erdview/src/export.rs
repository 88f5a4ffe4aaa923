//! Export of a scene to SVG or PNG files.
//!
//! [`ExportPipeline`] renders the bytes ([`vector`] or [`raster`]) and hands
//! them to a [`DownloadSink`] under `<filename>.<extension>`. Nothing is
//! delivered when rendering fails.

mod raster;
mod sink;
mod vector;

pub use raster::{RasterOptions, render_raster};
pub use sink::{DirectorySink, DownloadSink};
pub use vector::{XML_DECLARATION, render_vector, with_xml_declaration};

use std::{fmt, io, path::PathBuf, str::FromStr};

use log::info;
use thiserror::Error;

use erdview_core::scene::Scene;

use crate::{ErdViewError, adapter::DiagramAdapter};

/// Failure to export a scene.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to parse SVG")]
    SvgParse,

    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,

    #[error("failed to encode PNG")]
    PngEncode,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    /// Accepts `svg` or `png` in any case, with or without a leading dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.eq_ignore_ascii_case("svg") {
            Ok(Self::Svg)
        } else if trimmed.eq_ignore_ascii_case("png") {
            Ok(Self::Png)
        } else {
            Err(format!("unsupported export format `{s}`, expected svg or png"))
        }
    }
}

/// File name, without extension, for diagram `name` at `version`.
///
/// # Examples
///
/// ```
/// # use erdview::export::default_filename;
/// assert_eq!(default_filename("Counseling DB", "3"), "Counseling-DB-v3");
/// ```
pub fn default_filename(name: &str, version: &str) -> String {
    let name: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let name = if name.is_empty() { "diagram" } else { &name };
    format!("{name}-v{}", version.trim())
}

/// Renders scenes and delivers the result to a sink.
#[derive(Debug, Clone, Default)]
pub struct ExportPipeline {
    raster: RasterOptions,
}

impl ExportPipeline {
    pub fn new(raster: RasterOptions) -> Self {
        Self { raster }
    }

    pub fn raster_options(&self) -> &RasterOptions {
        &self.raster
    }

    /// Writes `<filename>.svg`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the sink fails.
    pub fn export_vector(
        &self,
        scene: &Scene,
        filename: &str,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ExportError> {
        let document = render_vector(scene);
        let path = sink.deliver(&file_name(filename, ExportFormat::Svg), document.as_bytes())?;
        info!(path = path.display().to_string(); "Exported SVG");
        Ok(path)
    }

    /// Writes `<filename>.png`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the markup cannot be parsed, the bitmap
    /// cannot be allocated or encoded, or the sink fails.
    pub fn export_raster(
        &self,
        scene: &Scene,
        filename: &str,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ExportError> {
        let png = render_raster(scene, &self.raster)?;
        let path = sink.deliver(&file_name(filename, ExportFormat::Png), &png)?;
        info!(path = path.display().to_string(), bytes = png.len(); "Exported PNG");
        Ok(path)
    }

    /// Exports in `format`.
    ///
    /// # Errors
    ///
    /// See [`export_vector`](Self::export_vector) and
    /// [`export_raster`](Self::export_raster).
    pub fn export(
        &self,
        scene: &Scene,
        filename: &str,
        format: ExportFormat,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ExportError> {
        match format {
            ExportFormat::Svg => self.export_vector(scene, filename, sink),
            ExportFormat::Png => self.export_raster(scene, filename, sink),
        }
    }

    /// Renders `description` with `adapter`, then exports the new scene.
    ///
    /// # Errors
    ///
    /// Returns [`ErdViewError::Render`] if the description cannot be
    /// rendered, or [`ErdViewError::Export`] if the export fails.
    pub fn export_from_description(
        &self,
        adapter: &dyn DiagramAdapter,
        description: &str,
        filename: &str,
        format: ExportFormat,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ErdViewError> {
        let scene = adapter.render_text(description)?;
        Ok(self.export(&scene, filename, format, sink)?)
    }
}

fn file_name(filename: &str, format: ExportFormat) -> String {
    format!("{filename}.{}", format.extension())
}
