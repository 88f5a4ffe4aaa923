//! erdview - interactive entity-relationship diagram viewer core.
//!
//! A [`DiagramAdapter`](adapter::DiagramAdapter) turns a textual description
//! into a [`Scene`](erdview_core::scene::Scene). A
//! [`DiagramView`](view::DiagramView) then drives pan and zoom, click
//! selection with adjacency highlighting, and text filtering over that scene,
//! and the [`export`] pipeline writes it out as SVG or PNG.

pub mod adapter;
pub mod config;
pub mod export;
pub mod filter;
pub mod selection;
pub mod view;
pub mod viewport;

mod error;

pub use erdview_core::{color, geometry, scene};

pub use error::ErdViewError;

use std::path::PathBuf;

use log::{debug, info};

use adapter::{DiagramAdapter, ErAdapter};
use config::AppConfig;
use export::{DownloadSink, ExportFormat, ExportPipeline, RasterOptions};
use scene::Scene;
use view::DiagramView;

/// Builder for rendering and exporting `erDiagram` descriptions.
///
/// # Examples
///
/// ```rust,no_run
/// use erdview::{DiagramBuilder, config::AppConfig, export::ExportFormat};
///
/// let source = "erDiagram\n  USERS ||--o{ ORDERS : places\n";
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let scene = builder.render(source).expect("Failed to render");
///
/// // Standalone SVG document
/// let svg = builder.render_svg(&scene);
/// assert!(svg.starts_with("<?xml"));
///
/// // PNG bytes at the configured scale
/// let png = builder.render_png(&scene).expect("Failed to rasterize");
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The adapter used by [`render`](Self::render).
    ///
    /// # Errors
    ///
    /// Returns [`ErdViewError::Config`] if a style color cannot be parsed.
    pub fn adapter(&self) -> Result<ErAdapter, ErdViewError> {
        ErAdapter::from_config(&self.config).map_err(ErdViewError::Config)
    }

    /// Render a description into a scene.
    ///
    /// # Errors
    ///
    /// Returns [`ErdViewError::Render`] for malformed or empty descriptions
    /// and [`ErdViewError::Config`] for invalid style colors.
    pub fn render(&self, source: &str) -> Result<Scene, ErdViewError> {
        info!("Rendering diagram");
        let scene = self.adapter()?.render_text(source)?;
        debug!(width = scene.width(), height = scene.height(); "Diagram rendered successfully");
        Ok(scene)
    }

    /// An interactive view with `scene` loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ErdViewError::Config`] if the accent color cannot be parsed.
    pub fn view(&self, scene: Scene) -> Result<DiagramView, ErdViewError> {
        let mut view = DiagramView::new(&self.config).map_err(ErdViewError::Config)?;
        view.load_scene(scene);
        Ok(view)
    }

    /// The export pipeline configured from the export section.
    ///
    /// # Errors
    ///
    /// Returns [`ErdViewError::Config`] if the background color cannot be
    /// parsed.
    pub fn pipeline(&self) -> Result<ExportPipeline, ErdViewError> {
        let raster = RasterOptions::from_config(&self.config).map_err(ErdViewError::Config)?;
        Ok(ExportPipeline::new(raster))
    }

    /// Standalone SVG document for `scene`.
    pub fn render_svg(&self, scene: &Scene) -> String {
        export::render_vector(scene)
    }

    /// PNG bytes for `scene` at the configured scale.
    ///
    /// # Errors
    ///
    /// Returns [`ErdViewError::Export`] if rasterization fails.
    pub fn render_png(&self, scene: &Scene) -> Result<Vec<u8>, ErdViewError> {
        let pipeline = self.pipeline()?;
        Ok(export::render_raster(scene, pipeline.raster_options())?)
    }

    /// Renders `source` and delivers `<filename>.<format>` to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an [`ErdViewError`] if rendering or exporting fails.
    pub fn export(
        &self,
        source: &str,
        filename: &str,
        format: ExportFormat,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ErdViewError> {
        let adapter = self.adapter()?;
        self.pipeline()?
            .export_from_description(&adapter, source, filename, format, sink)
    }
}
