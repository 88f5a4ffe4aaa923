//! Diagram adapters: textual description in, [`Scene`] out.
//!
//! The viewer core only depends on the [`DiagramAdapter`] trait. The
//! bundled [`ErAdapter`] accepts `erDiagram` descriptions, places entities
//! on a grid and draws the scene as SVG markup.

mod layout;
mod markup;

pub use markup::Theme;

use log::{debug, info};
use thiserror::Error;

use erdview_core::scene::{Entity, Relation, Scene};
use erdview_parser::ParseError;

use crate::config::{AppConfig, LayoutConfig};

/// Failure to turn a description into a scene.
///
/// Non-fatal: the host shows the problem and lets the user retry.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("diagram description contains no entities")]
    EmptyDiagram,
}

impl RenderError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

/// Renders a textual diagram description into a [`Scene`].
pub trait DiagramAdapter {
    /// Renders `description` into a fresh scene.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] for malformed or empty descriptions.
    fn render_text(&self, description: &str) -> Result<Scene, RenderError>;
}

/// Adapter for Mermaid-style `erDiagram` descriptions.
///
/// # Examples
///
/// ```
/// # use erdview::adapter::{DiagramAdapter, ErAdapter};
/// let adapter = ErAdapter::default();
/// let scene = adapter
///     .render_text("erDiagram\n  USERS ||--o{ ORDERS : places\n")
///     .unwrap();
///
/// assert_eq!(scene.entities().len(), 2);
/// assert_eq!(scene.relations().len(), 1);
/// assert!(scene.document().unwrap().contains("<svg"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErAdapter {
    layout: LayoutConfig,
    theme: Theme,
}

impl ErAdapter {
    pub fn new(layout: LayoutConfig, theme: Theme) -> Self {
        Self { layout, theme }
    }

    /// Builds an adapter from the layout and style sections of `config`.
    ///
    /// # Errors
    ///
    /// Returns a message if a configured color cannot be parsed.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        Ok(Self::new(
            config.layout().clone(),
            Theme::from_style(config.style())?,
        ))
    }
}

impl DiagramAdapter for ErAdapter {
    fn render_text(&self, description: &str) -> Result<Scene, RenderError> {
        info!("Rendering erDiagram description");

        let diagram = erdview_parser::parse(description)
            .map_err(|err| RenderError::new_parse_error(err, description))?;
        if diagram.is_empty() {
            return Err(RenderError::EmptyDiagram);
        }

        let placed = layout::layout_diagram(&diagram, &self.layout);
        debug!(
            entities = placed.entities().len(),
            relations = placed.relationships().len(),
            width = placed.size().width(),
            height = placed.size().height();
            "Diagram laid out"
        );

        let document = markup::render_document(&placed, &self.theme);

        let entities = placed
            .entities()
            .iter()
            .map(|entity| Entity::new(entity.name(), entity.name(), entity.bounds()))
            .collect();
        let relations = placed
            .relationships()
            .iter()
            .map(|routed| {
                Relation::from_path(routed.id(), routed.path().to_vec())
                    .with_label(routed.relationship().label())
            })
            .collect();

        Ok(Scene::new(placed.size(), entities, relations).with_document(document))
    }
}
