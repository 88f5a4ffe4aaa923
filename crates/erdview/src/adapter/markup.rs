//! SVG markup for a laid-out ER diagram.
//!
//! Every entity and relation is drawn inside its own group carrying a
//! `data-id` attribute with the shape's scene id, so a host can map DOM
//! events and styles back to [`ShapeId`](erdview_core::scene::ShapeId)s.
//! Relations are drawn before entities, so entities sit on top.

use svg::{node::Text as SvgText, node::element as svg_element};

use erdview_core::{color::Color, geometry::Point};
use erdview_parser::Cardinality;

use super::layout::{
    CELL_PADDING, ErLayout, FONT_SIZE, HEADER_HEIGHT, PlacedEntity, ROW_HEIGHT,
    RoutedRelationship, keys_text, text_width,
};
use crate::config::StyleConfig;

const LABEL_FONT_SIZE: f32 = 12.0;
const STROKE_WIDTH: f32 = 1.5;
const CORNER_RADIUS: f32 = 4.0;
const MARKER_DISTANCE: f32 = 18.0;
const MARKER_OFFSET: f32 = 10.0;

/// Resolved colors used to draw a diagram.
#[derive(Debug, Clone)]
pub struct Theme {
    background: Color,
    entity_fill: Color,
    entity_header: Color,
    entity_stroke: Color,
    relation: Color,
    text: Color,
}

impl Theme {
    /// Resolves every color of the style section.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first color that cannot be parsed.
    pub fn from_style(style: &StyleConfig) -> Result<Self, String> {
        Ok(Self {
            background: style.background_color()?,
            entity_fill: style.entity_fill_color()?,
            entity_header: style.entity_header_color()?,
            entity_stroke: style.entity_stroke_color()?,
            relation: style.relation_color()?,
            text: style.text_color()?,
        })
    }

    pub fn background(&self) -> Color {
        self.background
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_style(&StyleConfig::default()).expect("default style colors are valid")
    }
}

fn text(content: &str, position: Point, font_size: f32, color: Color) -> svg_element::Text {
    svg_element::Text::new("")
        .set("x", position.x())
        .set("y", position.y())
        .set("dominant-baseline", "central")
        .set("font-size", font_size)
        .set("fill", color.to_string())
        .add(SvgText::new(content))
}

fn render_entity(entity: &PlacedEntity<'_>, theme: &Theme) -> svg_element::Group {
    let bounds = entity.bounds();
    let attributes = entity.decl().attributes();
    let header_height = if attributes.is_empty() {
        bounds.height()
    } else {
        HEADER_HEIGHT
    };

    let body = svg_element::Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", bounds.width())
        .set("height", bounds.height())
        .set("rx", CORNER_RADIUS)
        .set("fill", theme.entity_fill.to_string())
        .set("stroke", theme.entity_stroke.to_string())
        .set("stroke-width", STROKE_WIDTH);

    let header = svg_element::Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", bounds.width())
        .set("height", header_height)
        .set("rx", CORNER_RADIUS)
        .set("fill", theme.entity_header.to_string())
        .set("stroke", theme.entity_stroke.to_string())
        .set("stroke-width", STROKE_WIDTH);

    let title = text(
        entity.name(),
        Point::new(bounds.center().x(), bounds.min_y() + header_height / 2.0),
        FONT_SIZE,
        theme.text,
    )
    .set("text-anchor", "middle")
    .set("font-weight", "bold");

    let mut group = svg_element::Group::new()
        .set("class", "erd-entity")
        .set("data-id", entity.name())
        .add(body)
        .add(header)
        .add(title);

    let columns = entity.columns();
    for (index, attribute) in attributes.iter().enumerate() {
        let y = bounds.min_y() + HEADER_HEIGHT + ROW_HEIGHT * (index as f32 + 0.5);
        let at = |offset: f32| Point::new(bounds.min_x() + offset, y);

        group = group
            .add(text(
                attribute.data_type(),
                at(columns.data_type),
                FONT_SIZE,
                theme.text,
            ))
            .add(text(attribute.name(), at(columns.name), FONT_SIZE, theme.text));

        let keys = keys_text(attribute);
        if !keys.is_empty() {
            group = group.add(
                text(&keys, at(columns.keys), FONT_SIZE, theme.text).set("font-weight", "bold"),
            );
        }
        if let Some(comment) = attribute.comment() {
            group = group.add(
                text(comment, at(columns.comment), FONT_SIZE, theme.text)
                    .set("fill-opacity", 0.7)
                    .set("font-style", "italic"),
            );
        }
    }

    group
}

/// Position of a cardinality marker near `end`, on the side facing `next`.
fn marker_position(end: Point, next: Point) -> Point {
    let dx = next.x() - end.x();
    let dy = next.y() - end.y();
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return end;
    }
    let (ux, uy) = (dx / length, dy / length);
    Point::new(
        end.x() + ux * MARKER_DISTANCE - uy * MARKER_OFFSET,
        end.y() + uy * MARKER_DISTANCE + ux * MARKER_OFFSET,
    )
}

fn render_marker(cardinality: Cardinality, end: Point, next: Point, theme: &Theme) -> svg_element::Text {
    text(
        &cardinality.to_string(),
        marker_position(end, next),
        LABEL_FONT_SIZE,
        theme.relation,
    )
    .set("class", "erd-cardinality")
    .set("text-anchor", "middle")
}

fn render_relation(routed: &RoutedRelationship<'_>, theme: &Theme) -> svg_element::Group {
    let relationship = routed.relationship();
    let path = routed.path();

    let points = path
        .iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect::<Vec<_>>()
        .join(" ");
    let mut line = svg_element::Polyline::new()
        .set("points", points)
        .set("fill", "none")
        .set("stroke", theme.relation.to_string())
        .set("stroke-width", STROKE_WIDTH);
    if !relationship.is_identifying() {
        line = line.set("stroke-dasharray", "6 4");
    }

    let mut group = svg_element::Group::new()
        .set("class", "erd-relation")
        .set("data-id", routed.id())
        .add(line);

    if let ([first, second, ..], [.., before_last, last]) = (path, path) {
        group = group
            .add(render_marker(
                relationship.left_cardinality(),
                *first,
                *second,
                theme,
            ))
            .add(render_marker(
                relationship.right_cardinality(),
                *last,
                *before_last,
                theme,
            ));
    }

    let label = relationship.label();
    if !label.is_empty() {
        let anchor = routed.label_anchor();
        let width = text_width(label, LABEL_FONT_SIZE) + CELL_PADDING;
        let height = LABEL_FONT_SIZE + CELL_PADDING / 2.0;
        let backdrop = svg_element::Rectangle::new()
            .set("x", anchor.x() - width / 2.0)
            .set("y", anchor.y() - height / 2.0)
            .set("width", width)
            .set("height", height)
            .set("fill", theme.background.to_string());
        group = group.add(backdrop).add(
            text(label, anchor, LABEL_FONT_SIZE, theme.text)
                .set("class", "erd-label")
                .set("text-anchor", "middle"),
        );
    }

    group
}

/// Draws the whole diagram as a standalone SVG document (no XML declaration).
pub(super) fn render_document(layout: &ErLayout<'_>, theme: &Theme) -> String {
    let size = layout.size();

    let background = svg_element::Rectangle::new()
        .set("class", "erd-background")
        .set("width", size.width())
        .set("height", size.height())
        .set("fill", theme.background.to_string())
        .set("fill-opacity", theme.background.alpha());

    let relations = layout
        .relationships()
        .iter()
        .fold(
            svg_element::Group::new().set("class", "erd-relations"),
            |group, routed| group.add(render_relation(routed, theme)),
        );

    let entities = layout
        .entities()
        .iter()
        .fold(
            svg_element::Group::new().set("class", "erd-entities"),
            |group, entity| group.add(render_entity(entity, theme)),
        );

    svg::Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set(
            "viewBox",
            format!("0 0 {} {}", size.width(), size.height()),
        )
        .set("width", size.width())
        .set("height", size.height())
        .set("font-family", "Arial, Helvetica, sans-serif")
        .add(background)
        .add(relations)
        .add(entities)
        .to_string()
}
