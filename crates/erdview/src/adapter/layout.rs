//! Grid placement of entities and straight-line routing of relationships.
//!
//! Entities fill a grid row by row in order of first appearance. Each grid
//! column is as wide as its widest entity and each row as tall as its
//! tallest. Relationships are drawn border to border between entity
//! centers; a relationship from an entity to itself becomes a loop on the
//! entity's right side.
//!
//! Relationship endpoints sit slightly inside the entity boxes so the
//! relation's bounding box always overlaps both endpoints.

use erdview_core::geometry::{Bounds, Point, Size};
use erdview_parser::{Attribute, EntityDecl, ErDiagram, Relationship};

use crate::config::LayoutConfig;

pub(super) const FONT_SIZE: f32 = 14.0;
pub(super) const HEADER_HEIGHT: f32 = 32.0;
pub(super) const ROW_HEIGHT: f32 = 24.0;
pub(super) const CELL_PADDING: f32 = 12.0;

const CHAR_WIDTH_RATIO: f32 = 0.6;
const COLUMN_GAP: f32 = 16.0;
const MIN_ENTITY_WIDTH: f32 = 120.0;
const BODY_BOTTOM_PADDING: f32 = 8.0;
const EMPTY_ENTITY_HEIGHT: f32 = 40.0;
const EDGE_INSET: f32 = 1.0;
const LOOP_OFFSET: f32 = 30.0;
const LOOP_HALF_HEIGHT: f32 = 12.0;

/// Approximate rendered width of `text` at `font_size`.
pub(super) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO
}

/// Key markers of an attribute as drawn, e.g. `PK,FK`.
pub(super) fn keys_text(attribute: &Attribute) -> String {
    attribute
        .keys()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Horizontal offsets, relative to the entity's left edge, of the
/// type, name, keys and comment columns of attribute rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct RowColumns {
    pub data_type: f32,
    pub name: f32,
    pub keys: f32,
    pub comment: f32,
}

/// An entity with its position in the scene.
#[derive(Debug, Clone)]
pub(super) struct PlacedEntity<'a> {
    decl: &'a EntityDecl,
    bounds: Bounds,
    columns: RowColumns,
}

impl<'a> PlacedEntity<'a> {
    pub fn name(&self) -> &'a str {
        self.decl.name()
    }

    pub fn decl(&self) -> &'a EntityDecl {
        self.decl
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn columns(&self) -> RowColumns {
        self.columns
    }
}

/// A relationship with the polyline it is drawn along.
#[derive(Debug, Clone)]
pub(super) struct RoutedRelationship<'a> {
    id: String,
    relationship: &'a Relationship,
    path: Vec<Point>,
}

impl<'a> RoutedRelationship<'a> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn relationship(&self) -> &'a Relationship {
        self.relationship
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Where the label is drawn: the middle of the central segment.
    pub fn label_anchor(&self) -> Point {
        let mid = self.path.len() / 2;
        match (self.path.get(mid.saturating_sub(1)), self.path.get(mid)) {
            (Some(a), Some(b)) => a.midpoint(*b),
            (None, Some(p)) | (Some(p), None) => *p,
            (None, None) => Point::default(),
        }
    }
}

/// The placed diagram.
#[derive(Debug, Clone)]
pub(super) struct ErLayout<'a> {
    size: Size,
    entities: Vec<PlacedEntity<'a>>,
    relationships: Vec<RoutedRelationship<'a>>,
}

impl<'a> ErLayout<'a> {
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn entities(&self) -> &[PlacedEntity<'a>] {
        &self.entities
    }

    pub fn relationships(&self) -> &[RoutedRelationship<'a>] {
        &self.relationships
    }
}

struct Measured<'a> {
    decl: &'a EntityDecl,
    size: Size,
    columns: RowColumns,
}

fn column_width<F>(attributes: &[Attribute], text_of: F) -> f32
where
    F: Fn(&Attribute) -> String,
{
    attributes
        .iter()
        .map(|attribute| text_width(&text_of(attribute), FONT_SIZE))
        .fold(0.0_f32, f32::max)
}

fn measure(decl: &EntityDecl) -> Measured<'_> {
    let header_width = text_width(decl.name(), FONT_SIZE) + 2.0 * CELL_PADDING;

    let attributes = decl.attributes();
    let type_width = column_width(attributes, |a| a.data_type().to_string());
    let name_width = column_width(attributes, |a| a.name().to_string());
    let keys_width = column_width(attributes, keys_text);
    let comment_width = column_width(attributes, |a| a.comment().unwrap_or_default().to_string());

    let data_type = CELL_PADDING;
    let name = data_type + type_width + COLUMN_GAP;
    let keys = name + name_width + COLUMN_GAP;
    let comment = if keys_width > 0.0 {
        keys + keys_width + COLUMN_GAP
    } else {
        keys
    };
    let row_end = if comment_width > 0.0 {
        comment + comment_width
    } else if keys_width > 0.0 {
        keys + keys_width
    } else {
        name + name_width
    };

    let (width, height) = if decl.attributes().is_empty() {
        (header_width.max(MIN_ENTITY_WIDTH), EMPTY_ENTITY_HEIGHT)
    } else {
        (
            header_width.max(row_end + CELL_PADDING).max(MIN_ENTITY_WIDTH),
            HEADER_HEIGHT + decl.attributes().len() as f32 * ROW_HEIGHT + BODY_BOTTOM_PADDING,
        )
    };

    Measured {
        decl,
        size: Size::new(width, height),
        columns: RowColumns {
            data_type,
            name,
            keys,
            comment,
        },
    }
}

/// Point on the border of `bounds`, pulled `EDGE_INSET` inside, on the
/// segment from its center toward `toward`.
fn border_point(bounds: Bounds, toward: Point) -> Point {
    let center = bounds.center();
    let direction = toward.sub_point(center);
    if direction.is_zero() {
        return center;
    }

    let half_width = (bounds.width() / 2.0 - EDGE_INSET).max(0.0);
    let half_height = (bounds.height() / 2.0 - EDGE_INSET).max(0.0);
    let tx = if direction.x() != 0.0 {
        half_width / direction.x().abs()
    } else {
        f32::INFINITY
    };
    let ty = if direction.y() != 0.0 {
        half_height / direction.y().abs()
    } else {
        f32::INFINITY
    };

    center.add_point(direction.scale(tx.min(ty)))
}

fn route(from: Bounds, to: Bounds) -> Vec<Point> {
    if from == to {
        let x = from.max_x() - EDGE_INSET;
        let cy = from.center().y();
        let outer = from.max_x() + LOOP_OFFSET;
        return vec![
            Point::new(x, cy - LOOP_HALF_HEIGHT),
            Point::new(outer, cy - LOOP_HALF_HEIGHT),
            Point::new(outer, cy + LOOP_HALF_HEIGHT),
            Point::new(x, cy + LOOP_HALF_HEIGHT),
        ];
    }
    vec![
        border_point(from, to.center()),
        border_point(to, from.center()),
    ]
}

/// Places every entity of `diagram` and routes its relationships.
pub(super) fn layout_diagram<'a>(diagram: &'a ErDiagram, config: &LayoutConfig) -> ErLayout<'a> {
    let measured: Vec<Measured<'a>> = diagram.entities().map(measure).collect();
    let columns = config.columns_for(measured.len()).max(1);
    let rows = measured.len().div_ceil(columns);

    let mut column_widths = vec![0.0_f32; columns];
    let mut row_heights = vec![0.0_f32; rows];
    for (index, entity) in measured.iter().enumerate() {
        let (row, column) = (index / columns, index % columns);
        column_widths[column] = column_widths[column].max(entity.size.width());
        row_heights[row] = row_heights[row].max(entity.size.height());
    }

    let offsets = |sizes: &[f32], gap: f32| -> Vec<f32> {
        sizes
            .iter()
            .scan(config.padding(), |next, size| {
                let current = *next;
                *next += size + gap;
                Some(current)
            })
            .collect()
    };
    let column_x = offsets(&column_widths, config.horizontal_gap());
    let row_y = offsets(&row_heights, config.vertical_gap());

    let entities: Vec<PlacedEntity<'a>> = measured
        .into_iter()
        .enumerate()
        .map(|(index, entity)| {
            let (row, column) = (index / columns, index % columns);
            let x = column_x[column] + (column_widths[column] - entity.size.width()) / 2.0;
            let top_left = Point::new(x, row_y[row]);
            PlacedEntity {
                decl: entity.decl,
                bounds: Bounds::new_from_top_left(top_left, entity.size),
                columns: entity.columns,
            }
        })
        .collect();

    let relationships: Vec<RoutedRelationship<'a>> = diagram
        .relationships()
        .iter()
        .enumerate()
        .filter_map(|(index, relationship)| {
            let from = entities.get(diagram.entity_index(relationship.left())?)?;
            let to = entities.get(diagram.entity_index(relationship.right())?)?;
            Some(RoutedRelationship {
                id: format!("rel-{index}"),
                relationship,
                path: route(from.bounds(), to.bounds()),
            })
        })
        .collect();

    let content = entities
        .iter()
        .map(PlacedEntity::bounds)
        .chain(
            relationships
                .iter()
                .filter_map(|routed| Bounds::from_points(routed.path())),
        )
        .reduce(|acc, bounds| acc.merge(&bounds))
        .unwrap_or_default();
    let size = Size::new(
        content.max_x() + config.padding(),
        content.max_y() + config.padding(),
    );

    ErLayout {
        size,
        entities,
        relationships,
    }
}
