//! The rendered scene: entities and relations with their bounding boxes.
//!
//! A [`Scene`] is produced once per render by a diagram adapter and is never
//! mutated afterwards. A reload replaces the whole value. Everything the
//! viewer needs to know about the rendered diagram (hit testing, adjacency,
//! filtering, export) is answered from the scene rather than from live
//! rendered elements.
//!
//! # Identifiers
//!
//! Shapes are keyed by stable string ids. [`ShapeId`] joins the two id
//! spaces so a single delegated event stream can address either kind.

use std::fmt;

use crate::geometry::{Bounds, Point, Size};

/// Stable identifier of an [`Entity`] within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stable identifier of a [`Relation`] within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(String);

impl RelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of any shape in a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Entity(EntityId),
    Relation(RelationId),
}

impl ShapeId {
    /// Shorthand for an entity shape id.
    pub fn entity(id: impl Into<String>) -> Self {
        Self::Entity(EntityId::new(id))
    }

    /// Shorthand for a relation shape id.
    pub fn relation(id: impl Into<String>) -> Self {
        Self::Relation(RelationId::new(id))
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity:{id}"),
            Self::Relation(id) => write!(f, "relation:{id}"),
        }
    }
}

/// One diagram node, typically a database table.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    display_name: String,
    bounds: Bounds,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, display_name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            bounds,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The name shown in the diagram, used by text filtering.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<String> for RelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One diagram edge.
///
/// Only the rendered geometry of the edge is known; there are no endpoint
/// references. The optional `path` is the polyline the edge was drawn with
/// and is used when markup has to be synthesized from geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    id: RelationId,
    bounds: Bounds,
    label: Option<String>,
    path: Vec<Point>,
}

impl Relation {
    /// Creates a relation known only by its bounding box.
    pub fn new(id: impl Into<RelationId>, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            bounds,
            label: None,
            path: Vec::new(),
        }
    }

    /// Creates a relation from the polyline it is drawn with.
    ///
    /// The bounding box is the box of all path points. An empty path yields
    /// non-finite bounds, which later geometry queries report as an error.
    pub fn from_path(id: impl Into<RelationId>, path: Vec<Point>) -> Self {
        let bounds = Bounds::from_points(&path)
            .unwrap_or_else(|| Bounds::new(f32::NAN, f32::NAN, 0.0, 0.0));
        Self {
            id: id.into(),
            bounds,
            label: None,
            path,
        }
    }

    /// Attaches a label to the relation.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &RelationId {
        &self.id
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }
}

/// Vector geometry of one rendered diagram.
///
/// # Examples
///
/// ```
/// # use erdview_core::geometry::{Bounds, Point, Size};
/// # use erdview_core::scene::{Entity, Relation, Scene, ShapeId};
/// let scene = Scene::new(
///     Size::new(400.0, 300.0),
///     vec![
///         Entity::new("users", "Users", Bounds::new(20.0, 20.0, 100.0, 60.0)),
///         Entity::new("orders", "Orders", Bounds::new(220.0, 20.0, 100.0, 60.0)),
///     ],
///     vec![Relation::from_path(
///         "users-orders",
///         vec![Point::new(120.0, 50.0), Point::new(220.0, 50.0)],
///     )],
/// );
///
/// assert_eq!(scene.shape_at(Point::new(50.0, 50.0), 0.0), Some(ShapeId::entity("users")));
/// assert_eq!(scene.shape_at(Point::new(170.0, 51.0), 2.0), Some(ShapeId::relation("users-orders")));
/// assert_eq!(scene.shape_at(Point::new(170.0, 200.0), 2.0), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    size: Size,
    entities: Vec<Entity>,
    relations: Vec<Relation>,
    document: Option<String>,
}

impl Scene {
    pub fn new(size: Size, entities: Vec<Entity>, relations: Vec<Relation>) -> Self {
        Self {
            size,
            entities,
            relations,
            document: None,
        }
    }

    /// Attaches the vector markup the scene was rendered as.
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn width(&self) -> f32 {
        self.size.width()
    }

    pub fn height(&self) -> f32 {
        self.size.height()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// The rendered vector markup, if the adapter supplied one.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Returns true if the scene has no entities and no relations.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    pub fn relation(&self, id: &RelationId) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.id() == id)
    }

    /// Returns true if the shape exists in this scene.
    pub fn contains(&self, shape: &ShapeId) -> bool {
        self.shape_bounds(shape).is_some()
    }

    /// Bounding box of a shape, or `None` if the id is unknown.
    pub fn shape_bounds(&self, shape: &ShapeId) -> Option<Bounds> {
        match shape {
            ShapeId::Entity(id) => self.entity(id).map(Entity::bounds),
            ShapeId::Relation(id) => self.relation(id).map(Relation::bounds),
        }
    }

    /// Resolves a scene-space point to the topmost shape under it.
    ///
    /// Entities are drawn above relations, and later shapes above earlier
    /// ones. Relations are often thin lines, so their boxes are grown by
    /// `tolerance` on every side before testing.
    pub fn shape_at(&self, point: Point, tolerance: f32) -> Option<ShapeId> {
        if let Some(entity) = self
            .entities
            .iter()
            .rev()
            .find(|entity| entity.bounds().contains_point(point))
        {
            return Some(ShapeId::Entity(entity.id().clone()));
        }

        let tolerance = tolerance.max(0.0);
        self.relations
            .iter()
            .rev()
            .find(|relation| relation.bounds().inflate(tolerance).contains_point(point))
            .map(|relation| ShapeId::Relation(relation.id().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_table_scene() -> Scene {
        Scene::new(
            Size::new(400.0, 200.0),
            vec![
                Entity::new("users", "Users", Bounds::new(0.0, 0.0, 100.0, 80.0)),
                Entity::new("orders", "Orders", Bounds::new(200.0, 0.0, 100.0, 80.0)),
            ],
            vec![
                Relation::from_path(
                    "r1",
                    vec![Point::new(100.0, 40.0), Point::new(200.0, 40.0)],
                )
                .with_label("places"),
            ],
        )
    }

    #[test]
    fn test_scene_lookup() {
        let scene = two_table_scene();
        assert_eq!(scene.width(), 400.0);
        assert_eq!(scene.height(), 200.0);
        assert_eq!(
            scene.entity(&EntityId::new("orders")).map(Entity::display_name),
            Some("Orders")
        );
        assert!(scene.entity(&EntityId::new("missing")).is_none());
        assert_eq!(
            scene.relation(&RelationId::new("r1")).and_then(Relation::label),
            Some("places")
        );
        assert!(scene.contains(&ShapeId::entity("users")));
        assert!(!scene.contains(&ShapeId::relation("r2")));
    }

    #[test]
    fn test_relation_from_path_bounds() {
        let relation = Relation::from_path(
            "r",
            vec![Point::new(10.0, 20.0), Point::new(60.0, 20.0), Point::new(60.0, 70.0)],
        );
        let bounds = relation.bounds();
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_x(), 60.0);
        assert_eq!(bounds.max_y(), 70.0);
        assert_eq!(relation.path().len(), 3);
    }

    #[test]
    fn test_relation_from_empty_path_is_degenerate() {
        let relation = Relation::from_path("r", Vec::new());
        assert!(relation.bounds().validated().is_err());
    }

    #[test]
    fn test_shape_at_prefers_entities() {
        let scene = two_table_scene();
        // The relation endpoint touches the entity edge; the entity wins.
        assert_eq!(
            scene.shape_at(Point::new(100.0, 40.0), 3.0),
            Some(ShapeId::entity("users"))
        );
        assert_eq!(
            scene.shape_at(Point::new(150.0, 42.0), 3.0),
            Some(ShapeId::relation("r1"))
        );
        assert_eq!(scene.shape_at(Point::new(150.0, 42.0), 0.0), None);
    }

    #[test]
    fn test_document_is_optional() {
        let scene = two_table_scene();
        assert!(scene.document().is_none());

        let scene = scene.with_document("<svg/>");
        assert_eq!(scene.document(), Some("<svg/>"));
    }

    #[test]
    fn test_shape_id_display() {
        assert_eq!(ShapeId::entity("users").to_string(), "entity:users");
        assert_eq!(ShapeId::relation("r1").to_string(), "relation:r1");
    }
}
