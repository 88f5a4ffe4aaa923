//! Click and hover selection with geometric adjacency highlighting.
//!
//! [`SelectionEngine`] owns a [`SelectionState`] and derives a [`StyleMap`]
//! from it against the current [`Scene`]. A relation and an entity are
//! adjacent when their bounding boxes overlap; touching edges count.

use indexmap::IndexMap;
use log::{debug, trace, warn};

use erdview_core::{
    color::Color,
    geometry::Bounds,
    scene::{EntityId, RelationId, Scene, ShapeId},
};

/// Which kind of shape, if any, is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    None,
    Entity,
    Relation,
}

/// Selection and hover state.
///
/// At most one shape is selected. Hover is only tracked while nothing is
/// selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    None { hovered: Option<ShapeId> },
    Entity(EntityId),
    Relation(RelationId),
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::None { hovered: None }
    }
}

impl SelectionState {
    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::None { .. } => SelectionMode::None,
            Self::Entity(_) => SelectionMode::Entity,
            Self::Relation(_) => SelectionMode::Relation,
        }
    }

    pub fn selected(&self) -> Option<ShapeId> {
        match self {
            Self::None { .. } => None,
            Self::Entity(id) => Some(ShapeId::Entity(id.clone())),
            Self::Relation(id) => Some(ShapeId::Relation(id.clone())),
        }
    }

    pub fn selected_entity(&self) -> Option<&EntityId> {
        match self {
            Self::Entity(id) => Some(id),
            _ => None,
        }
    }

    pub fn selected_relation(&self) -> Option<&RelationId> {
        match self {
            Self::Relation(id) => Some(id),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<&ShapeId> {
        match self {
            Self::None { hovered } => hovered.as_ref(),
            _ => None,
        }
    }
}

/// What a click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Shape(ShapeId),
    Background,
}

/// Presentation of one shape.
///
/// `stroke_width` and `stroke_color` are `None` when the shape keeps the
/// stroke it was rendered with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    opacity: f32,
    scale: f32,
    drop_shadow: bool,
    stroke_width: Option<f32>,
    stroke_color: Option<Color>,
}

impl ShapeStyle {
    pub const NEUTRAL: Self = Self {
        opacity: 1.0,
        scale: 1.0,
        drop_shadow: false,
        stroke_width: None,
        stroke_color: None,
    };

    const DIMMED: Self = Self {
        opacity: 0.3,
        ..Self::NEUTRAL
    };

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn drop_shadow(&self) -> bool {
        self.drop_shadow
    }

    pub fn stroke_width(&self) -> Option<f32> {
        self.stroke_width
    }

    pub fn stroke_color(&self) -> Option<Color> {
        self.stroke_color
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    fn faded(opacity: f32, scale: f32) -> Self {
        Self {
            opacity,
            scale,
            ..Self::NEUTRAL
        }
    }

    fn stroked(opacity: f32, width: f32, color: Option<Color>) -> Self {
        Self {
            opacity,
            stroke_width: Some(width),
            stroke_color: color,
            ..Self::NEUTRAL
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Style for every shape of a scene, in scene order (entities first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    styles: IndexMap<ShapeId, ShapeStyle>,
}

impl StyleMap {
    /// Style of `shape`; shapes not in the map are neutral.
    pub fn get(&self, shape: &ShapeId) -> ShapeStyle {
        self.styles.get(shape).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShapeId, &ShapeStyle)> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn is_all_neutral(&self) -> bool {
        self.styles.values().all(ShapeStyle::is_neutral)
    }

    /// Shapes whose style is not neutral.
    pub fn highlighted(&self) -> impl Iterator<Item = &ShapeId> {
        self.styles
            .iter()
            .filter(|(_, style)| !style.is_neutral())
            .map(|(shape, _)| shape)
    }

    fn insert(&mut self, shape: ShapeId, style: ShapeStyle) {
        self.styles.insert(shape, style);
    }
}

/// Returns true if two boxes overlap or touch.
///
/// Degenerate boxes (non-finite coordinates, negative extents) are never
/// adjacent to anything.
///
/// # Examples
///
/// ```
/// # use erdview::selection::is_adjacent;
/// # use erdview_core::geometry::Bounds;
/// let relation = Bounds::new(0.0, 0.0, 100.0, 10.0);
/// assert!(is_adjacent(&relation, &Bounds::new(50.0, -5.0, 20.0, 20.0)));
/// assert!(!is_adjacent(&relation, &Bounds::new(500.0, 500.0, 10.0, 10.0)));
/// ```
pub fn is_adjacent(a: &Bounds, b: &Bounds) -> bool {
    match a.overlaps(b) {
        Ok(overlaps) => overlaps,
        Err(err) => {
            trace!(err:%; "Adjacency check failed, treating as not adjacent");
            false
        }
    }
}

/// Click-driven selection state machine.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    state: SelectionState,
    accent: Color,
}

impl SelectionEngine {
    /// Creates an engine with nothing selected, highlighting with `accent`.
    pub fn new(accent: Color) -> Self {
        Self {
            state: SelectionState::default(),
            accent,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn accent(&self) -> Color {
        self.accent
    }

    /// Applies a click. Clicks on shapes not in `scene` are ignored.
    ///
    /// Returns true if the state changed.
    pub fn click(&mut self, scene: &Scene, target: &ClickTarget) -> bool {
        let next = match target {
            ClickTarget::Background => SelectionState::default(),
            ClickTarget::Shape(shape) if !scene.contains(shape) => {
                warn!(shape:% = shape; "Ignoring click on unknown shape");
                return false;
            }
            ClickTarget::Shape(ShapeId::Entity(id)) => SelectionState::Entity(id.clone()),
            ClickTarget::Shape(ShapeId::Relation(id)) => SelectionState::Relation(id.clone()),
        };

        if next == self.state {
            return false;
        }
        debug!(from:? = self.state.mode(), to:? = next.mode(); "Selection changed");
        self.state = next;
        true
    }

    /// Starts hovering `shape`. Has no effect while something is selected.
    pub fn pointer_enter(&mut self, scene: &Scene, shape: &ShapeId) {
        if !scene.contains(shape) {
            trace!(shape:% = shape; "Ignoring hover on unknown shape");
            return;
        }
        if let SelectionState::None { hovered } = &mut self.state {
            *hovered = Some(shape.clone());
        }
    }

    /// Ends hovering `shape`.
    pub fn pointer_leave(&mut self, shape: &ShapeId) {
        if let SelectionState::None { hovered } = &mut self.state {
            if hovered.as_ref() == Some(shape) {
                *hovered = None;
            }
        }
    }

    /// Clears selection and hover.
    pub fn reset(&mut self) {
        self.state = SelectionState::default();
    }

    /// Computes the style of every shape in `scene` for the current state.
    pub fn styles(&self, scene: &Scene) -> StyleMap {
        let mut styles = StyleMap::default();
        match &self.state {
            SelectionState::None { hovered } => {
                for entity in scene.entities() {
                    let shape = ShapeId::Entity(entity.id().clone());
                    let style = if hovered.as_ref() == Some(&shape) {
                        ShapeStyle::faded(0.9, 1.02)
                    } else {
                        ShapeStyle::NEUTRAL
                    };
                    styles.insert(shape, style);
                }
                for relation in scene.relations() {
                    let shape = ShapeId::Relation(relation.id().clone());
                    let style = if hovered.as_ref() == Some(&shape) {
                        ShapeStyle::stroked(0.8, 2.0, None)
                    } else {
                        ShapeStyle::NEUTRAL
                    };
                    styles.insert(shape, style);
                }
            }
            SelectionState::Entity(selected) => {
                let selected_bounds = scene.entity(selected).map(|entity| entity.bounds());
                for entity in scene.entities() {
                    let style = if entity.id() == selected {
                        ShapeStyle {
                            drop_shadow: true,
                            ..ShapeStyle::faded(1.0, 1.05)
                        }
                    } else {
                        ShapeStyle::NEUTRAL
                    };
                    styles.insert(ShapeId::Entity(entity.id().clone()), style);
                }
                for relation in scene.relations() {
                    let adjacent = selected_bounds
                        .is_some_and(|bounds| is_adjacent(&relation.bounds(), &bounds));
                    let style = if adjacent {
                        ShapeStyle::stroked(1.0, 2.5, Some(self.accent))
                    } else {
                        ShapeStyle::DIMMED
                    };
                    styles.insert(ShapeId::Relation(relation.id().clone()), style);
                }
            }
            SelectionState::Relation(selected) => {
                let selected_bounds = scene.relation(selected).map(|relation| relation.bounds());
                for entity in scene.entities() {
                    let adjacent = selected_bounds
                        .is_some_and(|bounds| is_adjacent(&bounds, &entity.bounds()));
                    let style = if adjacent {
                        ShapeStyle::faded(0.9, 1.03)
                    } else {
                        ShapeStyle::faded(0.4, 1.0)
                    };
                    styles.insert(ShapeId::Entity(entity.id().clone()), style);
                }
                for relation in scene.relations() {
                    let style = if relation.id() == selected {
                        ShapeStyle::stroked(1.0, 3.0, Some(self.accent))
                    } else {
                        ShapeStyle::DIMMED
                    };
                    styles.insert(ShapeId::Relation(relation.id().clone()), style);
                }
            }
        }
        styles
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(Color::new("#007bff").expect("default accent color is valid"))
    }
}

#[cfg(test)]
mod tests {
    use erdview_core::{
        geometry::Size,
        scene::{Entity, Relation},
    };

    use super::*;

    /// USERS and ORDERS joined by `places`, PRODUCTS off on its own.
    fn scene() -> Scene {
        Scene::new(
            Size::new(600.0, 300.0),
            vec![
                Entity::new("USERS", "Users", Bounds::new(0.0, 0.0, 100.0, 80.0)),
                Entity::new("ORDERS", "Orders", Bounds::new(200.0, 0.0, 100.0, 80.0)),
                Entity::new("PRODUCTS", "Products", Bounds::new(450.0, 200.0, 100.0, 80.0)),
            ],
            vec![
                Relation::new("places", Bounds::new(99.0, 35.0, 102.0, 10.0)),
                Relation::new("stocks", Bounds::new(500.0, 150.0, 10.0, 51.0)),
            ],
        )
    }

    fn entity(id: &str) -> ShapeId {
        ShapeId::entity(id)
    }

    fn relation(id: &str) -> ShapeId {
        ShapeId::relation(id)
    }

    #[test]
    fn test_adjacency_examples() {
        let relation = Bounds::new(0.0, 0.0, 100.0, 10.0);
        assert!(is_adjacent(&relation, &Bounds::new(50.0, -5.0, 20.0, 20.0)));
        assert!(!is_adjacent(&relation, &Bounds::new(500.0, 500.0, 10.0, 10.0)));
        // touching edges count
        assert!(is_adjacent(&relation, &Bounds::new(100.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_adjacency_absorbs_degenerate_boxes() {
        let relation = Bounds::new(0.0, 0.0, 100.0, 10.0);
        assert!(!is_adjacent(&relation, &Bounds::new(f32::NAN, 0.0, 1.0, 1.0)));
        assert!(!is_adjacent(&relation, &Bounds::new(10.0, 0.0, -5.0, 1.0)));
    }

    #[test]
    fn test_select_entity_highlights_adjacent_relations() {
        let scene = scene();
        let mut engine = SelectionEngine::default();

        assert!(engine.click(&scene, &ClickTarget::Shape(entity("USERS"))));
        assert_eq!(engine.state().mode(), SelectionMode::Entity);

        let styles = engine.styles(&scene);
        let users = styles.get(&entity("USERS"));
        assert_eq!(users.opacity(), 1.0);
        assert_eq!(users.scale(), 1.05);
        assert!(users.drop_shadow());

        let places = styles.get(&relation("places"));
        assert_eq!(places.opacity(), 1.0);
        assert_eq!(places.stroke_width(), Some(2.5));
        assert_eq!(places.stroke_color(), Some(engine.accent()));

        let stocks = styles.get(&relation("stocks"));
        assert_eq!(stocks.opacity(), 0.3);
        assert_eq!(stocks.stroke_width(), None);

        assert!(styles.get(&entity("ORDERS")).is_neutral());
        assert!(styles.get(&entity("PRODUCTS")).is_neutral());
    }

    #[test]
    fn test_select_relation_highlights_adjacent_entities() {
        let scene = scene();
        let mut engine = SelectionEngine::default();
        engine.click(&scene, &ClickTarget::Shape(relation("places")));

        let styles = engine.styles(&scene);
        let places = styles.get(&relation("places"));
        assert_eq!(places.stroke_width(), Some(3.0));
        assert_eq!(places.stroke_color(), Some(engine.accent()));
        assert_eq!(styles.get(&relation("stocks")).opacity(), 0.3);

        for id in ["USERS", "ORDERS"] {
            let style = styles.get(&entity(id));
            assert_eq!(style.opacity(), 0.9);
            assert_eq!(style.scale(), 1.03);
        }
        let products = styles.get(&entity("PRODUCTS"));
        assert_eq!(products.opacity(), 0.4);
        assert_eq!(products.scale(), 1.0);
    }

    #[test]
    fn test_background_click_resets() {
        let scene = scene();
        let mut engine = SelectionEngine::default();
        engine.click(&scene, &ClickTarget::Shape(entity("USERS")));

        assert!(engine.click(&scene, &ClickTarget::Background));
        assert_eq!(engine.state(), &SelectionState::None { hovered: None });
        assert_eq!(engine.state().selected(), None);

        let styles = engine.styles(&scene);
        assert_eq!(styles.len(), 5);
        assert!(styles.is_all_neutral());
        assert!(styles.iter().all(|(_, style)| style.opacity() == 1.0));
    }

    #[test]
    fn test_select_a_then_b() {
        let scene = scene();
        let mut engine = SelectionEngine::default();
        engine.click(&scene, &ClickTarget::Shape(entity("USERS")));
        engine.click(&scene, &ClickTarget::Shape(entity("ORDERS")));

        let styles = engine.styles(&scene);
        let highlighted_entities: Vec<_> = styles
            .iter()
            .filter(|(shape, style)| matches!(shape, ShapeId::Entity(_)) && style.drop_shadow())
            .map(|(shape, _)| shape.clone())
            .collect();
        assert_eq!(highlighted_entities, [entity("ORDERS")]);
        assert!(styles.get(&entity("USERS")).is_neutral());
    }

    #[test]
    fn test_switch_between_entity_and_relation() {
        let scene = scene();
        let mut engine = SelectionEngine::default();
        engine.click(&scene, &ClickTarget::Shape(entity("USERS")));
        engine.click(&scene, &ClickTarget::Shape(relation("stocks")));
        assert_eq!(engine.state().selected_relation(), Some(&RelationId::new("stocks")));

        engine.click(&scene, &ClickTarget::Shape(entity("PRODUCTS")));
        assert_eq!(engine.state().selected_entity(), Some(&EntityId::new("PRODUCTS")));
    }

    #[test]
    fn test_unknown_shape_is_ignored() {
        let scene = scene();
        let mut engine = SelectionEngine::default();
        engine.click(&scene, &ClickTarget::Shape(entity("USERS")));

        assert!(!engine.click(&scene, &ClickTarget::Shape(entity("GHOST"))));
        assert_eq!(engine.state().selected_entity(), Some(&EntityId::new("USERS")));

        // repeated click is not a change
        assert!(!engine.click(&scene, &ClickTarget::Shape(entity("USERS"))));
    }

    #[test]
    fn test_hover_only_without_selection() {
        let scene = scene();
        let mut engine = SelectionEngine::default();

        engine.pointer_enter(&scene, &entity("ORDERS"));
        let orders = engine.styles(&scene).get(&entity("ORDERS"));
        assert_eq!(orders.opacity(), 0.9);
        assert_eq!(orders.scale(), 1.02);

        engine.pointer_enter(&scene, &relation("places"));
        let places = engine.styles(&scene).get(&relation("places"));
        assert_eq!(places.opacity(), 0.8);
        assert_eq!(places.stroke_width(), Some(2.0));

        engine.pointer_leave(&entity("ORDERS"));
        assert_eq!(engine.state().hovered(), Some(&relation("places")));
        engine.pointer_leave(&relation("places"));
        assert!(engine.styles(&scene).is_all_neutral());

        engine.click(&scene, &ClickTarget::Shape(entity("USERS")));
        engine.pointer_enter(&scene, &entity("PRODUCTS"));
        assert!(engine.styles(&scene).get(&entity("PRODUCTS")).is_neutral());
        assert_eq!(engine.state().hovered(), None);
    }

    #[test]
    fn test_selecting_clears_hover() {
        let scene = scene();
        let mut engine = SelectionEngine::default();
        engine.pointer_enter(&scene, &entity("ORDERS"));
        engine.click(&scene, &ClickTarget::Shape(entity("USERS")));
        engine.click(&scene, &ClickTarget::Background);

        assert_eq!(engine.state().hovered(), None);
    }
}
