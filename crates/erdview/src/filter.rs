//! Text and selection based visibility.
//!
//! Filtering never touches the [`Scene`]; it produces a [`VisibilitySet`]
//! the host uses to show or hide shapes.

use indexmap::IndexSet;
use log::debug;

use erdview_core::scene::{EntityId, RelationId, Scene, ShapeId};

use crate::selection::{SelectionState, is_adjacent};

/// Query text and the "show only selection" flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    query: String,
    show_only_selected: bool,
}

impl FilterState {
    pub fn new(query: impl Into<String>, show_only_selected: bool) -> Self {
        Self {
            query: query.into(),
            show_only_selected,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn show_only_selected(&self) -> bool {
        self.show_only_selected
    }

    /// Returns true if the filter can hide anything.
    pub fn is_active(&self) -> bool {
        self.show_only_selected || !self.query.trim().is_empty()
    }
}

/// Entities and relations that pass the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    entities: IndexSet<EntityId>,
    relations: IndexSet<RelationId>,
}

impl VisibilitySet {
    pub fn is_visible(&self, shape: &ShapeId) -> bool {
        match shape {
            ShapeId::Entity(id) => self.entities.contains(id),
            ShapeId::Relation(id) => self.relations.contains(id),
        }
    }

    pub fn is_entity_visible(&self, id: &EntityId) -> bool {
        self.entities.contains(id)
    }

    pub fn is_relation_visible(&self, id: &RelationId) -> bool {
        self.relations.contains(id)
    }

    /// Visible entities, in scene order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter()
    }

    /// Visible relations, in scene order.
    pub fn relations(&self) -> impl Iterator<Item = &RelationId> {
        self.relations.iter()
    }

    pub fn visible_entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn visible_relation_count(&self) -> usize {
        self.relations.len()
    }
}

/// Computes which shapes of `scene` pass `filter` given the current selection.
///
/// An entity is visible when its display name contains the trimmed query,
/// ignoring case, and, with `show_only_selected`, it is the selected entity
/// or touches the selected relation. With `show_only_selected`, a relation is
/// visible when it touches a visible entity; otherwise every relation is.
///
/// # Examples
///
/// ```
/// # use erdview::filter::{FilterState, compute_visibility};
/// # use erdview::selection::SelectionState;
/// # use erdview_core::{geometry::{Bounds, Size}, scene::{Entity, Scene, ShapeId}};
/// let scene = Scene::new(
///     Size::new(300.0, 100.0),
///     vec![
///         Entity::new("users", "Users", Bounds::new(0.0, 0.0, 80.0, 40.0)),
///         Entity::new("orders", "Orders", Bounds::new(200.0, 0.0, 80.0, 40.0)),
///     ],
///     vec![],
/// );
///
/// let filter = FilterState::new("ord", false);
/// let visible = compute_visibility(&scene, &filter, &SelectionState::default());
///
/// assert!(visible.is_visible(&ShapeId::entity("orders")));
/// assert!(!visible.is_visible(&ShapeId::entity("users")));
/// ```
pub fn compute_visibility(
    scene: &Scene,
    filter: &FilterState,
    selection: &SelectionState,
) -> VisibilitySet {
    let query = filter.query.trim().to_lowercase();
    let selected_relation = selection
        .selected_relation()
        .and_then(|id| scene.relation(id))
        .map(|relation| relation.bounds());

    let entities: IndexSet<EntityId> = scene
        .entities()
        .iter()
        .filter(|entity| {
            query.is_empty() || entity.display_name().to_lowercase().contains(&query)
        })
        .filter(|entity| {
            !filter.show_only_selected
                || selection.selected_entity() == Some(entity.id())
                || selected_relation.is_some_and(|bounds| is_adjacent(&bounds, &entity.bounds()))
        })
        .map(|entity| entity.id().clone())
        .collect();

    let relations: IndexSet<RelationId> = scene
        .relations()
        .iter()
        .filter(|relation| {
            !filter.show_only_selected
                || scene.entities().iter().any(|entity| {
                    entities.contains(entity.id())
                        && is_adjacent(&relation.bounds(), &entity.bounds())
                })
        })
        .map(|relation| relation.id().clone())
        .collect();

    VisibilitySet {
        entities,
        relations,
    }
}

/// Owns the [`FilterState`] and recomputes visibility on demand.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    state: FilterState,
}

impl FilterEngine {
    pub fn new(state: FilterState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
        debug!(query = self.state.query.as_str(); "Filter query changed");
    }

    pub fn set_show_only_selected(&mut self, show_only_selected: bool) {
        self.state.show_only_selected = show_only_selected;
        debug!(show_only_selected; "Filter flag changed");
    }

    pub fn toggle_show_only_selected(&mut self) {
        self.set_show_only_selected(!self.state.show_only_selected);
    }

    /// Clears the query and the flag.
    pub fn clear(&mut self) {
        self.state = FilterState::default();
    }

    pub fn visibility(&self, scene: &Scene, selection: &SelectionState) -> VisibilitySet {
        compute_visibility(scene, &self.state, selection)
    }
}

#[cfg(test)]
mod tests {
    use erdview_core::{
        geometry::{Bounds, Size},
        scene::{Entity, Relation},
    };

    use super::*;

    fn scene() -> Scene {
        Scene::new(
            Size::new(600.0, 300.0),
            vec![
                Entity::new("users", "Users", Bounds::new(0.0, 0.0, 100.0, 80.0)),
                Entity::new("orders", "Orders", Bounds::new(200.0, 0.0, 100.0, 80.0)),
                Entity::new("products", "Products", Bounds::new(450.0, 200.0, 100.0, 80.0)),
            ],
            vec![
                Relation::new("places", Bounds::new(99.0, 35.0, 102.0, 10.0)),
                Relation::new("stocks", Bounds::new(500.0, 150.0, 10.0, 51.0)),
            ],
        )
    }

    fn visible_entities(set: &VisibilitySet) -> Vec<&str> {
        set.entities().map(EntityId::as_str).collect()
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let scene = scene();
        let visible = compute_visibility(&scene, &FilterState::default(), &SelectionState::default());

        assert_eq!(visible.visible_entity_count(), 3);
        assert_eq!(visible.visible_relation_count(), 2);

        let blank = FilterState::new("   ", false);
        let visible = compute_visibility(&scene, &blank, &SelectionState::default());
        assert_eq!(visible.visible_entity_count(), 3);
    }

    #[test]
    fn test_query_is_case_insensitive_and_trimmed() {
        let scene = scene();
        let filter = FilterState::new("  ORD ", false);
        let visible = compute_visibility(&scene, &filter, &SelectionState::default());

        assert_eq!(visible_entities(&visible), ["orders"]);
    }

    #[test]
    fn test_unmatched_query_keeps_relations() {
        let scene = Scene::new(
            Size::new(300.0, 100.0),
            vec![
                Entity::new("users", "Users", Bounds::new(0.0, 0.0, 80.0, 40.0)),
                Entity::new("orders", "Orders", Bounds::new(200.0, 0.0, 80.0, 40.0)),
            ],
            vec![Relation::new("places", Bounds::new(79.0, 15.0, 122.0, 10.0))],
        );
        let filter = FilterState::new("xyz", false);
        let visible = compute_visibility(&scene, &filter, &SelectionState::default());

        assert!(!visible.is_visible(&ShapeId::entity("users")));
        assert!(!visible.is_visible(&ShapeId::entity("orders")));
        assert!(visible.is_visible(&ShapeId::relation("places")));
    }

    #[test]
    fn test_show_only_selected_entity() {
        let scene = scene();
        let filter = FilterState::new("", true);
        let selection = SelectionState::Entity(EntityId::new("users"));
        let visible = compute_visibility(&scene, &filter, &selection);

        assert_eq!(visible_entities(&visible), ["users"]);
        assert!(visible.is_relation_visible(&RelationId::new("places")));
        assert!(!visible.is_relation_visible(&RelationId::new("stocks")));
    }

    #[test]
    fn test_show_only_selected_relation() {
        let scene = scene();
        let filter = FilterState::new("", true);
        let selection = SelectionState::Relation(RelationId::new("places"));
        let visible = compute_visibility(&scene, &filter, &selection);

        assert_eq!(visible_entities(&visible), ["users", "orders"]);
        assert!(visible.is_relation_visible(&RelationId::new("places")));
        assert!(!visible.is_relation_visible(&RelationId::new("stocks")));
    }

    #[test]
    fn test_show_only_selected_combines_with_query() {
        let scene = scene();
        let filter = FilterState::new("user", true);
        let selection = SelectionState::Relation(RelationId::new("places"));
        let visible = compute_visibility(&scene, &filter, &selection);

        assert_eq!(visible_entities(&visible), ["users"]);
        // still touches a visible entity
        assert!(visible.is_relation_visible(&RelationId::new("places")));
    }

    #[test]
    fn test_show_only_selected_without_selection_hides_all() {
        let scene = scene();
        let filter = FilterState::new("", true);
        let visible = compute_visibility(&scene, &filter, &SelectionState::default());

        assert_eq!(visible.visible_entity_count(), 0);
        assert_eq!(visible.visible_relation_count(), 0);
    }

    #[test]
    fn test_engine_updates() {
        let scene = scene();
        let mut engine = FilterEngine::default();
        assert!(!engine.state().is_active());

        engine.set_query("prod");
        assert!(engine.state().is_active());
        let visible = engine.visibility(&scene, &SelectionState::default());
        assert_eq!(visible_entities(&visible), ["products"]);

        engine.toggle_show_only_selected();
        assert!(engine.state().show_only_selected());
        engine.clear();
        assert_eq!(engine.state(), &FilterState::default());
    }
}
