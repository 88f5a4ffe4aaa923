//! The view-owned state of one displayed diagram.
//!
//! [`DiagramView`] holds the current [`Scene`] together with viewport,
//! selection and filter state. Hosts forward every input through a single
//! [`DiagramView::handle`] call keyed by [`ShapeId`], then read back the
//! transform, styles and visibility to apply.

use log::{debug, info, trace};

use erdview_core::{
    geometry::{Point, Size},
    scene::{Scene, ShapeId},
};

use crate::{
    config::AppConfig,
    filter::{FilterEngine, FilterState, VisibilitySet},
    selection::{ClickTarget, SelectionEngine, SelectionState, StyleMap},
    viewport::{PointerTarget, Transform, ViewportController, ViewportState},
};

/// Extra reach, in scene units, when hit-testing thin relation lines.
const HIT_TOLERANCE: f32 = 4.0;

/// Input forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Click already resolved to a shape or the background.
    Click(ClickTarget),
    /// Click at a container position, resolved against the scene.
    ClickAt(Point),
    PointerEnter(ShapeId),
    PointerLeave(ShapeId),
    PointerDown { position: Point, target: PointerTarget },
    PointerMove(Point),
    PointerUp,
    Wheel { delta_y: f32 },
    ZoomIn,
    ZoomOut,
    ResetView,
    /// Keyboard nudge.
    Pan(Point),
    Resize(Size),
    SetQuery(String),
    SetShowOnlySelected(bool),
    ToggleShowOnlySelected,
}

/// Scene plus all interactive state of one viewer.
#[derive(Debug, Clone, Default)]
pub struct DiagramView {
    scene: Option<Scene>,
    container: Size,
    viewport: ViewportController,
    selection: SelectionEngine,
    filter: FilterEngine,
}

impl DiagramView {
    /// Creates an empty view configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns a message if the accent color cannot be parsed.
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        Ok(Self {
            scene: None,
            container: Size::default(),
            viewport: ViewportController::new(config.viewport()),
            selection: SelectionEngine::new(config.style().accent_color()?),
            filter: FilterEngine::default(),
        })
    }

    /// Replaces the scene. Viewport and selection start over; the filter is
    /// kept.
    pub fn load_scene(&mut self, scene: Scene) {
        info!(
            entities = scene.entities().len(),
            relations = scene.relations().len();
            "Loading scene"
        );
        self.scene = Some(scene);
        self.viewport.reset();
        self.selection.reset();
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn filter(&self) -> &FilterState {
        self.filter.state()
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Transform to apply to the rendered scene.
    pub fn transform(&self) -> Transform {
        self.viewport.transform(self.container)
    }

    /// Current style of every shape; empty before a scene is loaded.
    pub fn styles(&self) -> StyleMap {
        self.scene
            .as_ref()
            .map(|scene| self.selection.styles(scene))
            .unwrap_or_default()
    }

    /// Shapes passing the filter; empty before a scene is loaded.
    pub fn visibility(&self) -> VisibilitySet {
        self.scene
            .as_ref()
            .map(|scene| self.filter.visibility(scene, self.selection.state()))
            .unwrap_or_default()
    }

    /// Shape under a container position, if any.
    pub fn shape_at(&self, position: Point) -> Option<ShapeId> {
        let scene = self.scene.as_ref()?;
        let point = self.transform().invert(position);
        scene.shape_at(point, HIT_TOLERANCE)
    }

    /// Applies one input event. Returns true if anything the host displays
    /// may have changed.
    pub fn handle(&mut self, event: ViewEvent) -> bool {
        trace!(event:?; "Handling view event");
        match event {
            ViewEvent::Click(target) => self.click(&target),
            ViewEvent::ClickAt(position) => {
                let target = self
                    .shape_at(position)
                    .map_or(ClickTarget::Background, ClickTarget::Shape);
                debug!(click:? = target; "Resolved click");
                self.click(&target)
            }
            ViewEvent::PointerEnter(shape) => match &self.scene {
                Some(scene) => {
                    self.selection.pointer_enter(scene, &shape);
                    true
                }
                None => false,
            },
            ViewEvent::PointerLeave(shape) => {
                self.selection.pointer_leave(&shape);
                true
            }
            ViewEvent::PointerDown { position, target } => {
                self.viewport.begin_pan(position, &target);
                false
            }
            ViewEvent::PointerMove(position) => {
                let panning = self.viewport.is_panning();
                self.viewport.update_pan(position);
                panning
            }
            ViewEvent::PointerUp => {
                self.viewport.end_pan();
                false
            }
            ViewEvent::Wheel { delta_y } => {
                self.viewport.wheel(delta_y);
                delta_y != 0.0
            }
            ViewEvent::ZoomIn => {
                self.viewport.zoom_in();
                true
            }
            ViewEvent::ZoomOut => {
                self.viewport.zoom_out();
                true
            }
            ViewEvent::ResetView => {
                self.viewport.reset();
                true
            }
            ViewEvent::Pan(delta) => {
                self.viewport.pan_by(delta);
                true
            }
            ViewEvent::Resize(size) => {
                self.container = size;
                true
            }
            ViewEvent::SetQuery(query) => {
                self.filter.set_query(query);
                true
            }
            ViewEvent::SetShowOnlySelected(flag) => {
                self.filter.set_show_only_selected(flag);
                true
            }
            ViewEvent::ToggleShowOnlySelected => {
                self.filter.toggle_show_only_selected();
                true
            }
        }
    }

    fn click(&mut self, target: &ClickTarget) -> bool {
        match &self.scene {
            Some(scene) => self.selection.click(scene, target),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use erdview_core::{
        geometry::Bounds,
        scene::{Entity, EntityId, Relation},
    };

    use super::*;
    use crate::selection::SelectionMode;

    fn scene() -> Scene {
        Scene::new(
            Size::new(400.0, 200.0),
            vec![
                Entity::new("users", "Users", Bounds::new(0.0, 0.0, 100.0, 80.0)),
                Entity::new("orders", "Orders", Bounds::new(300.0, 0.0, 100.0, 80.0)),
            ],
            vec![Relation::new("places", Bounds::new(99.0, 39.0, 202.0, 2.0))],
        )
    }

    fn loaded() -> DiagramView {
        let mut view = DiagramView::default();
        view.load_scene(scene());
        view.handle(ViewEvent::Resize(Size::new(400.0, 200.0)));
        view
    }

    #[test]
    fn test_events_without_scene_are_ignored() {
        let mut view = DiagramView::default();
        assert!(!view.handle(ViewEvent::Click(ClickTarget::Shape(ShapeId::entity("users")))));
        assert!(view.styles().is_empty());
        assert_eq!(view.visibility().visible_entity_count(), 0);
    }

    #[test]
    fn test_click_at_resolves_through_transform() {
        let mut view = loaded();
        assert!(view.handle(ViewEvent::ClickAt(Point::new(50.0, 40.0))));
        assert_eq!(view.selection().selected(), Some(ShapeId::entity("users")));

        // zoom 2 around the center: scene (200, 40) lands at (200, -20)
        view.handle(ViewEvent::Click(ClickTarget::Background));
        view.viewport.zoom_by(1.0);
        assert_eq!(view.shape_at(Point::new(200.0, 100.0)), None);
        assert_eq!(view.shape_at(Point::new(200.0, -20.0)), Some(ShapeId::relation("places")));

        view.handle(ViewEvent::ClickAt(Point::new(200.0, -20.0)));
        assert_eq!(view.selection().mode(), SelectionMode::Relation);
    }

    #[test]
    fn test_click_empty_area_clears_selection() {
        let mut view = loaded();
        view.handle(ViewEvent::Click(ClickTarget::Shape(ShapeId::entity("orders"))));
        view.handle(ViewEvent::ClickAt(Point::new(200.0, 190.0)));
        assert_eq!(view.selection(), &SelectionState::default());
    }

    #[test]
    fn test_drag_on_control_does_not_pan() {
        let mut view = loaded();
        view.handle(ViewEvent::PointerDown {
            position: Point::new(10.0, 10.0),
            target: PointerTarget::ZoomButton,
        });
        assert!(!view.handle(ViewEvent::PointerMove(Point::new(50.0, 50.0))));
        assert_eq!(view.viewport_state().pan(), Point::default());

        view.handle(ViewEvent::PointerDown {
            position: Point::new(10.0, 10.0),
            target: PointerTarget::Background,
        });
        assert!(view.handle(ViewEvent::PointerMove(Point::new(50.0, 30.0))));
        view.handle(ViewEvent::PointerUp);
        assert_eq!(view.viewport_state().pan(), Point::new(40.0, 20.0));
        assert_eq!(view.transform().to_css(), "translate(40px, 20px) scale(1)");
    }

    #[test]
    fn test_load_scene_resets_viewport_and_selection_but_keeps_filter() {
        let mut view = loaded();
        view.handle(ViewEvent::ZoomIn);
        view.handle(ViewEvent::Pan(Point::new(5.0, 5.0)));
        view.handle(ViewEvent::Click(ClickTarget::Shape(ShapeId::entity("users"))));
        view.handle(ViewEvent::SetQuery("ord".to_string()));

        view.load_scene(scene());

        assert_eq!(view.viewport_state(), ViewportState::default());
        assert_eq!(view.selection(), &SelectionState::default());
        assert_eq!(view.filter().query(), "ord");
        let visible: Vec<_> = view.visibility().entities().cloned().collect();
        assert_eq!(visible, [EntityId::new("orders")]);
    }

    #[test]
    fn test_filter_follows_selection() {
        let mut view = loaded();
        view.handle(ViewEvent::SetShowOnlySelected(true));
        assert_eq!(view.visibility().visible_entity_count(), 0);

        view.handle(ViewEvent::Click(ClickTarget::Shape(ShapeId::relation("places"))));
        assert_eq!(view.visibility().visible_entity_count(), 2);

        view.handle(ViewEvent::ToggleShowOnlySelected);
        assert!(!view.filter().show_only_selected());
    }

    #[test]
    fn test_hover_styles() {
        let mut view = loaded();
        view.handle(ViewEvent::PointerEnter(ShapeId::entity("users")));
        assert_eq!(view.styles().get(&ShapeId::entity("users")).scale(), 1.02);

        view.handle(ViewEvent::PointerLeave(ShapeId::entity("users")));
        assert!(view.styles().is_all_neutral());
    }
}
