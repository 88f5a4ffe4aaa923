//! Pan and zoom state for the displayed scene.
//!
//! [`ViewportController`] turns button, wheel and drag input into a
//! [`Transform`] that the host applies to the rendered scene. The transform
//! origin is the container center.

use log::{debug, trace};

use erdview_core::{
    geometry::{Point, Size},
    scene::ShapeId,
};

use crate::config::ViewportConfig;

/// What the pointer was over when a drag started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas.
    Background,
    /// A diagram shape.
    Shape(ShapeId),
    ZoomButton,
    FilterToggle,
    FilterPanel,
}

impl PointerTarget {
    /// Returns true for viewer controls, which never start a pan.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::ZoomButton | Self::FilterToggle | Self::FilterPanel
        )
    }
}

/// Zoom factor and pan offset currently applied to the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    zoom: f32,
    pan: Point,
}

impl ViewportState {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

/// Affine transform `translate(pan) scale(zoom)` around a fixed origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    translate: Point,
    scale: f32,
    origin: Point,
}

impl Transform {
    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// CSS `transform` value, paired with `transform-origin: center`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use erdview::{config::ViewportConfig, viewport::ViewportController};
    /// # use erdview_core::geometry::{Point, Size};
    /// let mut viewport = ViewportController::new(&ViewportConfig::default());
    /// viewport.pan_by(Point::new(10.0, -4.0));
    /// viewport.zoom_by(0.5);
    ///
    /// let transform = viewport.transform(Size::new(800.0, 600.0));
    /// assert_eq!(transform.to_css(), "translate(10px, -4px) scale(1.5)");
    /// ```
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate.x(),
            self.translate.y(),
            self.scale
        )
    }

    /// SVG `transform` attribute with the origin folded in.
    pub fn to_svg_attribute(&self) -> String {
        let shifted = self.origin.add_point(self.translate);
        format!(
            "translate({} {}) scale({}) translate({} {})",
            shifted.x(),
            shifted.y(),
            self.scale,
            -self.origin.x(),
            -self.origin.y()
        )
    }

    /// Maps a scene point to container coordinates.
    pub fn apply(&self, point: Point) -> Point {
        point
            .sub_point(self.origin)
            .scale(self.scale)
            .add_point(self.origin)
            .add_point(self.translate)
    }

    /// Maps a container point back to scene coordinates.
    pub fn invert(&self, point: Point) -> Point {
        point
            .sub_point(self.origin)
            .sub_point(self.translate)
            .scale(1.0 / self.scale)
            .add_point(self.origin)
    }
}

/// Owns zoom and pan state.
///
/// Zoom changes from [`zoom_by`](Self::zoom_by) and [`wheel`](Self::wheel)
/// are accumulated as an unclamped sum and clamped when read, so the
/// resulting zoom does not depend on the order of the deltas.
#[derive(Debug, Clone)]
pub struct ViewportController {
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
    zoom_delta: f32,
    pan: Point,
    drag_origin: Option<Point>,
}

impl ViewportController {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            min_zoom: config.min_zoom(),
            max_zoom: config.max_zoom(),
            zoom_step: config.zoom_step(),
            zoom_delta: 0.0,
            pan: Point::default(),
            drag_origin: None,
        }
    }

    /// Effective zoom factor within the configured limits.
    pub fn zoom(&self) -> f32 {
        (1.0 + self.zoom_delta).max(self.min_zoom).min(self.max_zoom)
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            zoom: self.zoom(),
            pan: self.pan,
        }
    }

    /// Zoom-in button: one step up.
    pub fn zoom_in(&mut self) {
        self.zoom_by(self.zoom_step);
        debug!(zoom = self.zoom(); "Zoom in");
    }

    /// Zoom-out button: one step down.
    pub fn zoom_out(&mut self) {
        self.zoom_by(-self.zoom_step);
        debug!(zoom = self.zoom(); "Zoom out");
    }

    /// Adds `delta` to the zoom.
    pub fn zoom_by(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.zoom_delta += delta;
        trace!(delta, zoom = self.zoom(); "Zoom by");
    }

    /// Scrolling down zooms out one step, scrolling up zooms in one step.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.zoom_by(-self.zoom_step);
        } else if delta_y < 0.0 {
            self.zoom_by(self.zoom_step);
        }
    }

    /// Back to zoom 1 with no pan. Also ends a drag in progress.
    pub fn reset(&mut self) {
        self.zoom_delta = 0.0;
        self.pan = Point::default();
        self.drag_origin = None;
        debug!("Viewport reset");
    }

    /// Starts a drag at `pointer`. Returns false, and does nothing, when the
    /// pointer went down on a viewer control.
    pub fn begin_pan(&mut self, pointer: Point, target: &PointerTarget) -> bool {
        if target.is_control() {
            trace!(control:? = target; "Pan suppressed on control");
            return false;
        }
        self.drag_origin = Some(self.pan.sub_point(pointer));
        true
    }

    /// Moves the pan with the pointer while a drag is active.
    pub fn update_pan(&mut self, pointer: Point) {
        if let Some(origin) = self.drag_origin {
            self.pan = origin.add_point(pointer);
        }
    }

    pub fn end_pan(&mut self) {
        self.drag_origin = None;
    }

    pub fn is_panning(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Shifts the pan by `delta`.
    pub fn pan_by(&mut self, delta: Point) {
        if delta.is_finite() {
            self.pan = self.pan.add_point(delta);
        }
    }

    /// Transform for a container of the given size.
    pub fn transform(&self, container: Size) -> Transform {
        Transform {
            translate: self.pan,
            scale: self.zoom(),
            origin: Point::new(container.width() / 2.0, container.height() / 2.0),
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum ZoomOp {
        By(f32),
        Wheel(f32),
        In,
        Out,
    }

    impl ZoomOp {
        fn apply(self, viewport: &mut ViewportController) {
            match self {
                ZoomOp::By(delta) => viewport.zoom_by(delta),
                ZoomOp::Wheel(delta_y) => viewport.wheel(delta_y),
                ZoomOp::In => viewport.zoom_in(),
                ZoomOp::Out => viewport.zoom_out(),
            }
        }

        /// Zoom change this input contributes before clamping.
        fn delta(self) -> f32 {
            match self {
                ZoomOp::By(delta) => delta,
                ZoomOp::Wheel(delta_y) if delta_y > 0.0 => -0.1,
                ZoomOp::Wheel(delta_y) if delta_y < 0.0 => 0.1,
                ZoomOp::Wheel(_) => 0.0,
                ZoomOp::In => 0.1,
                ZoomOp::Out => -0.1,
            }
        }
    }

    fn zoom_op_strategy() -> impl Strategy<Value = ZoomOp> {
        prop_oneof![
            (-1.0f32..1.0).prop_map(ZoomOp::By),
            (-240.0f32..240.0).prop_map(ZoomOp::Wheel),
            Just(ZoomOp::In),
            Just(ZoomOp::Out),
        ]
    }

    /// Replays `ops` in their given order and in a rotated, reversed order.
    fn check_zoom_is_order_independent(ops: Vec<ZoomOp>, seed: u64) -> Result<(), TestCaseError> {
        let mut permuted = ops.clone();
        if !permuted.is_empty() {
            let len = permuted.len();
            permuted.rotate_left((seed % len as u64) as usize);
        }
        permuted.reverse();

        let mut forward = ViewportController::default();
        let mut other = ViewportController::default();
        for op in &ops {
            op.apply(&mut forward);
        }
        for op in &permuted {
            op.apply(&mut other);
        }

        let expected = (1.0 + ops.iter().map(|op| op.delta()).sum::<f32>()).clamp(0.5, 3.0);
        prop_assert!(approx_eq!(f32, forward.zoom(), other.zoom(), epsilon = 1e-3));
        prop_assert!(approx_eq!(f32, forward.zoom(), expected, epsilon = 1e-3));
        prop_assert!((0.5..=3.0).contains(&forward.zoom()));
        Ok(())
    }

    proptest! {
        #[test]
        fn zoom_is_order_independent(
            ops in prop::collection::vec(zoom_op_strategy(), 0..24).prop_shuffle(),
            seed in any::<u64>(),
        ) {
            check_zoom_is_order_independent(ops, seed)?;
        }

        #[test]
        fn pan_is_order_independent(
            deltas in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 0..20)
        ) {
            let mut forward = ViewportController::default();
            let mut backward = ViewportController::default();
            for (x, y) in &deltas {
                forward.pan_by(Point::new(*x, *y));
            }
            for (x, y) in deltas.iter().rev() {
                backward.pan_by(Point::new(*x, *y));
            }

            prop_assert!(approx_eq!(f32, forward.pan().x(), backward.pan().x(), epsilon = 1e-2));
            prop_assert!(approx_eq!(f32, forward.pan().y(), backward.pan().y(), epsilon = 1e-2));
        }

        #[test]
        fn transform_inverts(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0, zoom in -1.0f32..3.0) {
            let mut viewport = ViewportController::default();
            viewport.zoom_by(zoom);
            viewport.pan_by(Point::new(15.0, -7.0));
            let transform = viewport.transform(Size::new(640.0, 480.0));

            let back = transform.invert(transform.apply(Point::new(x, y)));
            prop_assert!(approx_eq!(f32, back.x(), x, epsilon = 1e-2));
            prop_assert!(approx_eq!(f32, back.y(), y, epsilon = 1e-2));
        }
    }
}
