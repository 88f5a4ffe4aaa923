//! Scene-space geometry: points, sizes and axis-aligned boxes.
//!
//! Coordinates follow SVG: the origin is the top-left corner of the scene,
//! `x` grows to the right and `y` grows downward.
//!
//! ```text
//!   (0,0) ───► x
//!     │
//!     ▼
//!     y
//! ```
//!
//! [`Bounds`] is the only type whose queries can fail. Boxes measured from
//! rendered output may be NaN or inverted, and [`Bounds::overlaps`] reports
//! that as a [`GeometryError`] rather than guessing.

use thiserror::Error;

/// A bounding box that cannot take part in a geometry query.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("bounding box has non-finite coordinates")]
    NonFinite,

    #[error("bounding box has negative extent ({width} x {height})")]
    NegativeExtent { width: f32, height: f32 },
}

/// A position in scene space. Also used for offsets such as pan deltas.
///
/// ```
/// # use erdview_core::geometry::Point;
/// let pan = Point::new(10.0, 20.0);
/// let pointer = Point::new(5.0, 5.0);
///
/// assert_eq!(pan.sub_point(pointer), Point::new(5.0, 15.0));
/// assert_eq!(pan.midpoint(pointer), Point::new(7.5, 12.5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise sum.
    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    pub fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Self {
        self.add_point(other).scale(0.5)
    }

    /// Scales both coordinates about the origin.
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Width and height of a scene, an entity box or a viewer container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned box, stored as its two extreme corners.
///
/// Construction never fails, so a box built from measured geometry may be
/// degenerate. [`Bounds::validated`] and [`Bounds::overlaps`] check it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Box form: top-left corner plus extents.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Point::new(x, y),
            max: Point::new(x + width, y + height),
        }
    }

    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self::new(top_left.x, top_left.y, size.width, size.height)
    }

    /// Smallest box covering a polyline, `None` when it has no points.
    ///
    /// ```
    /// # use erdview_core::geometry::{Bounds, Point};
    /// let path = [Point::new(10.0, 40.0), Point::new(60.0, 40.0), Point::new(60.0, 90.0)];
    /// let bounds = Bounds::from_points(&path).unwrap();
    /// assert_eq!(bounds, Bounds::new(10.0, 40.0, 50.0, 50.0));
    /// ```
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        Some(rest.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: Point::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
                max: Point::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
            },
        ))
    }

    pub fn min_x(self) -> f32 {
        self.min.x
    }

    pub fn min_y(self) -> f32 {
        self.min.y
    }

    pub fn max_x(self) -> f32 {
        self.max.x
    }

    pub fn max_y(self) -> f32 {
        self.max.y
    }

    /// Same as [`Bounds::min_x`].
    pub fn x(self) -> f32 {
        self.min.x
    }

    /// Same as [`Bounds::min_y`].
    pub fn y(self) -> f32 {
        self.min.y
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(self) -> Point {
        self.min.midpoint(self.max)
    }

    /// Smallest box covering both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grows the box by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Self {
        let delta = Point::new(amount, amount);
        Self {
            min: self.min.sub_point(delta),
            max: self.max.add_point(delta),
        }
    }

    /// Returns the box if it is finite and not inverted.
    ///
    /// # Errors
    ///
    /// [`GeometryError::NonFinite`] for NaN or infinite coordinates,
    /// [`GeometryError::NegativeExtent`] when a maximum lies before its minimum.
    pub fn validated(self) -> Result<Self, GeometryError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        let (width, height) = (self.width(), self.height());
        if width < 0.0 || height < 0.0 {
            return Err(GeometryError::NegativeExtent { width, height });
        }
        Ok(self)
    }

    /// True unless the boxes are separated on the x axis or on the y axis.
    /// Shared edges count as overlap.
    ///
    /// # Errors
    ///
    /// Fails when either box fails [`Bounds::validated`].
    ///
    /// ```
    /// # use erdview_core::geometry::Bounds;
    /// let relation = Bounds::new(0.0, 0.0, 100.0, 10.0);
    ///
    /// assert!(relation.overlaps(&Bounds::new(50.0, -5.0, 20.0, 20.0)).unwrap());
    /// assert!(!relation.overlaps(&Bounds::new(500.0, 500.0, 10.0, 10.0)).unwrap());
    /// ```
    pub fn overlaps(&self, other: &Self) -> Result<bool, GeometryError> {
        let a = self.validated()?;
        let b = other.validated()?;

        let apart_x = a.max.x < b.min.x || b.max.x < a.min.x;
        let apart_y = a.max.y < b.min.y || b.max.y < a.min.y;
        Ok(!apart_x && !apart_y)
    }

    /// Inclusive of the edges.
    pub fn contains_point(&self, point: Point) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }
}
