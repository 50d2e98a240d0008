//! Geometric primitives shared by diagram-interchange records and live nodes.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate, used for waypoints and translation deltas
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle
//!
//! # Coordinate System
//!
//! BPMN DI uses the screen convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! `dc:Bounds` is expressed as `x`, `y`, `width`, `height` where `(x, y)` is
//! the top-left corner; [`Bounds::new`] takes the same arguments.

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use subplane_core::geometry::Point;
/// let center = Point::new(200.0, 200.0);
/// let current = Point::new(25.0, 25.0);
///
/// let delta = center.sub_point(current);
/// assert_eq!(delta.x(), 175.0);
/// assert_eq!(current.add_point(delta), center);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Returns the point mirrored through the origin
    pub fn negate(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of an element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned rectangle stored as minimum and maximum coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from `dc:Bounds` style attributes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use subplane_core::geometry::Bounds;
    /// let bounds = Bounds::new(100.0, 100.0, 200.0, 200.0);
    ///
    /// assert_eq!(bounds.max_x(), 300.0);
    /// assert_eq!(bounds.center().x(), 200.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self::new(top_left.x, top_left.y, size.width, size.height)
    }

    /// Returns the smallest bounds containing every point, or `None` for an
    /// empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        points.into_iter().fold(None, |acc: Option<Bounds>, point| {
            let single = Bounds {
                min_x: point.x,
                min_y: point.y,
                max_x: point.x,
                max_y: point.y,
            };
            Some(match acc {
                Some(bounds) => bounds.merge(&single),
                None => single,
            })
        })
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Returns `true` when every coordinate is finite and the size is not
    /// negative.
    pub fn is_valid(self) -> bool {
        self.min_point().is_finite()
            && Point::new(self.max_x, self.max_y).is_finite()
            && self.width() >= 0.0
            && self.height() >= 0.0
    }

    /// Merges two bounds into the smallest bounds containing both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use subplane_core::geometry::Bounds;
    /// let task = Bounds::new(0.0, 0.0, 100.0, 80.0);
    /// let event = Bounds::new(150.0, 22.0, 36.0, 36.0);
    ///
    /// let combined = task.merge(&event);
    /// assert_eq!(combined.width(), 186.0);
    /// assert_eq!(combined.height(), 80.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }
}
