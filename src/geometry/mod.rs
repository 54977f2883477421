//! Geometric primitives for layout analysis.
//!
//! This module provides the basic geometric types used by the relation engine:
//! points, axis-aligned rectangles, validated region outlines and connector
//! segments. Coordinates follow image conventions: `y` grows downwards, so the
//! top edge of a rectangle has the smallest `y`.

pub mod voronoi;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis
    X,
    /// Vertical axis
    Y,
}

impl Axis {
    /// The other axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f64,
    /// Y coordinate of top-left corner
    pub y: f64,
    /// Width of rectangle
    pub width: f64,
    /// Height of rectangle
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.y, 20.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Lower and upper bound of the rectangle along an axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::{Axis, Rect};
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.interval(Axis::X), (10.0, 110.0));
    /// assert_eq!(rect.interval(Axis::Y), (20.0, 70.0));
    /// ```
    pub fn interval(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.left(), self.right()),
            Axis::Y => (self.top(), self.bottom()),
        }
    }

    /// Get the center point of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// let center = rect.center();
    /// assert_eq!(center.x, 50.0);
    /// assert_eq!(center.y, 25.0);
    /// ```
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Midpoint of the left edge.
    pub fn left_center(&self) -> Point {
        Point {
            x: self.x,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Check if this rectangle contains a point (boundary included).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Compute the union of this rectangle with another.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
    /// let union = r1.union(&r2);
    ///
    /// assert_eq!(union.x, 0.0);
    /// assert_eq!(union.y, 0.0);
    /// assert_eq!(union.right(), 75.0);
    /// assert_eq!(union.bottom(), 75.0);
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Compute the area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Length of the shorter side.
    pub fn shortest_edge(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Bounding rectangle of a set of points, `None` when empty.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Rect::from_points(x0, y0, x1, y1))
    }

    /// Outline of the rectangle, clockwise in image coordinates.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }
}

/// A validated simple polygon with its bounding box computed once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    points: Vec<Point>,
    bbox: Rect,
}

impl Polygon {
    /// Validate an outline.
    ///
    /// Consecutive duplicate points and a repeated closing point are dropped.
    /// The outline is rejected when it has non-finite coordinates, fewer than
    /// three distinct points, no area or crossing edges. `id` only labels the
    /// error.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::{Point, Polygon};
    ///
    /// let square = vec![
    ///     Point::new(0.0, 0.0),
    ///     Point::new(10.0, 0.0),
    ///     Point::new(10.0, 10.0),
    ///     Point::new(0.0, 10.0),
    /// ];
    /// let polygon = Polygon::new("r1", square).unwrap();
    /// assert_eq!(polygon.bbox().width, 10.0);
    ///
    /// let bow_tie = vec![
    ///     Point::new(0.0, 0.0),
    ///     Point::new(10.0, 10.0),
    ///     Point::new(10.0, 0.0),
    ///     Point::new(0.0, 10.0),
    /// ];
    /// assert!(Polygon::new("r2", bow_tie).is_err());
    /// ```
    pub fn new(id: &str, points: Vec<Point>) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedGeometry {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if points.iter().any(|p| !p.is_finite()) {
            return Err(malformed("non-finite coordinate"));
        }

        let mut cleaned: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if cleaned.last() != Some(&p) {
                cleaned.push(p);
            }
        }
        while cleaned.len() > 1 && cleaned.first() == cleaned.last() {
            cleaned.pop();
        }

        if cleaned.len() < 3 {
            return Err(malformed("fewer than three distinct points"));
        }
        if signed_area(&cleaned).abs() <= f64::EPSILON {
            return Err(malformed("outline has no area"));
        }
        if is_self_intersecting(&cleaned) {
            return Err(malformed("outline is self-intersecting"));
        }

        let bbox = Rect::bounding(&cleaned).ok_or_else(|| malformed("empty outline"))?;
        Ok(Self {
            points: cleaned,
            bbox,
        })
    }

    /// Outline from an axis-aligned rectangle.
    pub fn from_rect(id: &str, rect: Rect) -> Result<Self> {
        Self::new(id, rect.corners().to_vec())
    }

    /// Outline points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Bounding box.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }
}

/// Shoelace formula; sign depends on orientation.
fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_properly_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn is_self_intersecting(points: &[Point]) -> bool {
    let n = points.len();
    for i in 0..n {
        let (a1, a2) = (points[i], points[(i + 1) % n]);
        for j in (i + 2)..n {
            // first and last edge share a vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (points[j], points[(j + 1) % n]);
            if segments_properly_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// A straight connector between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Point,
    /// End point
    pub end: Point,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Whether the segment passes through the interior of `rect` without
    /// lying completely inside it.
    ///
    /// Touching an edge or a corner does not count as crossing.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::geometry::{Point, Rect, Segment};
    ///
    /// let rect = Rect::new(10.0, 10.0, 10.0, 10.0);
    /// let through = Segment::new(Point::new(0.0, 15.0), Point::new(30.0, 15.0));
    /// let along_edge = Segment::new(Point::new(0.0, 10.0), Point::new(30.0, 10.0));
    /// let inside = Segment::new(Point::new(12.0, 12.0), Point::new(18.0, 18.0));
    ///
    /// assert!(through.crosses(&rect));
    /// assert!(!along_edge.crosses(&rect));
    /// assert!(!inside.crosses(&rect));
    /// ```
    pub fn crosses(&self, rect: &Rect) -> bool {
        let Some((t0, t1)) = self.clip(rect) else {
            return false;
        };
        let eps = 1e-9;
        if t1 - t0 <= eps {
            return false;
        }
        let contained = t0 <= eps && t1 >= 1.0 - eps;
        if contained {
            return false;
        }
        let mid = self.at((t0 + t1) / 2.0);
        mid.x > rect.left() + eps
            && mid.x < rect.right() - eps
            && mid.y > rect.top() + eps
            && mid.y < rect.bottom() - eps
    }

    fn at(&self, t: f64) -> Point {
        Point::new(
            self.start.x + (self.end.x - self.start.x) * t,
            self.start.y + (self.end.y - self.start.y) * t,
        )
    }

    /// Liang-Barsky clipping; parameter range of the part inside `rect`.
    fn clip(&self, rect: &Rect) -> Option<(f64, f64)> {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let checks = [
            (-dx, self.start.x - rect.left()),
            (dx, rect.right() - self.start.x),
            (-dy, self.start.y - rect.top()),
            (dy, rect.bottom() - self.start.y),
        ];

        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in checks {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        Rect::new(x, y, size, size).corners().to_vec()
    }

    #[test]
    fn test_rect_interval_and_edges() {
        let rect = Rect::from_points(1.0, 2.0, 5.0, 10.0);
        assert_eq!(rect.interval(Axis::X), (1.0, 5.0));
        assert_eq!(rect.interval(Axis::Y), (2.0, 10.0));
        assert_eq!(rect.shortest_edge(), 4.0);
        assert_eq!(rect.left_center(), Point::new(1.0, 6.0));
    }

    #[test]
    fn test_rect_bounding() {
        let points = vec![Point::new(3.0, 1.0), Point::new(-1.0, 4.0), Point::new(2.0, 7.0)];
        let rect = Rect::bounding(&points).unwrap();
        assert_eq!(rect, Rect::from_points(-1.0, 1.0, 3.0, 7.0));
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn test_polygon_drops_closing_point() {
        let mut points = square(0.0, 0.0, 4.0);
        points.push(points[0]);
        let polygon = Polygon::new("r1", points).unwrap();
        assert_eq!(polygon.points().len(), 4);
        assert_eq!(polygon.bbox(), Rect::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_polygon_rejects_degenerate() {
        let line = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        assert!(matches!(
            Polygon::new("r1", line),
            Err(Error::MalformedGeometry { .. })
        ));

        let two = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(0.0, 0.0)];
        assert!(Polygon::new("r2", two).is_err());
        assert!(Polygon::new("r3", vec![]).is_err());
    }

    #[test]
    fn test_polygon_rejects_nan() {
        let mut points = square(0.0, 0.0, 4.0);
        points[2].x = f64::NAN;
        let err = Polygon::new("bad", points).unwrap_err();
        assert!(format!("{}", err).contains("non-finite"));
    }

    #[test]
    fn test_polygon_concave_is_valid() {
        let l_shape = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let polygon = Polygon::new("l", l_shape).unwrap();
        assert_eq!(polygon.bbox(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_segment_crosses_partial_overlap() {
        let rect = Rect::new(10.0, 10.0, 10.0, 10.0);
        let entering = Segment::new(Point::new(0.0, 15.0), Point::new(15.0, 15.0));
        assert!(entering.crosses(&rect));

        let missing = Segment::new(Point::new(0.0, 0.0), Point::new(5.0, 30.0));
        assert!(!missing.crosses(&rect));

        let corner = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(!corner.crosses(&rect));
    }

    #[test]
    fn test_segment_length() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(seg.length(), 5.0);
    }
}
