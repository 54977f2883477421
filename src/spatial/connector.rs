//! Directional connectors between regions.

use bitflags::bitflags;

use super::relation::Relation;
use crate::geometry::{Point, Rect, Segment};

bitflags! {
    /// Compass direction from one region to another (y grows downward).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Direction: u8 {
        /// Target lies above
        const NORTH = 0b0001;
        /// Target lies below
        const SOUTH = 0b0010;
        /// Target lies to the right
        const EAST = 0b0100;
        /// Target lies to the left
        const WEST = 0b1000;
    }
}

impl Direction {
    /// Direction implied by the x and y relation of a source to a target.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::spatial::{Direction, Relation};
    ///
    /// let dir = Direction::from_relations(Relation::Equals, Relation::Precedes);
    /// assert_eq!(dir, Direction::SOUTH);
    /// ```
    pub fn from_relations(x: Relation, y: Relation) -> Direction {
        let mut dir = Direction::empty();
        if x.is_leading() {
            dir |= Direction::EAST;
        }
        if x.is_trailing() {
            dir |= Direction::WEST;
        }
        if y.is_leading() {
            dir |= Direction::SOUTH;
        }
        if y.is_trailing() {
            dir |= Direction::NORTH;
        }
        dir
    }
}

/// Line from `a` to `b`.
///
/// Starts at both centers and moves each coordinate to the facing edges for
/// every component of `dir`, so the length is the gap between the boxes
/// along the direction.
pub fn connector(a: &Rect, b: &Rect, dir: Direction) -> Segment {
    let ca = a.center();
    let cb = b.center();
    let mut start = Point::new(ca.x, ca.y);
    let mut stop = Point::new(cb.x, cb.y);

    if dir.contains(Direction::NORTH) {
        start.y = a.top();
        stop.y = b.bottom();
    }
    if dir.contains(Direction::SOUTH) {
        start.y = a.bottom();
        stop.y = b.top();
    }
    if dir.contains(Direction::WEST) {
        start.x = a.left();
        stop.x = b.right();
    }
    if dir.contains(Direction::EAST) {
        start.x = a.right();
        stop.x = b.left();
    }

    Segment::new(start, stop)
}

/// Whether the center-to-center line from `a` to `b` crosses any other box.
pub fn crosses_another<'a, I>(a: (&str, &Rect), b: (&str, &Rect), others: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a Rect)>,
{
    let line = connector(a.1, b.1, Direction::empty());
    others
        .into_iter()
        .filter(|(id, _)| *id != a.0 && *id != b.0)
        .any(|(_, rect)| line.crosses(rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_relations() {
        assert_eq!(
            Direction::from_relations(Relation::Precedes, Relation::InverseMeets),
            Direction::EAST | Direction::NORTH
        );
        assert_eq!(
            Direction::from_relations(Relation::Equals, Relation::During),
            Direction::empty()
        );
        assert_eq!(
            Direction::from_relations(Relation::InverseOverlaps, Relation::Equals),
            Direction::WEST
        );
    }

    #[test]
    fn test_connector_south_measures_gap() {
        let a = Rect::new(0.0, 0.0, 100.0, 20.0);
        let b = Rect::new(0.0, 50.0, 100.0, 20.0);
        let line = connector(&a, &b, Direction::SOUTH);
        assert_eq!(line.start, Point::new(50.0, 20.0));
        assert_eq!(line.end, Point::new(50.0, 50.0));
        assert!((line.length() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_connector_without_direction_joins_centers() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(30.0, 40.0, 10.0, 10.0);
        let line = connector(&a, &b, Direction::empty());
        assert!((line.length() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_crosses_another() {
        let a = Rect::new(0.0, 0.0, 100.0, 20.0);
        let b = Rect::new(0.0, 100.0, 100.0, 20.0);
        let middle = Rect::new(40.0, 50.0, 20.0, 10.0);
        let aside = Rect::new(200.0, 50.0, 20.0, 10.0);

        assert!(crosses_another(
            ("a", &a),
            ("b", &b),
            vec![("a", &a), ("m", &middle), ("b", &b)]
        ));
        assert!(!crosses_another(
            ("a", &a),
            ("b", &b),
            vec![("a", &a), ("s", &aside), ("b", &b)]
        ));
    }
}
