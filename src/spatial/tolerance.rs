//! Tolerance thresholds for interval comparisons.

use crate::geometry::Rect;

/// Tolerance `T` for a set of region boxes.
///
/// Half the shortest edge of the box with the smallest area; `0.0` for an
/// empty set.
///
/// # Examples
///
/// ```
/// use page_order::geometry::Rect;
/// use page_order::spatial::calculate_tolerance;
///
/// let boxes = [Rect::new(0.0, 0.0, 100.0, 40.0), Rect::new(0.0, 50.0, 30.0, 8.0)];
/// assert_eq!(calculate_tolerance(boxes.iter()), 4.0);
/// ```
pub fn calculate_tolerance<'a, I>(boxes: I) -> f64
where
    I: IntoIterator<Item = &'a Rect>,
{
    boxes
        .into_iter()
        .fold(None::<&Rect>, |smallest, rect| match smallest {
            Some(s) if s.area() <= rect.area() => Some(s),
            _ => Some(rect),
        })
        .map(|rect| rect.shortest_edge() / 2.0)
        .unwrap_or(0.0)
}

/// Horizontal tolerance used for x relations during column detection.
///
/// The shortest horizontal box edge over all boxes, where an edge counts as
/// horizontal when its vertical extent is at most `t`. Returns `t` when no
/// box is given.
pub fn calculate_column_tolerance<'a, I>(boxes: I, t: f64) -> f64
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut shortest = f64::INFINITY;
    for rect in boxes {
        // top and bottom edges have no vertical extent
        shortest = shortest.min(rect.width);
        // left and right edges qualify only on very flat boxes
        if rect.height <= t {
            shortest = shortest.min(rect.height);
        }
    }

    if shortest.is_finite() {
        shortest
    } else {
        t
    }
}
