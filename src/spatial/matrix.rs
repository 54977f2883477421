//! Pairwise relation matrix over page elements.

use indexmap::IndexMap;

use super::relation::{relation, Relation};
use crate::geometry::{Axis, Rect};

/// Relations of every ordered pair of elements on both axes.
///
/// Each unordered pair is classified once, in element order, and the reverse
/// direction is filled with the inverse relation.
#[derive(Debug, Clone)]
pub struct RelationMatrix {
    index: IndexMap<String, usize>,
    x: Vec<Relation>,
    y: Vec<Relation>,
}

impl RelationMatrix {
    /// Classify all pairs of `elements` with the given per-axis tolerances.
    pub fn build<'a, I>(elements: I, x_tolerance: f64, y_tolerance: f64) -> Self
    where
        I: IntoIterator<Item = (&'a str, Rect)>,
    {
        let mut index = IndexMap::new();
        let mut boxes = Vec::new();
        for (id, bbox) in elements {
            if index.contains_key(id) {
                continue;
            }
            index.insert(id.to_string(), boxes.len());
            boxes.push(bbox);
        }

        let n = boxes.len();
        let mut x = vec![Relation::Equals; n * n];
        let mut y = vec![Relation::Equals; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let rx = relation(
                    boxes[i].interval(Axis::X),
                    boxes[j].interval(Axis::X),
                    x_tolerance,
                );
                let ry = relation(
                    boxes[i].interval(Axis::Y),
                    boxes[j].interval(Axis::Y),
                    y_tolerance,
                );
                x[i * n + j] = rx;
                x[j * n + i] = rx.inverse();
                y[i * n + j] = ry;
                y[j * n + i] = ry.inverse();
            }
        }

        log::debug!(
            "relation matrix: {} elements, tolerance x={:.2} y={:.2}",
            n,
            x_tolerance,
            y_tolerance
        );

        Self { index, x, y }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Element ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Whether `id` is part of the matrix.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Relation of `a` to `b` on `axis`; [`Relation::Unknown`] for foreign ids.
    pub fn relation(&self, axis: Axis, a: &str, b: &str) -> Relation {
        let (Some(&i), Some(&j)) = (self.index.get(a), self.index.get(b)) else {
            return Relation::Unknown;
        };
        let n = self.index.len();
        match axis {
            Axis::X => self.x[i * n + j],
            Axis::Y => self.y[i * n + j],
        }
    }

    /// `a` is read before `b` when moving down the page.
    pub fn is_vertical_before_in_reading(&self, a: &str, b: &str) -> bool {
        vertical_before(self.relation(Axis::X, a, b), self.relation(Axis::Y, a, b))
    }

    /// `a` is read before `b` when moving across the page.
    pub fn is_horizontal_before_in_reading(&self, a: &str, b: &str) -> bool {
        vertical_before(self.relation(Axis::Y, a, b), self.relation(Axis::X, a, b))
    }

    /// Looser test: `a` leads `b` on either axis.
    pub fn is_before_in_reading(&self, a: &str, b: &str) -> bool {
        self.relation(Axis::X, a, b).is_leading() || self.relation(Axis::Y, a, b).is_leading()
    }
}

/// Decision table for "read before" along the primary axis pair.
///
/// `across` is the relation on the axis the reader sweeps first, `along` the
/// relation on the other one. The horizontal variant swaps them.
fn vertical_before(across: Relation, along: Relation) -> bool {
    use Relation::*;

    if matches!(across, Precedes | Meets) {
        return true;
    }
    if across == Overlaps && along.is_leading() {
        return true;
    }
    along.is_leading()
        && matches!(
            across,
            Precedes
                | Meets
                | Overlaps
                | Starts
                | InverseFinishes
                | Equals
                | During
                | InverseDuring
                | Finishes
                | InverseStarts
                | InverseOverlaps
        )
}
