//! Interval relations between region extents on one axis.
//!
//! Two intervals are compared with a tolerance `t`: boundaries closer than
//! `t` count as touching. The predicates are tested in a fixed priority order
//! and the first match wins; when none matches, the inverse of the reverse
//! comparison is used.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation of interval `a` to interval `b` on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// `a` ends before `b` starts
    Precedes,
    /// `a` ends where `b` starts
    Meets,
    /// `a` starts first and ends inside `b`
    Overlaps,
    /// `a` starts with `b` and ends inside it
    Starts,
    /// `a` lies strictly inside `b`
    During,
    /// `a` starts inside `b` and ends with it
    Finishes,
    /// Same extent
    Equals,
    /// Inverse of [`Relation::Precedes`]
    InversePrecedes,
    /// Inverse of [`Relation::Meets`]
    InverseMeets,
    /// Inverse of [`Relation::Overlaps`]
    InverseOverlaps,
    /// Inverse of [`Relation::Starts`]
    InverseStarts,
    /// Inverse of [`Relation::During`]
    InverseDuring,
    /// Inverse of [`Relation::Finishes`]
    InverseFinishes,
    /// No predicate matched in either direction
    Unknown,
}

impl Relation {
    /// Relation of `b` to `a` given the relation of `a` to `b`.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_order::spatial::Relation;
    ///
    /// assert_eq!(Relation::Meets.inverse(), Relation::InverseMeets);
    /// assert_eq!(Relation::InverseDuring.inverse(), Relation::During);
    /// assert_eq!(Relation::Equals.inverse(), Relation::Equals);
    /// ```
    pub fn inverse(self) -> Relation {
        use Relation::*;
        match self {
            Precedes => InversePrecedes,
            Meets => InverseMeets,
            Overlaps => InverseOverlaps,
            Starts => InverseStarts,
            During => InverseDuring,
            Finishes => InverseFinishes,
            Equals => Equals,
            InversePrecedes => Precedes,
            InverseMeets => Meets,
            InverseOverlaps => Overlaps,
            InverseStarts => Starts,
            InverseDuring => During,
            InverseFinishes => Finishes,
            Unknown => Unknown,
        }
    }

    /// Short name, inverses carry an `i_` prefix.
    pub fn name(self) -> &'static str {
        use Relation::*;
        match self {
            Precedes => "precedes",
            Meets => "meets",
            Overlaps => "overlaps",
            Starts => "starts",
            During => "during",
            Finishes => "finishes",
            Equals => "equals",
            InversePrecedes => "i_precedes",
            InverseMeets => "i_meets",
            InverseOverlaps => "i_overlaps",
            InverseStarts => "i_starts",
            InverseDuring => "i_during",
            InverseFinishes => "i_finishes",
            Unknown => "unknown",
        }
    }

    /// `a` comes before `b` on the axis: precedes, meets or overlaps.
    pub fn is_leading(self) -> bool {
        matches!(self, Relation::Precedes | Relation::Meets | Relation::Overlaps)
    }

    /// `a` comes after `b` on the axis: inverse of a leading relation.
    pub fn is_trailing(self) -> bool {
        self.inverse().is_leading()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn precedes(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    a.1 < b.0 - t
}

fn meets(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    b.0 - t <= a.1 && a.1 <= b.0 + t
}

fn overlaps(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    a.0 < b.0 - t && b.0 + t < a.1 && a.1 < b.1 - t
}

fn starts(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    b.0 - t <= a.0 && a.0 <= b.0 + t && a.1 < b.1 - t
}

fn during(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    a.0 > b.0 + t && a.1 < b.1 - t
}

fn finishes(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    a.0 > b.0 + t && b.1 - t <= a.1 && a.1 <= b.1 + t
}

fn equals(a: (f64, f64), b: (f64, f64), t: f64) -> bool {
    b.0 - t <= a.0 && a.0 <= b.0 + t && b.1 - t <= a.1 && a.1 <= b.1 + t
}

/// One-directional classification of `a` against `b`.
///
/// Returns [`Relation::Unknown`] when no forward predicate holds; use
/// [`relation`] for the symmetric-complete answer.
pub fn classify(a: (f64, f64), b: (f64, f64), t: f64) -> Relation {
    if equals(a, b, t) {
        Relation::Equals
    } else if precedes(a, b, t) {
        Relation::Precedes
    } else if meets(a, b, t) {
        Relation::Meets
    } else if overlaps(a, b, t) {
        Relation::Overlaps
    } else if starts(a, b, t) {
        Relation::Starts
    } else if during(a, b, t) {
        Relation::During
    } else if finishes(a, b, t) {
        Relation::Finishes
    } else {
        Relation::Unknown
    }
}

/// Relation of interval `a` to interval `b` with tolerance `t`.
///
/// # Examples
///
/// ```
/// use page_order::spatial::{relation, Relation};
///
/// assert_eq!(relation((0.0, 9.0), (10.0, 20.0), 0.0), Relation::Precedes);
/// assert_eq!(relation((0.0, 10.0), (10.0, 20.0), 0.0), Relation::Meets);
/// assert_eq!(relation((10.0, 20.0), (0.0, 9.0), 0.0), Relation::InversePrecedes);
/// ```
pub fn relation(a: (f64, f64), b: (f64, f64), t: f64) -> Relation {
    match classify(a, b, t) {
        Relation::Unknown => classify(b, a, t).inverse(),
        known => known,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_literal_fixtures() {
        assert_eq!(relation((0.0, 9.0), (10.0, 20.0), 0.0), Relation::Precedes);
        assert_eq!(relation((0.0, 10.0), (10.0, 20.0), 0.0), Relation::Meets);
        assert_eq!(relation((0.0, 15.0), (10.0, 20.0), 0.0), Relation::Overlaps);
        assert_eq!(relation((10.0, 15.0), (10.0, 20.0), 0.0), Relation::Starts);
        assert_eq!(relation((12.0, 15.0), (10.0, 20.0), 0.0), Relation::During);
        assert_eq!(relation((12.0, 20.0), (10.0, 20.0), 0.0), Relation::Finishes);
        assert_eq!(relation((10.0, 20.0), (10.0, 20.0), 0.0), Relation::Equals);
    }

    #[test]
    fn test_inverse_fixtures() {
        assert_eq!(relation((10.0, 20.0), (0.0, 15.0), 0.0), Relation::InverseOverlaps);
        assert_eq!(relation((10.0, 20.0), (10.0, 15.0), 0.0), Relation::InverseStarts);
        assert_eq!(relation((10.0, 20.0), (12.0, 15.0), 0.0), Relation::InverseDuring);
        assert_eq!(relation((10.0, 20.0), (12.0, 20.0), 0.0), Relation::InverseFinishes);
        assert_eq!(relation((10.0, 20.0), (0.0, 10.0), 0.0), Relation::InverseMeets);
    }

    #[test]
    fn test_tolerance_makes_boundaries_fuzzy() {
        // gap of 1 is within tolerance 2
        assert_eq!(relation((0.0, 9.0), (10.0, 20.0), 2.0), Relation::Meets);
        // nearly identical extents collapse to equals
        assert_eq!(relation((1.0, 19.0), (0.0, 20.0), 2.0), Relation::Equals);
        // start within tolerance, end clearly inside
        assert_eq!(relation((1.0, 12.0), (0.0, 20.0), 2.0), Relation::Starts);
    }

    #[test]
    fn test_leading_and_trailing() {
        assert!(Relation::Overlaps.is_leading());
        assert!(!Relation::Starts.is_leading());
        assert!(Relation::InverseMeets.is_trailing());
        assert!(!Relation::Equals.is_trailing());
        assert!(!Relation::Precedes.is_trailing());
    }

    #[test]
    fn test_names() {
        assert_eq!(Relation::InverseFinishes.to_string(), "i_finishes");
        assert_eq!(Relation::Equals.to_string(), "equals");
    }

    proptest! {
        // Integer coordinates keep the tolerance arithmetic exact.
        #[test]
        fn prop_relation_is_exhaustive(
            a0 in 0i32..60, la in 0i32..30,
            b0 in 0i32..60, lb in 0i32..30,
            t in 0i32..8,
        ) {
            let a = (a0 as f64, (a0 + la) as f64);
            let b = (b0 as f64, (b0 + lb) as f64);
            let t = t as f64;
            let ab = relation(a, b, t);
            prop_assert_ne!(ab, Relation::Unknown);
        }

        #[test]
        fn prop_forward_predicates_are_exclusive(
            a0 in 0i32..60, la in 0i32..30,
            b0 in 0i32..60, lb in 0i32..30,
            t in 0i32..8,
        ) {
            let a = (a0 as f64, (a0 + la) as f64);
            let b = (b0 as f64, (b0 + lb) as f64);
            let t = t as f64;
            // precedes, meets and overlaps never hold together
            let leading = [precedes(a, b, t), meets(a, b, t), overlaps(a, b, t)];
            prop_assert!(leading.iter().filter(|x| **x).count() <= 1);
        }
    }
}
