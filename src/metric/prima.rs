//! Relationship based reading order comparison.
//!
//! Every pair of regions is classified into one of eight relationships in
//! both trees. Differing pairs are priced with a fixed penalty table, benign
//! regroupings are forgiven by a set of exception rules, and the total is
//! turned into a percentage where the "E50" penalty halves the score.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reading_order::{NodeId, ReadingOrder};

/// Relationship of one item to another inside a reading order tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// The item itself
    #[serde(rename = "=")]
    Same,
    /// Directly follows
    #[serde(rename = "->")]
    Successor,
    /// Directly precedes
    #[serde(rename = "<-")]
    Predecessor,
    /// Ordered, but not adjacent
    #[serde(rename = "-x-")]
    NotAdjacent,
    /// Follows at some unspecified distance
    #[serde(rename = "->->")]
    SomewhereBefore,
    /// Precedes at some unspecified distance
    #[serde(rename = "<-<-")]
    SomewhereAfter,
    /// No order between the two
    #[serde(rename = "--")]
    Unordered,
    /// One of the two is missing from the tree
    #[serde(rename = "n.d.")]
    NotDefined,
}

impl RelationshipKind {
    /// Printed symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            RelationshipKind::Same => "=",
            RelationshipKind::Successor => "->",
            RelationshipKind::Predecessor => "<-",
            RelationshipKind::NotAdjacent => "-x-",
            RelationshipKind::SomewhereBefore => "->->",
            RelationshipKind::SomewhereAfter => "<-<-",
            RelationshipKind::Unordered => "--",
            RelationshipKind::NotDefined => "n.d.",
        }
    }

    fn table_index(self) -> Option<usize> {
        match self {
            RelationshipKind::Successor => Some(0),
            RelationshipKind::Predecessor => Some(1),
            RelationshipKind::Unordered => Some(2),
            RelationshipKind::NotAdjacent => Some(3),
            RelationshipKind::SomewhereBefore => Some(4),
            RelationshipKind::SomewhereAfter => Some(5),
            RelationshipKind::Same | RelationshipKind::NotDefined => None,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Penalty for the predicted relationship (row) where the reference has the
/// column relationship. Order: `->`, `<-`, `--`, `-x-`, `->->`, `<-<-`.
const PENALTIES: [[u32; 6]; 6] = [
    [0, 40, 10, 20, 0, 10],
    [40, 0, 10, 20, 10, 0],
    [20, 20, 0, 10, 10, 10],
    [20, 20, 10, 0, 10, 10],
    [0, 20, 5, 5, 0, 10],
    [20, 0, 5, 5, 10, 0],
];

/// Largest value of the penalty table.
pub const MAX_PENALTY: u32 = 40;

/// Cost of predicting `actual` where the reference says `expected`.
///
/// Pairs involving a missing region cost nothing.
///
/// # Examples
///
/// ```
/// use page_order::metric::{penalty, RelationshipKind};
///
/// assert_eq!(penalty(RelationshipKind::Predecessor, RelationshipKind::Successor), 40);
/// assert_eq!(penalty(RelationshipKind::SomewhereBefore, RelationshipKind::Unordered), 5);
/// assert_eq!(penalty(RelationshipKind::NotDefined, RelationshipKind::Successor), 0);
/// ```
pub fn penalty(actual: RelationshipKind, expected: RelationshipKind) -> u32 {
    match (actual.table_index(), expected.table_index()) {
        (Some(a), Some(e)) => PENALTIES[a][e],
        _ => 0,
    }
}

/// Relationship of item `source` to item `checking` in `order`.
pub fn classify(order: &ReadingOrder, source: &str, checking: &str) -> Result<RelationshipKind> {
    let s = order
        .item(source)
        .ok_or_else(|| Error::UnknownRegion(source.to_string()))?;
    let c = order
        .item(checking)
        .ok_or_else(|| Error::UnknownRegion(checking.to_string()))?;
    classify_nodes(order, s, c)
}

fn classify_nodes(order: &ReadingOrder, source: NodeId, checking: NodeId) -> Result<RelationshipKind> {
    if source == checking {
        return Ok(RelationshipKind::Same);
    }
    if order.successor(source) == Some(checking) {
        return Ok(RelationshipKind::Successor);
    }
    if order.predecessor(source) == Some(checking) {
        return Ok(RelationshipKind::Predecessor);
    }

    let unknown = || Error::UnknownRelationship {
        item: order.id(source).to_string(),
        other: order.id(checking).to_string(),
    };
    let source_parent = order.parent(source).ok_or_else(unknown)?;
    let checking_parent = order.parent(checking).ok_or_else(unknown)?;

    if source_parent == checking_parent {
        return Ok(if order.is_ordered(source_parent) {
            RelationshipKind::NotAdjacent
        } else {
            RelationshipKind::Unordered
        });
    }

    let ancestor = order.nearest_ancestor(source, checking);
    if !order.is_group(ancestor) {
        return Err(unknown());
    }

    if order.is_unordered(ancestor) {
        if order.is_ordered(source_parent) && order.is_ordered(checking_parent) {
            if order.predecessor(source).is_none() && order.successor(checking).is_none() {
                return Ok(RelationshipKind::SomewhereAfter);
            }
            if order.successor(source).is_none() && order.predecessor(checking).is_none() {
                return Ok(RelationshipKind::SomewhereBefore);
            }
            return Ok(RelationshipKind::NotAdjacent);
        }
        return Ok(RelationshipKind::Unordered);
    }

    let source_level = order.level(source);
    let checking_level = order.level(checking);
    if source_level < checking_level {
        let group = group_below(order, ancestor, checking).ok_or_else(unknown)?;
        if order.is_unordered(group) {
            return Ok(RelationshipKind::SomewhereBefore);
        }
        classify_nodes(order, source, group)
    } else if source_level > checking_level {
        let group = group_below(order, ancestor, source).ok_or_else(unknown)?;
        if order.is_unordered(group) {
            return Ok(RelationshipKind::SomewhereAfter);
        }
        classify_nodes(order, group, checking)
    } else {
        Ok(RelationshipKind::NotAdjacent)
    }
}

/// Direct child group of `ancestor` on the path down to `n`.
fn group_below(order: &ReadingOrder, ancestor: NodeId, n: NodeId) -> Option<NodeId> {
    let path = order.path(n);
    let position = path.iter().position(|p| *p == ancestor)?;
    path.get(position + 1)
        .copied()
        .filter(|g| order.is_group(*g))
}

/// Relationship of every id to every other id of a sorted id set.
#[derive(Debug, Clone)]
pub struct RelationshipMatrix {
    index: HashMap<String, usize>,
    cells: Vec<Vec<RelationshipKind>>,
}

impl RelationshipMatrix {
    /// Classify all pairs of `ids` in `order`; ids the tree lacks are
    /// `n.d.` against every other id.
    pub fn build(order: &ReadingOrder, ids: &[String]) -> Result<Self> {
        let nodes: Vec<Option<NodeId>> = ids.iter().map(|id| order.item(id)).collect();
        let mut cells = Vec::with_capacity(ids.len());
        for (i, a) in nodes.iter().enumerate() {
            let mut row = Vec::with_capacity(ids.len());
            for (j, b) in nodes.iter().enumerate() {
                let kind = match (a, b) {
                    _ if i == j => RelationshipKind::Same,
                    (Some(a), Some(b)) => classify_nodes(order, *a, *b)?,
                    _ => RelationshipKind::NotDefined,
                };
                row.push(kind);
            }
            cells.push(row);
        }
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Ok(Self { index, cells })
    }

    /// Relationship of `a` to `b`, if both ids are covered.
    pub fn get(&self, a: &str, b: &str) -> Option<RelationshipKind> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        Some(self.cells[i][j])
    }
}

/// A counted difference between the predicted and the reference tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Smaller id of the pair
    pub left: String,
    /// Larger id of the pair
    pub right: String,
    /// Relationship in the predicted tree
    pub actual: RelationshipKind,
    /// Relationship in the reference tree
    pub expected: RelationshipKind,
}

impl Mismatch {
    /// Penalty of this mismatch.
    pub fn penalty(&self) -> u32 {
        penalty(self.actual, self.expected)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}: [{}] instead of [{}]",
            self.left, self.right, self.actual, self.expected
        )
    }
}

/// Outcome of [`compare`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaResults {
    mismatches: Vec<Mismatch>,
    region_count: usize,
}

impl PrimaResults {
    /// Counted mismatches, ordered by id pair.
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Sum of the mismatch penalties.
    pub fn penalty(&self) -> u32 {
        self.mismatches.iter().map(Mismatch::penalty).sum()
    }

    /// Score in percent; a penalty of E50 scores 50.
    pub fn percentage(&self) -> f64 {
        let e50 = f64::from(MAX_PENALTY) * self.region_count as f64 / 2.0;
        let penalty = f64::from(self.penalty());
        if e50 == 0.0 {
            return if penalty == 0.0 { 100.0 } else { 0.0 };
        }
        let score = round_to(1.0 / (penalty / e50 + 1.0), 4) * 100.0;
        round_to(score, 2)
    }

    /// One line per mismatch.
    pub fn errors(&self) -> Vec<String> {
        self.mismatches.iter().map(|m| m.to_string()).collect()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Compare `predicted` against `reference`.
///
/// `region_count` is the number of text regions on the page and sets the E50
/// normalization.
///
/// # Examples
///
/// ```
/// use page_order::metric::compare;
/// use page_order::reading_order::{GroupKind, ReadingOrder};
///
/// let mut order = ReadingOrder::new("root", GroupKind::Ordered);
/// let root = order.root();
/// for id in ["r1", "r2"] {
///     order.push_item(root, id).unwrap();
/// }
/// let results = compare(&order, &order, 2).unwrap();
/// assert_eq!(results.penalty(), 0);
/// assert_eq!(results.percentage(), 100.0);
/// ```
pub fn compare(
    reference: &ReadingOrder,
    predicted: &ReadingOrder,
    region_count: usize,
) -> Result<PrimaResults> {
    let ids: Vec<String> = reference
        .item_ids()
        .into_iter()
        .chain(predicted.item_ids())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let expected = RelationshipMatrix::build(reference, &ids)?;
    let actual = RelationshipMatrix::build(predicted, &ids)?;
    let differs = |a: &str, b: &str| match (expected.get(a, b), actual.get(a, b)) {
        (Some(e), Some(p)) => e != p,
        _ => false,
    };

    let mut mismatches = Vec::new();
    for (i, row) in ids.iter().enumerate() {
        for col in &ids[i + 1..] {
            if !differs(row, col) {
                continue;
            }
            if !group_changed(row, reference, predicted, &differs)
                || !group_changed(col, reference, predicted, &differs)
            {
                continue;
            }
            let mismatch = Mismatch {
                left: row.clone(),
                right: col.clone(),
                actual: actual.get(row, col).unwrap_or(RelationshipKind::NotDefined),
                expected: expected.get(row, col).unwrap_or(RelationshipKind::NotDefined),
            };
            if is_exception(&mismatch, reference, predicted) {
                log::debug!("forgiven: {}", mismatch);
                continue;
            }
            mismatches.push(mismatch);
        }
    }

    log::debug!("{} ids compared, {} mismatches counted", ids.len(), mismatches.len());
    Ok(PrimaResults {
        mismatches,
        region_count,
    })
}

/// Whether the reference group of `id` was changed by the prediction.
fn group_changed<F>(id: &str, reference: &ReadingOrder, predicted: &ReadingOrder, differs: &F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    let (Some(g), Some(a)) = (reference.item(id), predicted.item(id)) else {
        return true;
    };
    let (Some(g_parent), Some(a_parent)) = (reference.parent(g), predicted.parent(a)) else {
        return true;
    };

    let siblings = reference.children(g_parent);
    if siblings.len() != predicted.children(a_parent).len() {
        return true;
    }
    siblings.iter().any(|x| {
        siblings
            .iter()
            .any(|y| differs(reference.id(*x), reference.id(*y)))
    })
}

/// One side of a pair as found in both trees.
struct Placement {
    reference: NodeId,
    predicted: NodeId,
}

impl Placement {
    fn find(id: &str, reference: &ReadingOrder, predicted: &ReadingOrder) -> Option<Self> {
        Some(Self {
            reference: reference.item(id)?,
            predicted: predicted.item(id)?,
        })
    }

    fn pair(m: &Mismatch, reference: &ReadingOrder, predicted: &ReadingOrder) -> Option<(Self, Self)> {
        Some((
            Self::find(&m.left, reference, predicted)?,
            Self::find(&m.right, reference, predicted)?,
        ))
    }
}

/// Mismatch patterns produced by benign regrouping.
fn is_exception(m: &Mismatch, reference: &ReadingOrder, predicted: &ReadingOrder) -> bool {
    use RelationshipKind::*;

    let ordered_parent = |order: &ReadingOrder, n: NodeId| order.parent(n).is_some_and(|p| order.is_ordered(p));
    let unordered_parent = |order: &ReadingOrder, n: NodeId| order.parent(n).is_some_and(|p| order.is_unordered(p));
    let same_level = |l: &Placement, r: &Placement| {
        let level = reference.level(l.reference);
        reference.level(r.reference) == level
            && predicted.level(l.predicted) == level
            && predicted.level(r.predicted) == level
    };
    let placements = || Placement::pair(m, reference, predicted);

    match (m.expected, m.actual) {
        (Successor, Unordered) => {
            let Some((l, r)) = placements() else {
                return false;
            };
            if same_level(&l, &r) {
                // the chain end moved out of an ordered group
                reference.parent(l.reference) == reference.parent(r.reference)
                    && ordered_parent(reference, l.reference)
                    && ordered_parent(predicted, l.predicted)
                    && (reference.predecessor(l.reference).is_none()
                        || reference.successor(r.reference).is_none())
            } else {
                // an item pulled up into the unordered root
                let group_size = reference
                    .parent(l.reference)
                    .map(|p| reference.flatten_items(p).len())
                    .unwrap_or(0);
                let pulled_up = |n: NodeId| {
                    predicted.level(n) == 1
                        && ordered_parent(reference, l.reference)
                        && unordered_parent(predicted, n)
                };
                group_size != 2 && (pulled_up(l.predicted) || pulled_up(r.predicted))
            }
        },
        (NotAdjacent, Unordered) => {
            let Some((l, r)) = placements() else {
                return false;
            };
            let lifted = |p: &Placement| {
                ordered_parent(reference, p.reference)
                    && unordered_parent(predicted, p.predicted)
                    && reference.level(p.reference) > predicted.level(p.predicted)
            };
            lifted(&l) || lifted(&r)
        },
        (NotAdjacent, SomewhereBefore) | (Successor, SomewhereBefore) => true,
        (Unordered, NotAdjacent) | (Unordered, Successor) => {
            let Some((l, r)) = placements() else {
                return false;
            };
            same_level(&l, &r)
                && reference.parent(r.reference).map(|p| reference.id(p))
                    != predicted.parent(r.predicted).map(|p| predicted.id(p))
                && ordered_parent(reference, r.reference)
                && ordered_parent(predicted, r.predicted)
                && reference.predecessor(r.reference).is_none()
                && predicted.successor(r.predicted).is_none()
        },
        (SomewhereBefore | SomewhereAfter, NotAdjacent | Unordered | Successor) => true,
        (NotAdjacent, SomewhereAfter) => true,
        _ => false,
    }
}
