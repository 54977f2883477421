//! Chain reduction recall.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::reading_order::ReadingOrder;

/// Ordered `(predecessor, successor)` id pair.
pub type Link = (String, String);

/// How many reference links a prediction reproduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recall {
    /// Links present in both trees
    pub hits: BTreeSet<Link>,
    /// Reference links the prediction lacks
    pub missed: BTreeSet<Link>,
    /// Predicted links the reference lacks
    pub surplus: BTreeSet<Link>,
}

impl Recall {
    /// Number of reference links.
    pub fn total(&self) -> usize {
        self.hits.len() + self.missed.len()
    }

    /// Reproduced reference links in percent, rounded to two decimals.
    ///
    /// A reference without links is fully recalled.
    pub fn recall(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        (self.hits.len() as f64 / total as f64 * 10_000.0).round() / 100.0
    }
}

/// Compare the chain reductions of two trees.
///
/// # Examples
///
/// ```
/// use page_order::metric::recall;
/// use page_order::reading_order::{GroupKind, ReadingOrder};
///
/// let mut reference = ReadingOrder::new("root", GroupKind::Ordered);
/// let root = reference.root();
/// for id in ["a", "b", "c"] {
///     reference.push_item(root, id).unwrap();
/// }
/// let result = recall::compare(&reference, &reference);
/// assert_eq!(result.total(), 2);
/// assert_eq!(result.recall(), 100.0);
/// ```
pub fn compare(reference: &ReadingOrder, predicted: &ReadingOrder) -> Recall {
    let expected: BTreeSet<Link> = reference.chain_reduction().into_iter().collect();
    let actual: BTreeSet<Link> = predicted.chain_reduction().into_iter().collect();

    Recall {
        hits: expected.intersection(&actual).cloned().collect(),
        missed: expected.difference(&actual).cloned().collect(),
        surplus: actual.difference(&expected).cloned().collect(),
    }
}
