//! Reading order evaluation.
//!
//! [`compare`] scores a predicted tree against a reference with the
//! relationship metric; [`recall::compare`] counts reproduced chain links.

mod prima;
pub mod recall;

pub use prima::{
    classify, compare, penalty, Mismatch, PrimaResults, RelationshipKind, RelationshipMatrix,
    MAX_PENALTY,
};
pub use recall::Recall;
