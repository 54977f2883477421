//! Spatial relation engine.
//!
//! Pairwise interval relations on both axes, the "before in reading" tables
//! built on them, a Voronoi neighbor graph and column detection. The
//! [`SpatialAnalysis`] bundle computes all of it once per page.

mod analysis;
mod columns;
mod connector;
mod headers;
mod matrix;
mod neighborhood;
mod relation;
mod tolerance;

pub use analysis::SpatialAnalysis;
pub use columns::{detect_columns, Column, OutlierCutoff};
pub use connector::{connector, crosses_another, Direction};
pub use headers::{detect_headers, detect_page_number, text_density};
pub use matrix::RelationMatrix;
pub use neighborhood::{CentroidRule, NeighborGraph};
pub use relation::{classify, relation, Relation};
pub use tolerance::{calculate_column_tolerance, calculate_tolerance};
