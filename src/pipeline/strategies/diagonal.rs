//! Precedence graph ordering over individual text regions.

use crate::config::OrderingConfig;
use crate::document::Document;
use crate::error::Result;
use crate::pipeline::topological::{precedence_edges, sort_elements};
use crate::reading_order::{chain_to_reading_order, ReadingOrder};
use crate::spatial::SpatialAnalysis;

use super::{OrderingContext, OrderingStrategy};

/// Topological order of the "before in reading" graph over text regions.
///
/// Region `a` precedes `b` when it comes first both vertically and
/// horizontally. Regions that take part in no such pair are appended in
/// load order.
pub struct DiagonalStrategy {
    config: OrderingConfig,
}

impl DiagonalStrategy {
    /// Create the strategy.
    pub fn new(config: OrderingConfig) -> Self {
        Self { config }
    }
}

impl OrderingStrategy for DiagonalStrategy {
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let analysis = SpatialAnalysis::new(doc, &self.config.columns, &mut context.ids);
        let elements: Vec<&str> = analysis.text_region_ids().collect();

        let edges = precedence_edges(&analysis, &elements);
        let chain = sort_elements(&edges, &elements, self.config.strict_topology, context)?;
        chain_to_reading_order(&chain, &mut context.ids)
    }

    fn name(&self) -> &'static str {
        "DiagonalStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{page, text};
    use super::*;

    #[test]
    fn test_staircase() {
        let doc = page(vec![
            text("c", 400.0, 400.0, 100.0, 50.0, "c"),
            text("a", 0.0, 0.0, 100.0, 50.0, "a"),
            text("b", 200.0, 200.0, 100.0, 50.0, "b"),
        ]);
        let mut context = OrderingContext::new();
        let order = DiagonalStrategy::new(OrderingConfig::new())
            .apply(&doc, &mut context)
            .unwrap();
        assert_eq!(order.item_ids(), vec!["a", "b", "c"]);
        assert_eq!(context.stats.cycles, 0);
    }

    #[test]
    fn test_region_without_edges_is_kept() {
        // b is below a but to its left: neither precedes the other on both axes
        let doc = page(vec![
            text("a", 500.0, 0.0, 100.0, 50.0, "a"),
            text("b", 0.0, 300.0, 100.0, 50.0, "b"),
        ]);
        let mut context = OrderingContext::new();
        let order = DiagonalStrategy::new(OrderingConfig::new())
            .apply(&doc, &mut context)
            .unwrap();
        let mut ids = order.item_ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
