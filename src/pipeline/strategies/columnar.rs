//! Column-aware precedence graph ordering.

use crate::config::OrderingConfig;
use crate::document::Document;
use crate::error::Result;
use crate::pipeline::topological::{precedence_edges, sort_elements};
use crate::reading_order::{chain_to_reading_order, ReadingOrder};
use crate::spatial::SpatialAnalysis;

use super::{OrderingContext, OrderingStrategy};

/// Topological order over detected columns and the regions outside them.
///
/// Each column takes part in the precedence graph as a single element and
/// is expanded into its members, top to bottom, once the graph is sorted.
pub struct ColumnarStrategy {
    config: OrderingConfig,
}

impl ColumnarStrategy {
    /// Create the strategy.
    pub fn new(config: OrderingConfig) -> Self {
        Self { config }
    }

    /// Columnar chain of region ids for an analyzed page.
    pub(crate) fn chain(
        &self,
        analysis: &SpatialAnalysis,
        context: &mut OrderingContext,
    ) -> Result<Vec<String>> {
        let mut elements: Vec<&str> = analysis.columns().map(|c| c.id()).collect();
        elements.extend(analysis.independent_regions());

        let edges = precedence_edges(analysis, &elements);
        let sorted = sort_elements(&edges, &elements, self.config.strict_topology, context)?;

        let mut chain = Vec::with_capacity(sorted.len());
        for id in sorted {
            match analysis.column(&id) {
                Some(column) => chain.extend(column.members().iter().cloned()),
                None => chain.push(id),
            }
        }
        Ok(chain)
    }
}

impl OrderingStrategy for ColumnarStrategy {
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let analysis = SpatialAnalysis::new(doc, &self.config.columns, &mut context.ids);
        let chain = self.chain(&analysis, context)?;
        chain_to_reading_order(&chain, &mut context.ids)
    }

    fn name(&self) -> &'static str {
        "ColumnarStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::two_columns;
    use super::*;

    #[test]
    fn test_columns_read_one_after_another() {
        let doc = two_columns();
        let mut context = OrderingContext::new();
        let order = ColumnarStrategy::new(OrderingConfig::new())
            .apply(&doc, &mut context)
            .unwrap();
        assert_eq!(order.item_ids(), vec!["l1", "l2", "l3", "r1", "r2", "r3"]);
    }

    #[test]
    fn test_chain_expands_columns() {
        let doc = two_columns();
        let mut context = OrderingContext::new();
        let strategy = ColumnarStrategy::new(OrderingConfig::new());
        let analysis = SpatialAnalysis::new(&doc, &OrderingConfig::new().columns, &mut context.ids);
        let chain = strategy.chain(&analysis, &mut context).unwrap();
        assert_eq!(chain.len(), 6);
        assert!(chain.iter().all(|id| !analysis.is_column(id)));
    }
}
