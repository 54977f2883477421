//! Reading order pipeline.
//!
//! ```text
//! Document (regions + optional reference order)
//!     ↓
//! [SpatialAnalysis] (relations, neighbors, columns, headers)
//!     ↓
//! [OrderingStrategy] (pluggable, optionally scorer driven)
//!     ↓
//! ReadingOrder
//!     ↓
//! [metric] (relationship penalty + link recall against the reference)
//! ```
//!
//! Strategies are trait objects built from an [`OrderingConfig`]; the
//! pipeline only owns the configuration and one strategy.

mod strategies;
pub mod topological;

pub use strategies::{
    create_scored_strategy, create_strategy, ColumnarHeadingStrategy,
    ColumnarLanguageModelStrategy, ColumnarStrategy, DiagonalStrategy, DocumentOrderStrategy,
    LanguageModelStrategy, OrderingContext, OrderingStats, OrderingStrategy, TopToBottomStrategy,
};
pub use topological::{chain_pairs, precedence_edges, sort_elements, topological_sort, TopologicalOrder};

use serde::Serialize;

use crate::config::OrderingConfig;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::metric::{self, PrimaResults, Recall};
use crate::reading_order::ReadingOrder;

/// Scores of one predicted order against the page's reference.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Strategy that produced the prediction
    pub strategy: &'static str,
    /// Relationship metric
    pub prima: PrimaResults,
    /// Chain link recall
    pub recall: Recall,
    /// Counters of the ordering run
    pub stats: OrderingStats,
}

/// The ordering pipeline: a configuration and the strategy it selects.
///
/// # Examples
///
/// ```
/// use page_order::document::{Document, Region};
/// use page_order::geometry::Rect;
/// use page_order::pipeline::OrderingPipeline;
///
/// let mut doc = Document::new(100.0, 100.0);
/// for (id, y) in [("b", 50.0), ("a", 10.0)] {
///     let points = Rect::new(10.0, y, 80.0, 20.0).corners().to_vec();
///     doc.add_region(Region::text_region(id, points, "text").unwrap()).unwrap();
/// }
///
/// let order = OrderingPipeline::new().process(&doc).unwrap();
/// assert_eq!(order.item_ids(), vec!["a", "b"]);
/// ```
pub struct OrderingPipeline {
    config: OrderingConfig,
    strategy: Box<dyn OrderingStrategy>,
}

impl OrderingPipeline {
    /// Pipeline running the default columnar strategy.
    pub fn new() -> Self {
        let config = OrderingConfig::default();
        let strategy = Box::new(ColumnarStrategy::new(config.clone()));
        Self { config, strategy }
    }

    /// Pipeline running the strategy `config` selects.
    ///
    /// Fails when the configuration is invalid or the strategy needs a
    /// scorer; use [`OrderingPipeline::with_strategy`] for those.
    pub fn with_config(config: OrderingConfig) -> Result<Self> {
        config.validate()?;
        let strategy = create_strategy(&config)?;
        Ok(Self { config, strategy })
    }

    /// Replace the strategy, keeping the configuration.
    pub fn with_strategy(mut self, strategy: Box<dyn OrderingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Infer the reading order of `doc`.
    pub fn process(&self, doc: &Document) -> Result<ReadingOrder> {
        self.process_with_stats(doc).map(|(order, _)| order)
    }

    /// Infer the reading order of `doc` and return the run counters.
    pub fn process_with_stats(&self, doc: &Document) -> Result<(ReadingOrder, OrderingStats)> {
        let mut context = OrderingContext::new();
        let order = self.strategy.apply(doc, &mut context)?;
        log::info!(
            "{}: ordered {} regions ({} scorer calls, {} cycles)",
            self.strategy.name(),
            order.item_ids().len(),
            context.stats.scorer_calls,
            context.stats.cycles
        );
        Ok((order, context.stats))
    }

    /// Order `doc` and score the result against its reference order.
    pub fn evaluate(&self, doc: &Document) -> Result<Evaluation> {
        let reference = doc.reference_reading_order().ok_or(Error::MissingReference)?;
        let (predicted, stats) = self.process_with_stats(doc)?;

        let prima = metric::compare(reference, &predicted, doc.text_region_count())?;
        let recall = metric::recall::compare(reference, &predicted);
        log::debug!(
            "{}: penalty {}, {:.2}%, recall {:.2}%",
            self.strategy.name(),
            prima.penalty(),
            prima.percentage(),
            recall.recall()
        );

        Ok(Evaluation {
            strategy: self.strategy.name(),
            prima,
            recall,
            stats,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

impl Default for OrderingPipeline {
    fn default() -> Self {
        Self::new()
    }
}
