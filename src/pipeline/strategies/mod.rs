//! Reading order strategies.
//!
//! # Available Strategies
//!
//! - [`TopToBottomStrategy`]: sort by top edge, then left edge
//! - [`DocumentOrderStrategy`]: keep the load order of the page
//! - [`DiagonalStrategy`]: topological order of the precedence graph
//! - [`ColumnarStrategy`]: topological order over columns and free regions
//! - [`ColumnarHeadingStrategy`]: columnar order with headers relinked
//! - [`LanguageModelStrategy`]: greedy merge driven by a continuation scorer
//! - [`ColumnarLanguageModelStrategy`]: columnar order refined by a scorer

mod columnar;
mod columnar_heading;
mod combined;
mod diagonal;
mod document_order;
mod language_model;
mod top_to_bottom;

pub use columnar::ColumnarStrategy;
pub use columnar_heading::ColumnarHeadingStrategy;
pub use combined::ColumnarLanguageModelStrategy;
pub use diagonal::DiagonalStrategy;
pub use document_order::DocumentOrderStrategy;
pub use language_model::LanguageModelStrategy;
pub use top_to_bottom::TopToBottomStrategy;

use serde::Serialize;

use crate::config::{OrderingConfig, StrategyKind};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::reading_order::{IdAllocator, ReadingOrder};
use crate::scoring::{ContinuationScorer, Tokenizer};

/// Trait for inferring the reading order of a page.
///
/// Implementations decide how text regions are chained. Geometry-only
/// strategies work on any page; the language model strategies also need
/// transcriptions.
pub trait OrderingStrategy: Send + Sync {
    /// Infer the reading order of the text regions of `doc`.
    ///
    /// # Arguments
    ///
    /// * `doc` - Page with its regions
    /// * `context` - Id allocation and counters for this run
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder>;

    /// Return the name of this strategy for debugging.
    fn name(&self) -> &'static str;
}

/// Counters collected during one ordering run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderingStats {
    /// Calls into the continuation scorer
    pub scorer_calls: usize,
    /// Cycles met in precedence graphs
    pub cycles: usize,
    /// Greedy merge steps
    pub merges: usize,
    /// Column boundaries reconnected
    pub reconnections: usize,
    /// Refinement passes run
    pub iterations: usize,
}

/// State owned by one ordering run.
#[derive(Debug, Default)]
pub struct OrderingContext {
    /// Generated ids for columns and groups.
    pub ids: IdAllocator,

    /// Run counters.
    pub stats: OrderingStats,
}

impl OrderingContext {
    /// Create a fresh context.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Create a geometry-only strategy based on configuration.
///
/// Strategies that need a scorer are built with [`create_scored_strategy`].
pub fn create_strategy(config: &OrderingConfig) -> Result<Box<dyn OrderingStrategy>> {
    let strategy: Box<dyn OrderingStrategy> = match config.strategy {
        StrategyKind::TopToBottom => Box::new(TopToBottomStrategy),
        StrategyKind::DocumentOrder => Box::new(DocumentOrderStrategy),
        StrategyKind::Diagonal => Box::new(DiagonalStrategy::new(config.clone())),
        StrategyKind::Columnar => Box::new(ColumnarStrategy::new(config.clone())),
        StrategyKind::ColumnarHeading => Box::new(ColumnarHeadingStrategy::new(config.clone())),
        kind @ (StrategyKind::LanguageModel | StrategyKind::ColumnarLanguageModel) => {
            return Err(Error::Config(format!("strategy {:?} needs a continuation scorer", kind)));
        },
    };
    Ok(strategy)
}

/// Create any strategy; the scorer and tokenizer are used by the language
/// model strategies and ignored by the others.
pub fn create_scored_strategy<S, T>(
    config: &OrderingConfig,
    scorer: S,
    tokenizer: T,
) -> Result<Box<dyn OrderingStrategy>>
where
    S: ContinuationScorer + Send + Sync + 'static,
    T: Tokenizer + Send + Sync + 'static,
{
    match config.strategy {
        StrategyKind::LanguageModel => Ok(Box::new(LanguageModelStrategy::new(
            config.scoring.clone(),
            scorer,
            tokenizer,
        ))),
        StrategyKind::ColumnarLanguageModel => Ok(Box::new(ColumnarLanguageModelStrategy::new(
            config.clone(),
            scorer,
            tokenizer,
        ))),
        _ => create_strategy(config),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Pages and deterministic scorers shared by the strategy tests.

    use std::collections::HashMap;

    use crate::document::{Document, Region};
    use crate::error::Result;
    use crate::geometry::Rect;
    use crate::scoring::{ContinuationScorer, Tokenizer};

    pub fn text(id: &str, x: f64, y: f64, w: f64, h: f64, text: &str) -> Region {
        Region::text_region(id, Rect::new(x, y, w, h).corners().to_vec(), text).unwrap()
    }

    pub fn page(regions: Vec<Region>) -> Document {
        let mut doc = Document::new(1000.0, 1000.0);
        for region in regions {
            doc.add_region(region).unwrap();
        }
        doc
    }

    /// Two columns of three regions, left column first in load order.
    pub fn two_columns() -> Document {
        page(vec![
            text("l1", 50.0, 100.0, 400.0, 80.0, "left one"),
            text("l2", 50.0, 200.0, 400.0, 80.0, "left two"),
            text("l3", 50.0, 300.0, 400.0, 80.0, "left three"),
            text("r1", 550.0, 100.0, 400.0, 80.0, "right one"),
            text("r2", 550.0, 200.0, 400.0, 80.0, "right two"),
            text("r3", 550.0, 300.0, 400.0, 80.0, "right three"),
        ])
    }

    /// One token per whitespace separated word, numbered by a fixed table.
    pub struct WordTokenizer {
        pub vocab: HashMap<String, u32>,
    }

    impl WordTokenizer {
        pub fn new(words: &[&str]) -> Self {
            let vocab = words
                .iter()
                .enumerate()
                .map(|(i, w)| (w.to_string(), i as u32 + 1))
                .collect();
            Self { vocab }
        }
    }

    impl Tokenizer for WordTokenizer {
        fn encode(&self, text: &str) -> Vec<u32> {
            text.split_whitespace()
                .map(|w| self.vocab.get(w).copied().unwrap_or(0))
                .collect()
        }
    }

    /// Scores a candidate by how well its first token continues the last
    /// token read: `next == last + 1` scores 10, anything else 0.
    pub struct SuccessorScorer {
        pub tokenizer: WordTokenizer,
    }

    impl ContinuationScorer for SuccessorScorer {
        type State = Option<u32>;

        fn read(&self, context: &str) -> Result<Self::State> {
            Ok(self.tokenizer.encode(context).last().copied())
        }

        fn read_init(&self) -> Result<Self::State> {
            Ok(None)
        }

        fn estimate(&self, state: &Self::State, candidates: &[&[u32]]) -> Result<Vec<f64>> {
            Ok(candidates
                .iter()
                .map(|tokens| match (state, tokens.first()) {
                    (Some(last), Some(first)) if *first == last + 1 => 10.0,
                    _ => 0.0,
                })
                .collect())
        }
    }
}
