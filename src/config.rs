//! Configuration for reading order inference.
//!
//! All thresholds the ordering strategies use are collected here so they can
//! be tuned per corpus and loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
pub use crate::spatial::{CentroidRule, OutlierCutoff};

/// Ordering strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Sort by top edge, then left edge
    TopToBottom,
    /// Keep the load order of the page
    DocumentOrder,
    /// Topological order of the precedence graph over text regions
    Diagonal,
    /// Topological order over columns and independent regions
    #[default]
    Columnar,
    /// Columnar order with headers moved before their left-most successor
    ColumnarHeading,
    /// Greedy merge driven by a continuation scorer
    LanguageModel,
    /// Columnar order refined at column boundaries by a continuation scorer
    ColumnarLanguageModel,
}

impl StrategyKind {
    /// Every strategy that needs no scorer.
    pub const SPATIAL: [StrategyKind; 5] = [
        StrategyKind::TopToBottom,
        StrategyKind::DocumentOrder,
        StrategyKind::Diagonal,
        StrategyKind::Columnar,
        StrategyKind::ColumnarHeading,
    ];

    /// Whether the strategy needs a continuation scorer.
    pub fn needs_scorer(self) -> bool {
        matches!(self, StrategyKind::LanguageModel | StrategyKind::ColumnarLanguageModel)
    }
}

/// Column detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ColumnConfig {
    /// Length limit for candidate column links.
    pub outlier_cutoff: OutlierCutoff,

    /// Seed point of the Voronoi neighbor cells.
    pub neighbor_centroid: CentroidRule,
}

/// Token window applied to candidate texts before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenWindow {
    /// Always keep the first `n` tokens
    Fixed(usize),
    /// Window size from lookup tables keyed by candidate and token counts
    Adaptive {
        /// Use the wider tables when the source ends a sentence
        sentence_aware: bool,
    },
}

impl Default for TokenWindow {
    fn default() -> Self {
        TokenWindow::Fixed(5)
    }
}

/// Continuation scoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Candidate token window.
    pub window: TokenWindow,

    /// Subtract the unconditional likelihood of each candidate.
    pub subtract_baseline: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window: TokenWindow::default(),
            subtract_baseline: true,
        }
    }
}

/// Thresholds for reconnecting column boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Probability the favorite needs with exactly two candidates.
    pub two_candidate_threshold: f64,

    /// Probability the favorite needs with three or more candidates.
    pub multi_candidate_threshold: f64,

    /// Below this probability the current successor is dropped outright.
    pub weak_incumbent_threshold: f64,

    /// Candidate count from which the weak incumbent rule applies.
    pub weak_incumbent_min_candidates: usize,

    /// Cap on refinement passes.
    pub max_iterations: usize,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            two_candidate_threshold: 0.85,
            multi_candidate_threshold: 0.6,
            weak_incumbent_threshold: 0.10,
            weak_incumbent_min_candidates: 3,
            max_iterations: 8,
        }
    }
}

/// Reading order inference configuration.
///
/// # Examples
///
/// ```
/// use page_order::config::{OrderingConfig, StrategyKind};
///
/// let config = OrderingConfig::new()
///     .with_strategy(StrategyKind::Diagonal)
///     .with_strict_topology(true);
/// assert_eq!(config.strategy, StrategyKind::Diagonal);
/// assert!(config.strict_topology);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Strategy to run.
    pub strategy: StrategyKind,

    /// Column detection settings.
    pub columns: ColumnConfig,

    /// Continuation scoring settings.
    pub scoring: ScoringConfig,

    /// Column boundary reconnection settings.
    pub reconnect: ReconnectConfig,

    /// Cap on header relinking passes.
    pub heading_max_iterations: usize,

    /// Fail on cycles in the precedence graph instead of breaking them.
    pub strict_topology: bool,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderingConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            strategy: StrategyKind::default(),
            columns: ColumnConfig::default(),
            scoring: ScoringConfig::default(),
            reconnect: ReconnectConfig::default(),
            heading_max_iterations: 200,
            strict_topology: false,
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: OrderingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let r = &self.reconnect;
        for (name, value) in [
            ("two_candidate_threshold", r.two_candidate_threshold),
            ("multi_candidate_threshold", r.multi_candidate_threshold),
            ("weak_incumbent_threshold", r.weak_incumbent_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if let TokenWindow::Fixed(0) = self.scoring.window {
            return Err(Error::Config("fixed token window must be positive".to_string()));
        }
        Ok(())
    }

    /// Select the strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set column detection settings.
    pub fn with_columns(mut self, columns: ColumnConfig) -> Self {
        self.columns = columns;
        self
    }

    /// Set scoring settings.
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set reconnection thresholds.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Cap header relinking passes.
    pub fn with_heading_max_iterations(mut self, iterations: usize) -> Self {
        self.heading_max_iterations = iterations;
        self
    }

    /// Fail on precedence cycles.
    pub fn with_strict_topology(mut self, strict: bool) -> Self {
        self.strict_topology = strict;
        self
    }
}
