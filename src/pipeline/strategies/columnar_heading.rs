//! Columnar ordering with headers moved before the text they introduce.

use crate::config::OrderingConfig;
use crate::document::Document;
use crate::error::Result;
use crate::geometry::Axis;
use crate::pipeline::topological::{chain_pairs, sort_elements};
use crate::reading_order::{chain_to_reading_order, ReadingOrder};
use crate::spatial::{Relation, SpatialAnalysis};
use crate::utils::safe_float_cmp;

use super::{ColumnarStrategy, OrderingContext, OrderingStrategy};

/// Horizontal relations of a header to the region it introduces.
const BELOW_HEADER: [Relation; 7] = [
    Relation::Equals,
    Relation::During,
    Relation::Starts,
    Relation::Finishes,
    Relation::Overlaps,
    Relation::InverseOverlaps,
    Relation::InverseStarts,
];

/// Columnar order where every header is linked to the left-most neighbor
/// directly below it.
///
/// The links are forced into the columnar chain and the chain re-sorted
/// until no header link changes any more, or the pass limit is hit.
pub struct ColumnarHeadingStrategy {
    config: OrderingConfig,
    columnar: ColumnarStrategy,
}

impl ColumnarHeadingStrategy {
    /// Create the strategy.
    pub fn new(config: OrderingConfig) -> Self {
        let columnar = ColumnarStrategy::new(config.clone());
        Self { config, columnar }
    }

    /// `(header, successor)` pairs for every header with a region below it.
    fn header_links(&self, analysis: &SpatialAnalysis) -> Vec<(String, String)> {
        let mut links = Vec::new();
        for header in analysis.headers() {
            let below = analysis.neighborhood().neighbors(header).filter(|n| {
                matches!(
                    analysis.relation(Axis::Y, header, n),
                    Relation::Precedes | Relation::Meets
                ) && BELOW_HEADER.contains(&analysis.relation(Axis::X, header, n))
            });

            let mut successor: Option<(&str, f64)> = None;
            for n in below {
                let left = analysis.bbox(n).map(|r| r.left()).unwrap_or(f64::INFINITY);
                if successor.map_or(true, |(_, best)| safe_float_cmp(left, best).is_lt()) {
                    successor = Some((n, left));
                }
            }
            if let Some((n, _)) = successor {
                log::debug!("header {} introduces {}", header, n);
                links.push((header.clone(), n.to_string()));
            }
        }
        links
    }

    /// Force `links` into `chain`, re-sorting after each pass.
    fn relink(
        &self,
        mut chain: Vec<String>,
        links: &[(String, String)],
        context: &mut OrderingContext,
    ) -> Result<Vec<String>> {
        let limit = self.config.heading_max_iterations;
        for pass in 1..=limit {
            let Some(graph) = rewire(&chain, links) else {
                break;
            };
            let vertices: Vec<&str> = chain.iter().map(String::as_str).collect();
            chain = sort_elements(&graph, &vertices, false, context)?;
            context.stats.iterations += 1;

            if pass == limit {
                log::warn!("header relinking stopped after {} passes", limit);
            }
        }
        Ok(chain)
    }
}

/// Chain pairs of `chain` with every header link forced in, or `None` when
/// all links are already in place.
///
/// The pair leaving a header is pointed at its successor, and the pair that
/// led into that successor is pointed at the header instead.
fn rewire(chain: &[String], links: &[(String, String)]) -> Option<Vec<(String, String)>> {
    let mut graph = chain_pairs(chain);
    let mut changed = false;

    for (header, successor) in links {
        let Some(out) = graph.iter().position(|(a, _)| a == header) else {
            continue;
        };
        if graph[out].1 == *successor {
            continue;
        }
        changed = true;
        graph[out].1 = successor.clone();
        if let Some(into) = graph
            .iter()
            .position(|(a, b)| b == successor && a != header)
        {
            graph[into].1 = header.clone();
        }
    }

    changed.then_some(graph)
}

impl OrderingStrategy for ColumnarHeadingStrategy {
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let analysis = SpatialAnalysis::new(doc, &self.config.columns, &mut context.ids);
        let chain = self.columnar.chain(&analysis, context)?;

        let links = self.header_links(&analysis);
        let chain = if links.is_empty() {
            chain
        } else {
            self.relink(chain, &links, context)?
        };
        chain_to_reading_order(&chain, &mut context.ids)
    }

    fn name(&self) -> &'static str {
        "ColumnarHeadingStrategy"
    }
}
