//! Columnar ordering with column boundaries checked by a continuation scorer.

use indexmap::IndexSet;

use crate::config::{OrderingConfig, ReconnectConfig};
use crate::document::Document;
use crate::error::Result;
use crate::geometry::{Axis, Rect};
use crate::pipeline::topological::{chain_pairs, sort_elements};
use crate::reading_order::{chain_to_reading_order, ReadingOrder};
use crate::scoring::{ContinuationScorer, Tokenizer};
use crate::spatial::{crosses_another, Relation, SpatialAnalysis};
use crate::utils::safe_float_cmp;

use super::{ColumnarStrategy, LanguageModelStrategy, OrderingContext, OrderingStrategy};

/// Horizontal relations of a region below to the region it continues.
const ALIGNED_BELOW: [Relation; 7] = [
    Relation::Starts,
    Relation::InverseStarts,
    Relation::During,
    Relation::Finishes,
    Relation::Overlaps,
    Relation::InverseOverlaps,
    Relation::Equals,
];

/// Horizontal relations of an element to the region it sits on top of.
const ALIGNED_ABOVE: [Relation; 5] = [
    Relation::Starts,
    Relation::InverseStarts,
    Relation::During,
    Relation::Finishes,
    Relation::Equals,
];

/// Columnar order where the link leaving each column may be moved to a
/// region the scorer prefers.
///
/// For every region closing a column, the current successor competes with
/// the nearest aligned region below and the nearest region to the right
/// (plus whatever sits on top of that one). Columns take part as a whole,
/// scored on their joined text.
pub struct ColumnarLanguageModelStrategy<S, T> {
    config: OrderingConfig,
    columnar: ColumnarStrategy,
    model: LanguageModelStrategy<S, T>,
}

impl<S, T> ColumnarLanguageModelStrategy<S, T>
where
    S: ContinuationScorer,
    T: Tokenizer,
{
    /// Create the strategy.
    pub fn new(config: OrderingConfig, scorer: S, tokenizer: T) -> Self {
        let columnar = ColumnarStrategy::new(config.clone());
        let model = LanguageModelStrategy::new(config.scoring.clone(), scorer, tokenizer);
        Self {
            config,
            columnar,
            model,
        }
    }

    /// Re-link column ends until a full pass changes nothing.
    fn refine(
        &self,
        doc: &Document,
        analysis: &SpatialAnalysis,
        mut chain: Vec<String>,
        context: &mut OrderingContext,
    ) -> Result<Vec<String>> {
        let column_ends: Vec<&str> = analysis
            .text_region_ids()
            .filter(|id| analysis.is_last_in_column(id))
            .collect();
        if column_ends.is_empty() {
            return Ok(chain);
        }

        let limit = self.config.reconnect.max_iterations;
        for pass in 1..=limit {
            let mut changed = false;
            for end in &column_ends {
                if let Some(reordered) = self.revisit(doc, analysis, end, &chain, context)? {
                    chain = reordered;
                    changed = true;
                }
            }
            context.stats.iterations += 1;
            if !changed {
                break;
            }
            if pass == limit {
                log::warn!("column reconnection stopped after {} passes", limit);
            }
        }
        Ok(chain)
    }

    /// New chain when the successor of `end` should change.
    fn revisit(
        &self,
        doc: &Document,
        analysis: &SpatialAnalysis,
        end: &str,
        chain: &[String],
        context: &mut OrderingContext,
    ) -> Result<Option<Vec<String>>> {
        let pairs = chain_pairs(chain);
        let Some(incumbent) = pairs.iter().find(|(a, _)| a == end).map(|(_, b)| b.clone()) else {
            return Ok(None);
        };

        let own = analysis.column_id(end);
        let mut candidates: IndexSet<&str> = IndexSet::new();
        let raw = std::iter::once(incumbent.as_str())
            .chain(below(analysis, end))
            .chain(beside(analysis, end));
        for id in raw {
            let id = analysis.column_id(id);
            if id != end && id != own {
                candidates.insert(id);
            }
        }
        if candidates.len() < 2 {
            return Ok(None);
        }

        let source = analysis.text(doc, own).unwrap_or_default();
        let scored: Vec<(&str, &str)> = candidates
            .iter()
            .map(|id| (*id, analysis.text(doc, id).unwrap_or_default()))
            .collect();
        let probs = self.model.analyze_one(source, &scored, &mut context.stats)?;

        let Some(best) = argmax(&probs) else {
            return Ok(None);
        };
        let winner = match analysis.column(scored[best].0) {
            Some(column) => column.first(),
            None => scored[best].0,
        };
        // the incumbent went in first
        if winner == incumbent || !can_make_change(&probs, 0, best, &self.config.reconnect) {
            return Ok(None);
        }

        log::debug!(
            "reconnect {}: {} -> {} (p={:.3})",
            end,
            incumbent,
            winner,
            probs[best]
        );
        let pairs = reconnect(
            pairs,
            &(end.to_string(), incumbent.clone()),
            &(end.to_string(), winner.to_string()),
        );
        let vertices: Vec<&str> = chain.iter().map(String::as_str).collect();
        let reordered = sort_elements(&pairs, &vertices, false, context)?;
        context.stats.reconnections += 1;
        Ok(Some(reordered))
    }
}

/// Nearest neighbor below `el` that is horizontally aligned with it.
///
/// A neighbor with exactly the same horizontal extent counts as twice as
/// close.
fn below<'a>(analysis: &'a SpatialAnalysis, el: &str) -> Option<&'a str> {
    let candidates = analysis.neighborhood().neighbors(el).filter(|n| {
        analysis.relation(Axis::Y, el, n) == Relation::Precedes
            && ALIGNED_BELOW.contains(&analysis.relation(Axis::X, n, el))
    });
    nearest(analysis, candidates, |n, top| {
        if analysis.relation(Axis::X, el, n) == Relation::Equals {
            top / 2.0
        } else {
            top
        }
    })
}

/// Nearest neighbor to the right of `el`, followed by the element on top of
/// it.
fn beside<'a>(analysis: &'a SpatialAnalysis, el: &str) -> Vec<&'a str> {
    let right = analysis
        .neighborhood()
        .neighbors(el)
        .filter(|n| analysis.relation(Axis::X, el, n) == Relation::Precedes);
    let Some(right) = nearest(analysis, right, |_, top| top) else {
        return Vec::new();
    };

    let mut found = vec![right];
    found.extend(above(analysis, right));
    found
}

/// Nearest text region or column resting on top of `p`, unless the way up
/// crosses a header.
fn above<'a>(analysis: &'a SpatialAnalysis, p: &str) -> Option<&'a str> {
    let p_box = analysis.bbox(p)?;
    let headers: Vec<(&str, Rect)> = analysis
        .headers()
        .iter()
        .filter_map(|h| analysis.bbox(h).map(|r| (h.as_str(), r)))
        .collect();

    let elements = analysis
        .text_region_ids()
        .chain(analysis.columns().map(|c| c.id()))
        .filter(|x| {
            *x != p
                && ALIGNED_ABOVE.contains(&analysis.relation(Axis::X, x, p))
                && matches!(
                    analysis.relation(Axis::Y, x, p),
                    Relation::Precedes | Relation::Meets
                )
        })
        .filter(|x| {
            let Some(x_box) = analysis.bbox(x) else {
                return false;
            };
            !crosses_another(
                (p, &p_box),
                (*x, &x_box),
                headers.iter().map(|(id, r)| (*id, r)),
            )
        });
    nearest(analysis, elements, |_, top| top)
}

/// Element with the smallest `key(id, top edge)`, first one on ties.
fn nearest<'a, I, F>(analysis: &SpatialAnalysis, ids: I, key: F) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str, f64) -> f64,
{
    let mut best: Option<(&str, f64)> = None;
    for id in ids {
        let Some(rect) = analysis.bbox(id) else {
            continue;
        };
        let value = key(id, rect.top());
        if best.map_or(true, |(_, b)| safe_float_cmp(value, b).is_lt()) {
            best = Some((id, value));
        }
    }
    best.map(|(id, _)| id)
}

fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        if best.map_or(true, |b| safe_float_cmp(*v, values[b]).is_gt()) {
            best = Some(i);
        }
    }
    best
}

/// Whether the scorer's favorite should replace the incumbent successor.
fn can_make_change(probs: &[f64], incumbent: usize, winner: usize, config: &ReconnectConfig) -> bool {
    if probs.len() >= config.weak_incumbent_min_candidates
        && probs[incumbent] < config.weak_incumbent_threshold
    {
        return true;
    }
    let threshold = if probs.len() == 2 {
        config.two_candidate_threshold
    } else {
        config.multi_candidate_threshold
    };
    probs[winner] >= threshold
}

/// Replace the pair `old` by `new` in a precedence list.
///
/// Every pair leading into the new successor is dropped, `new` takes the
/// place of `old`, and the orphaned old successor is attached to the end of
/// the path leaving the new successor.
fn reconnect(
    mut pairs: Vec<(String, String)>,
    old: &(String, String),
    new: &(String, String),
) -> Vec<(String, String)> {
    if old == new {
        return pairs;
    }

    pairs.retain(|(_, b)| *b != new.1);
    match pairs.iter().position(|p| p == old) {
        Some(i) => pairs[i] = new.clone(),
        None => pairs.push(new.clone()),
    }

    let mut tail = new.1.as_str();
    let mut seen: IndexSet<&str> = IndexSet::new();
    while seen.insert(tail) {
        match pairs.iter().find(|(a, _)| a == tail) {
            Some((_, b)) => tail = b.as_str(),
            None => break,
        }
    }
    if tail != old.1 {
        let link = (tail.to_string(), old.1.clone());
        pairs.push(link);
    }
    pairs
}

impl<S, T> OrderingStrategy for ColumnarLanguageModelStrategy<S, T>
where
    S: ContinuationScorer + Send + Sync,
    T: Tokenizer + Send + Sync,
{
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let analysis = SpatialAnalysis::new(doc, &self.config.columns, &mut context.ids);
        let chain = self.columnar.chain(&analysis, context)?;
        let chain = self.refine(doc, &analysis, chain, context)?;
        chain_to_reading_order(&chain, &mut context.ids)
    }

    fn name(&self) -> &'static str {
        "ColumnarLanguageModelStrategy"
    }
}
