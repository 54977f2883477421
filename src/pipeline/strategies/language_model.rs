//! Greedy reading order merge driven by a continuation scorer.
//!
//! Every live candidate is scored as a continuation of every other one. The
//! pair with the highest row-normalized score is linked, the two chains are
//! replaced by their concatenation, and only the row and column of the new
//! chain are rescored. A page of `n` regions therefore costs `O(n²)` scorer
//! calls.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::ScoringConfig;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::reading_order::{NodeId, ReadingOrder};
use crate::scoring::{is_end_of_sentence, softmax, window_limit, ContinuationScorer, Tokenizer};

use super::{OrderingContext, OrderingStats, OrderingStrategy};

/// Reading order from pairwise continuation scores.
pub struct LanguageModelStrategy<S, T> {
    scoring: ScoringConfig,
    scorer: S,
    tokenizer: T,
}

impl<S, T> LanguageModelStrategy<S, T>
where
    S: ContinuationScorer,
    T: Tokenizer,
{
    /// Create the strategy.
    pub fn new(scoring: ScoringConfig, scorer: S, tokenizer: T) -> Self {
        Self {
            scoring,
            scorer,
            tokenizer,
        }
    }

    /// Probability of each candidate text following `source`.
    ///
    /// `candidates` holds `(id, text)` pairs; the result is aligned with it
    /// and sums to one.
    pub fn analyze_one(
        &self,
        source: &str,
        candidates: &[(&str, &str)],
        stats: &mut OrderingStats,
    ) -> Result<Vec<f64>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let source = self.candidate(source)?;
        let tokens: Vec<(&str, Vec<u32>)> = candidates
            .iter()
            .map(|(id, text)| (*id, self.tokenizer.encode(text)))
            .collect();
        let limit = self.limit(&source, candidates.len());

        let mut baselines = Baselines::<S::State>::default();
        let targets: Vec<(&str, &[u32])> = tokens.iter().map(|(id, t)| (*id, t.as_slice())).collect();
        let scores = self.score(&source.state, &targets, limit, &mut baselines, stats)?;
        Ok(softmax(&scores))
    }

    fn candidate(&self, text: &str) -> Result<Candidate<S::State>> {
        Ok(Candidate {
            state: self.scorer.read(text)?,
            tokens: self.tokenizer.encode(text),
            ends_sentence: is_end_of_sentence(text),
        })
    }

    fn limit(&self, source: &Candidate<S::State>, live: usize) -> usize {
        window_limit(
            self.scoring.window,
            live,
            source.tokens.len(),
            source.ends_sentence,
        )
    }

    /// Scores of `targets` as continuations of `state`, each target cut to
    /// `limit` tokens.
    fn score(
        &self,
        state: &S::State,
        targets: &[(&str, &[u32])],
        limit: usize,
        baselines: &mut Baselines<S::State>,
        stats: &mut OrderingStats,
    ) -> Result<Vec<f64>> {
        let windows: Vec<&[u32]> = targets
            .iter()
            .map(|(_, tokens)| &tokens[..limit.min(tokens.len())])
            .collect();

        let mut scores = self.scorer.estimate(state, &windows)?;
        stats.scorer_calls += 1;
        if scores.len() != windows.len() {
            return Err(Error::IncompleteCandidateSet {
                expected: windows.len(),
                actual: scores.len(),
            });
        }

        if self.scoring.subtract_baseline {
            let missing: Vec<usize> = (0..targets.len())
                .filter(|i| !baselines.values.contains_key(&(targets[*i].0.to_string(), limit)))
                .collect();
            if !missing.is_empty() {
                if baselines.init.is_none() {
                    baselines.init = Some(self.scorer.read_init()?);
                }
                let init = baselines
                    .init
                    .as_ref()
                    .ok_or_else(|| Error::Scorer("initial state unavailable".to_string()))?;
                let batch: Vec<&[u32]> = missing.iter().map(|i| windows[*i]).collect();
                let values = self.scorer.estimate(init, &batch)?;
                stats.scorer_calls += 1;
                if values.len() != batch.len() {
                    return Err(Error::IncompleteCandidateSet {
                        expected: batch.len(),
                        actual: values.len(),
                    });
                }
                for (i, value) in missing.into_iter().zip(values) {
                    baselines
                        .values
                        .insert((targets[i].0.to_string(), limit), value);
                }
            }
            for (score, (id, _)) in scores.iter_mut().zip(targets) {
                if let Some(base) = baselines.values.get(&(id.to_string(), limit)) {
                    *score -= base;
                }
            }
        }

        Ok(scores)
    }
}

/// Unconditional candidate scores keyed by `(id, window)`.
struct Baselines<St> {
    init: Option<St>,
    values: HashMap<(String, usize), f64>,
}

impl<St> Default for Baselines<St> {
    fn default() -> Self {
        Self {
            init: None,
            values: HashMap::new(),
        }
    }
}

struct Candidate<St> {
    state: St,
    tokens: Vec<u32>,
    ends_sentence: bool,
}

/// Live candidates and their pairwise scores during one merge run.
struct Merge<'a, S: ContinuationScorer, T> {
    strategy: &'a LanguageModelStrategy<S, T>,
    doc: &'a Document,
    live: IndexMap<String, Candidate<S::State>>,
    /// `rows[i][j]`: score of `j` continuing `i`
    rows: IndexMap<String, IndexMap<String, f64>>,
    baselines: Baselines<S::State>,
}

impl<'a, S, T> Merge<'a, S, T>
where
    S: ContinuationScorer,
    T: Tokenizer,
{
    fn score_row(&mut self, source: &str, targets: &[&str], stats: &mut OrderingStats) -> Result<Vec<f64>> {
        let candidate = self
            .live
            .get(source)
            .ok_or_else(|| Error::UnknownRegion(source.to_string()))?;
        let limit = self.strategy.limit(candidate, self.live.len());

        let mut windows = Vec::with_capacity(targets.len());
        for id in targets {
            let target = self
                .live
                .get(*id)
                .ok_or_else(|| Error::UnknownRegion(id.to_string()))?;
            windows.push((*id, target.tokens.as_slice()));
        }
        self.strategy
            .score(&candidate.state, &windows, limit, &mut self.baselines, stats)
    }

    fn score_all(&mut self, stats: &mut OrderingStats) -> Result<()> {
        let ids: Vec<String> = self.live.keys().cloned().collect();
        for source in &ids {
            let targets: Vec<&str> = ids.iter().filter(|t| *t != source).map(String::as_str).collect();
            let scores = self.score_row(source, &targets, stats)?;
            let row = targets.iter().map(|t| t.to_string()).zip(scores).collect();
            self.rows.insert(source.clone(), row);
        }
        Ok(())
    }

    /// Pair with the highest row-normalized score, first in live order on
    /// ties.
    fn best_pair(&self) -> Option<(String, String)> {
        let min = self
            .rows
            .values()
            .flat_map(|row| row.values().copied())
            .fold(f64::INFINITY, f64::min);
        let diagonal = min - 1.0;

        let mut best: Option<(f64, &str, &str)> = None;
        for (source, row) in &self.rows {
            let values: Vec<f64> = self
                .rows
                .keys()
                .map(|target| {
                    if target == source {
                        diagonal
                    } else {
                        row.get(target).copied().unwrap_or(diagonal)
                    }
                })
                .collect();
            let probs = softmax(&values);

            for (target, p) in self.rows.keys().zip(probs) {
                if target != source && best.map_or(true, |(b, _, _)| p > b) {
                    best = Some((p, source.as_str(), target.as_str()));
                }
            }
        }
        best.map(|(_, s, t)| (s.to_string(), t.to_string()))
    }

    /// Replace the merged pair by the chain starting at `head`.
    fn replace(
        &mut self,
        source: &str,
        successor: &str,
        head: &str,
        text: &str,
        stats: &mut OrderingStats,
    ) -> Result<()> {
        for removed in [source, successor] {
            self.live.shift_remove(removed);
            self.rows.shift_remove(removed);
            for row in self.rows.values_mut() {
                row.shift_remove(removed);
            }
        }
        self.baselines.values.retain(|(id, _), _| id != source && id != successor);

        self.live.insert(head.to_string(), self.strategy.candidate(text)?);
        if self.live.len() < 2 {
            return Ok(());
        }

        let others: Vec<String> = self.live.keys().filter(|id| *id != head).cloned().collect();
        for other in &others {
            let score = self.score_row(other, &[head], stats)?;
            if let (Some(row), Some(value)) = (self.rows.get_mut(other), score.first()) {
                row.insert(head.to_string(), *value);
            }
        }
        let targets: Vec<&str> = others.iter().map(String::as_str).collect();
        let scores = self.score_row(head, &targets, stats)?;
        self.rows
            .insert(head.to_string(), others.iter().cloned().zip(scores).collect());
        Ok(())
    }

    /// Merge until one chain is left; returns the tree and its ordered group.
    fn run(mut self, context: &mut OrderingContext) -> Result<(ReadingOrder, NodeId)> {
        let doc = self.doc;
        let (mut order, group) = ReadingOrder::with_ordered_group(&mut context.ids, |id| {
            doc.region(id).is_some()
        })?;

        match self.live.len() {
            0 => {},
            1 => {
                if let Some(id) = self.live.keys().next() {
                    order.add_item(group, id.as_str())?;
                }
            },
            _ => {
                self.score_all(&mut context.stats)?;
                while self.live.len() > 1 {
                    let Some((source, successor)) = self.best_pair() else {
                        break;
                    };
                    order.add_candidates(group, &source, &successor)?;
                    context.stats.merges += 1;

                    let node = order
                        .item(&source)
                        .ok_or_else(|| Error::UnknownRegion(source.clone()))?;
                    let first: NodeId = order.first(node);
                    let head = order.id(first).to_string();
                    let text = order.chain_text(first, doc);
                    log::debug!(
                        "merge {} -> {} ({} candidates left)",
                        source,
                        successor,
                        self.live.len() - 1
                    );
                    self.replace(&source, &successor, &head, &text, &mut context.stats)?;
                }
            },
        }

        Ok((order, group))
    }
}

impl<S, T> OrderingStrategy for LanguageModelStrategy<S, T>
where
    S: ContinuationScorer + Send + Sync,
    T: Tokenizer + Send + Sync,
{
    fn apply(&self, doc: &Document, context: &mut OrderingContext) -> Result<ReadingOrder> {
        let mut live = IndexMap::new();
        let mut silent = Vec::new();
        for region in doc.text_regions() {
            match region.text() {
                Some(text) if !text.trim().is_empty() => {
                    live.insert(region.id().to_string(), self.candidate(text)?);
                },
                _ => silent.push(region.id()),
            }
        }
        log::info!(
            "language model merge over {} regions ({} without text)",
            live.len(),
            silent.len()
        );

        let merge = Merge {
            strategy: self,
            doc,
            live,
            rows: IndexMap::new(),
            baselines: Baselines::default(),
        };
        let (mut order, group) = merge.run(context)?;

        // regions without text cannot be scored; they close the chain
        if !silent.is_empty() {
            let mut tail = order
                .children(group)
                .first()
                .map(|c| order.id(order.last(*c)).to_string());
            for id in silent {
                match &tail {
                    Some(last) => order.add_candidates(group, last, id)?,
                    None => {
                        order.add_item(group, id)?;
                    },
                }
                tail = Some(id.to_string());
            }
        }
        Ok(order)
    }

    fn name(&self) -> &'static str {
        "LanguageModelStrategy"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::test_support::*;
    use super::*;
    use crate::config::TokenWindow;

    const WORDS: [&str; 8] = ["one", "two", "three", "four", "five", "six", "seven", "eight"];

    fn strategy() -> LanguageModelStrategy<SuccessorScorer, WordTokenizer> {
        LanguageModelStrategy::new(
            ScoringConfig::default(),
            SuccessorScorer {
                tokenizer: WordTokenizer::new(&WORDS),
            },
            WordTokenizer::new(&WORDS),
        )
    }

    /// Regions scattered on the page, each holding one counting word.
    fn counting_page(words: &[&str]) -> Document {
        let regions = words
            .iter()
            .enumerate()
            .map(|(i, w)| text(&format!("r{}", i), 10.0 + 37.0 * i as f64, 500.0 - 41.0 * i as f64, 30.0, 20.0, w))
            .collect();
        page(regions)
    }

    #[test]
    fn test_merge_follows_scores() {
        let doc = counting_page(&["three", "one", "four", "two"]);
        let mut context = OrderingContext::new();
        let order = strategy().apply(&doc, &mut context).unwrap();

        let first = order.item("r1").unwrap();
        assert_eq!(order.chain_from(first), vec!["r1", "r3", "r0", "r2"]);
        assert_eq!(context.stats.merges, 3);
        assert_eq!(order.chain_reduction().len(), 3);
    }

    #[test]
    fn test_single_and_empty_pages() {
        let mut context = OrderingContext::new();
        let order = strategy().apply(&counting_page(&["one"]), &mut context).unwrap();
        assert_eq!(order.item_ids(), vec!["r0"]);
        assert_eq!(context.stats.scorer_calls, 0);

        let order = strategy().apply(&page(Vec::new()), &mut context).unwrap();
        assert!(order.item_ids().is_empty());
    }

    #[test]
    fn test_regions_without_text_close_the_chain() {
        let mut doc = counting_page(&["two", "one"]);
        doc.add_region(text("blank", 900.0, 900.0, 30.0, 20.0, "  ")).unwrap();
        let mut context = OrderingContext::new();
        let order = strategy().apply(&doc, &mut context).unwrap();
        let first = order.item("r1").unwrap();
        assert_eq!(order.chain_from(first), vec!["r1", "r0", "blank"]);
    }

    /// Counts calls and returns one score too few on demand.
    struct CountingScorer {
        calls: AtomicUsize,
        short: bool,
    }

    impl ContinuationScorer for CountingScorer {
        type State = usize;

        fn read(&self, context: &str) -> Result<usize> {
            Ok(context.len())
        }

        fn read_init(&self) -> Result<usize> {
            Ok(0)
        }

        fn estimate(&self, state: &usize, candidates: &[&[u32]]) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = if self.short { candidates.len() - 1 } else { candidates.len() };
            Ok((0..n).map(|i| (*state as f64 + i as f64).sin()).collect())
        }
    }

    #[test]
    fn test_scorer_calls_are_quadratic() {
        let scoring = ScoringConfig {
            window: TokenWindow::Fixed(3),
            subtract_baseline: false,
        };
        let strategy = LanguageModelStrategy::new(
            scoring,
            CountingScorer {
                calls: AtomicUsize::new(0),
                short: false,
            },
            WordTokenizer::new(&WORDS),
        );
        let n = WORDS.len();
        let doc = counting_page(&WORDS);
        let mut context = OrderingContext::new();
        let order = strategy.apply(&doc, &mut context).unwrap();

        assert_eq!(order.chain_reduction().len(), n - 1);
        assert_eq!(context.stats.merges, n - 1);
        assert_eq!(context.stats.scorer_calls, strategy.scorer.calls.load(Ordering::SeqCst));
        // n initial rows, then one column call per remaining source and one row
        let expected = n + (2..n).sum::<usize>();
        assert_eq!(context.stats.scorer_calls, expected);
        assert!(context.stats.scorer_calls <= n * n);
    }

    #[test]
    fn test_incomplete_scores_rejected() {
        let strategy = LanguageModelStrategy::new(
            ScoringConfig::default(),
            CountingScorer {
                calls: AtomicUsize::new(0),
                short: true,
            },
            WordTokenizer::new(&WORDS),
        );
        let err = strategy
            .apply(&counting_page(&["one", "two", "three"]), &mut OrderingContext::new())
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteCandidateSet { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_analyze_one() {
        let mut stats = OrderingStats::default();
        let probs = strategy()
            .analyze_one("one", &[("a", "three"), ("b", "two")], &mut stats)
            .unwrap();
        assert_eq!(probs.len(), 2);
        assert!(probs[1] > 0.99);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // estimate plus one baseline batch
        assert_eq!(stats.scorer_calls, 2);
    }
}
