//! Integration tests for the ordering strategies and the pipeline.

use std::collections::HashMap;

use page_order::config::{OrderingConfig, StrategyKind};
use page_order::document::{Document, Region};
use page_order::fixture::PageFixture;
use page_order::geometry::Rect;
use page_order::pipeline::{
    create_scored_strategy, create_strategy, OrderingContext, OrderingPipeline,
};
use page_order::scoring::{ContinuationScorer, Tokenizer};
use page_order::{Error, Result};

// ============================================================================
// Helper Functions
// ============================================================================

const BODY: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing";

fn text(id: &str, x: f64, y: f64, w: f64, h: f64, text: &str) -> Region {
    Region::text_region(id, Rect::new(x, y, w, h).corners().to_vec(), text).unwrap()
}

fn page(width: f64, height: f64, regions: Vec<Region>) -> Document {
    let mut doc = Document::new(width, height);
    for region in regions {
        doc.add_region(region).unwrap();
    }
    doc
}

/// Two columns under a wide title, page number at the bottom.
fn two_column_page() -> Document {
    page(
        1000.0,
        1200.0,
        vec![
            text("title", 100.0, 50.0, 800.0, 80.0, "Title"),
            text("l1", 100.0, 200.0, 350.0, 150.0, BODY),
            text("l2", 100.0, 380.0, 350.0, 150.0, BODY),
            text("r1", 550.0, 200.0, 350.0, 150.0, BODY),
            text("r2", 550.0, 380.0, 350.0, 150.0, BODY),
            text("pn", 480.0, 1100.0, 40.0, 30.0, "7"),
        ],
    )
}

fn order_with(kind: StrategyKind, doc: &Document) -> Vec<String> {
    let strategy = create_strategy(&OrderingConfig::new().with_strategy(kind)).unwrap();
    strategy.apply(doc, &mut OrderingContext::new()).unwrap().item_ids()
}

/// Numbers known words from one upwards; unknown words are 0.
struct CountingTokenizer {
    vocab: HashMap<String, u32>,
}

impl CountingTokenizer {
    fn new(words: &[&str]) -> Self {
        let vocab = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.to_string(), i as u32 + 1))
            .collect();
        Self { vocab }
    }
}

impl Tokenizer for CountingTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace()
            .map(|w| self.vocab.get(w).copied().unwrap_or(0))
            .collect()
    }
}

/// Prefers candidates whose first word counts on from the last word read.
struct CountingScorer {
    tokenizer: CountingTokenizer,
}

impl ContinuationScorer for CountingScorer {
    type State = Option<u32>;

    fn read(&self, context: &str) -> Result<Option<u32>> {
        Ok(self.tokenizer.encode(context).last().copied())
    }

    fn read_init(&self) -> Result<Option<u32>> {
        Ok(None)
    }

    fn estimate(&self, state: &Option<u32>, candidates: &[&[u32]]) -> Result<Vec<f64>> {
        Ok(candidates
            .iter()
            .map(|tokens| match (state, tokens.first()) {
                (Some(last), Some(first)) if *first == last + 1 => 10.0,
                _ => 0.0,
            })
            .collect())
    }
}

const NUMBERS: [&str; 6] = ["one", "two", "three", "four", "five", "six"];

fn scored(kind: StrategyKind) -> Box<dyn page_order::OrderingStrategy> {
    let scorer = CountingScorer {
        tokenizer: CountingTokenizer::new(&NUMBERS),
    };
    create_scored_strategy(
        &OrderingConfig::new().with_strategy(kind),
        scorer,
        CountingTokenizer::new(&NUMBERS),
    )
    .unwrap()
}

// ============================================================================
// Geometry-only Strategies
// ============================================================================

#[test]
fn test_every_strategy_orders_every_text_region() {
    let doc = two_column_page();
    for kind in StrategyKind::SPATIAL {
        let mut ids = order_with(kind, &doc);
        ids.sort();
        assert_eq!(ids, vec!["l1", "l2", "pn", "r1", "r2", "title"], "{:?}", kind);
    }
}

#[test]
fn test_top_to_bottom_reads_rows() {
    assert_eq!(
        order_with(StrategyKind::TopToBottom, &two_column_page()),
        vec!["title", "l1", "r1", "l2", "r2", "pn"]
    );
}

#[test]
fn test_columnar_reads_columns() {
    let expected = vec!["title", "l1", "l2", "r1", "r2", "pn"];
    assert_eq!(order_with(StrategyKind::Columnar, &two_column_page()), expected);
    // the title already leads into the left column
    assert_eq!(order_with(StrategyKind::ColumnarHeading, &two_column_page()), expected);
}

#[test]
fn test_diagonal_keeps_columns_internally_ordered() {
    let ids = order_with(StrategyKind::Diagonal, &two_column_page());
    let at = |id: &str| ids.iter().position(|x| x == id).unwrap();
    assert_eq!(at("title"), 0);
    assert!(at("l1") < at("l2"));
    assert!(at("r1") < at("r2"));
    assert!(at("l1") < at("r1"));
}

#[test]
fn test_images_are_not_ordered() {
    let json = r#"{
        "width": 500, "height": 500,
        "regions": [
            { "id": "a", "points": [[10, 10], [400, 10], [400, 60], [10, 60]], "text": "first" },
            { "id": "pic", "kind": "image", "points": [[10, 100], [400, 100], [400, 300], [10, 300]] },
            { "id": "b", "points": [[10, 350], [400, 350], [400, 400], [10, 400]], "text": "second" }
        ]
    }"#;
    let doc = PageFixture::from_json_str(json).unwrap().to_document().unwrap();
    assert_eq!(order_with(StrategyKind::Columnar, &doc), vec!["a", "b"]);
}

// ============================================================================
// Scorer-driven Strategies
// ============================================================================

#[test]
fn test_language_model_merges_by_content() {
    // scattered so that geometry gives no useful hint
    let doc = page(
        1000.0,
        1000.0,
        vec![
            text("r0", 10.0, 500.0, 30.0, 20.0, "three"),
            text("r1", 47.0, 459.0, 30.0, 20.0, "one"),
            text("r2", 84.0, 418.0, 30.0, 20.0, "four"),
            text("r3", 121.0, 377.0, 30.0, 20.0, "two"),
        ],
    );
    let strategy = scored(StrategyKind::LanguageModel);
    assert_eq!(strategy.name(), "LanguageModelStrategy");

    let mut context = OrderingContext::new();
    let order = strategy.apply(&doc, &mut context).unwrap();
    let first = order.item("r1").unwrap();
    assert_eq!(order.chain_from(first), vec!["r1", "r3", "r0", "r2"]);
    assert!(context.stats.scorer_calls > 0);
}

#[test]
fn test_combined_reconnects_column_ends() {
    let doc = page(
        1000.0,
        1000.0,
        vec![
            text("l1", 50.0, 100.0, 400.0, 80.0, "one"),
            text("l2", 50.0, 200.0, 400.0, 80.0, "two"),
            text("r1", 550.0, 100.0, 400.0, 80.0, "four"),
            text("r2", 550.0, 200.0, 400.0, 80.0, "five"),
            text("b", 50.0, 400.0, 900.0, 80.0, "three"),
        ],
    );
    assert_eq!(order_with(StrategyKind::Columnar, &doc), vec!["l1", "l2", "r1", "r2", "b"]);

    let strategy = scored(StrategyKind::ColumnarLanguageModel);
    let mut context = OrderingContext::new();
    let order = strategy.apply(&doc, &mut context).unwrap();
    assert_eq!(order.item_ids(), vec!["l1", "l2", "b", "r1", "r2"]);
    assert_eq!(context.stats.reconnections, 1);
}

#[test]
fn test_scored_factory_builds_spatial_strategies_too() {
    let strategy = scored(StrategyKind::TopToBottom);
    assert_eq!(strategy.name(), "TopToBottomStrategy");
}

// ============================================================================
// Pipeline
// ============================================================================

const REFERENCE_PAGE: &str = r#"{
    "width": 1000, "height": 1000,
    "regions": [
        { "id": "l1", "points": [[50, 100], [450, 100], [450, 180], [50, 180]], "text": "left one" },
        { "id": "l2", "points": [[50, 200], [450, 200], [450, 280], [50, 280]], "text": "left two" },
        { "id": "r1", "points": [[550, 100], [950, 100], [950, 180], [550, 180]], "text": "right one" },
        { "id": "r2", "points": [[550, 200], [950, 200], [950, 280], [550, 280]], "text": "right two" }
    ],
    "reading_order": { "ordered": ["l1", "l2", "r1", "r2"] }
}"#;

#[test]
fn test_pipeline_evaluates_against_fixture() {
    let doc = PageFixture::from_json_str(REFERENCE_PAGE).unwrap().to_document().unwrap();

    let columnar = OrderingPipeline::new().evaluate(&doc).unwrap();
    assert_eq!(columnar.prima.penalty(), 0);
    assert_eq!(columnar.recall.recall(), 100.0);

    let rows = OrderingPipeline::with_config(
        OrderingConfig::new().with_strategy(StrategyKind::TopToBottom),
    )
    .unwrap()
    .evaluate(&doc)
    .unwrap();
    assert_eq!(rows.strategy, "TopToBottomStrategy");
    assert!(rows.prima.percentage() < columnar.prima.percentage());
    // rows pair l1 with r1, so no reference link survives
    assert_eq!(rows.recall.recall(), 0.0);
    assert_eq!(rows.recall.missed.len(), 3);
}

#[test]
fn test_pipeline_with_scored_strategy() {
    let doc = PageFixture::from_json_str(REFERENCE_PAGE).unwrap().to_document().unwrap();
    let pipeline = OrderingPipeline::new().with_strategy(scored(StrategyKind::ColumnarLanguageModel));
    assert_eq!(pipeline.strategy_name(), "ColumnarLanguageModelStrategy");
    let (order, _) = pipeline.process_with_stats(&doc).unwrap();
    assert_eq!(order.item_ids().len(), 4);
}

#[test]
fn test_pipeline_config_from_json() {
    let config = OrderingConfig::from_json_str(r#"{ "strategy": "top_to_bottom" }"#).unwrap();
    let pipeline = OrderingPipeline::with_config(config).unwrap();
    assert_eq!(pipeline.strategy_name(), "TopToBottomStrategy");

    let scored = OrderingConfig::from_json_str(r#"{ "strategy": "language_model" }"#).unwrap();
    assert!(matches!(OrderingPipeline::with_config(scored), Err(Error::Config(_))));
}

#[test]
fn test_pipeline_on_empty_page() {
    let order = OrderingPipeline::new().process(&Document::new(100.0, 100.0)).unwrap();
    assert!(order.item_ids().is_empty());
}
