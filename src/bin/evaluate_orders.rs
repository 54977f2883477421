//! Reading Order Evaluator
//!
//! Runs every geometry-only strategy over JSON page fixtures and scores each
//! prediction against the page's reference order.
//!
//! Usage:
//!   cargo run --bin evaluate_orders -- pages/
//!   cargo run --bin evaluate_orders -- page1.json page2.json --output summary.json
//!   cargo run --bin evaluate_orders -- pages/ --config ordering.json --verbose

use page_order::config::{OrderingConfig, StrategyKind};
use page_order::fixture::PageFixture;
use page_order::pipeline::{Evaluation, OrderingPipeline};
use page_order::reading_order::IdAllocator;
use page_order::spatial::SpatialAnalysis;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Serialize)]
struct StrategyResult {
    strategy: &'static str,
    penalty: u32,
    percentage: f64,
    recall: f64,
    errors: Vec<String>,
    scorer_calls: usize,
    cycles: usize,
}

#[derive(Debug, Serialize)]
struct PageResult {
    file: String,
    text_regions: usize,
    page_number: Option<String>,
    error: Option<String>,
    strategies: Vec<StrategyResult>,
    time_ms: u128,
}

#[derive(Debug, Default, Serialize)]
struct StrategySummary {
    pages: usize,
    mean_percentage: f64,
    mean_recall: f64,
    total_penalty: u64,
}

#[derive(Debug, Serialize)]
struct EvaluationSummary {
    total_pages: usize,
    failed_pages: usize,
    total_time_ms: u128,
    by_strategy: BTreeMap<&'static str, StrategySummary>,
    pages: Vec<PageResult>,
}

struct EvaluatorConfig {
    inputs: Vec<PathBuf>,
    output_file: Option<PathBuf>,
    ordering: OrderingConfig,
    verbose: bool,
}

impl EvaluatorConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut inputs = Vec::new();
        let mut output_file = None;
        let mut ordering = OrderingConfig::default();
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" => {
                    i += 1;
                    if i < args.len() {
                        output_file = Some(PathBuf::from(&args[i]));
                    }
                },
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        let json = fs::read_to_string(&args[i])
                            .map_err(|e| format!("cannot read {}: {}", args[i], e))?;
                        ordering = OrderingConfig::from_json_str(&json)
                            .map_err(|e| format!("invalid config {}: {}", args[i], e))?;
                    }
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                other => inputs.push(PathBuf::from(other)),
            }
            i += 1;
        }

        if inputs.is_empty() {
            return Err("no fixture files or directories given".to_string());
        }

        Ok(Self {
            inputs,
            output_file,
            ordering,
            verbose,
        })
    }
}

fn discover_fixtures(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match fs::read_dir(input) {
                Ok(entries) => {
                    let mut found: Vec<PathBuf> = entries
                        .filter_map(|e| e.ok())
                        .map(|e| e.path())
                        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
                        .collect();
                    found.sort();
                    files.extend(found);
                },
                Err(e) => eprintln!("Error reading directory {}: {}", input.display(), e),
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn evaluate_page(path: &Path, config: &EvaluatorConfig) -> PageResult {
    let start = Instant::now();
    let mut result = PageResult {
        file: path.display().to_string(),
        text_regions: 0,
        page_number: None,
        error: None,
        strategies: Vec::new(),
        time_ms: 0,
    };

    let doc = match PageFixture::from_path(path).and_then(|f| f.to_document()) {
        Ok(doc) => doc,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        },
    };
    result.text_regions = doc.text_region_count();
    result.page_number = SpatialAnalysis::new(&doc, &config.ordering.columns, &mut IdAllocator::new())
        .page_number()
        .map(str::to_string);

    for kind in StrategyKind::SPATIAL {
        let pipeline = match OrderingPipeline::with_config(config.ordering.clone().with_strategy(kind)) {
            Ok(p) => p,
            Err(e) => {
                result.error = Some(e.to_string());
                break;
            },
        };
        match pipeline.evaluate(&doc) {
            Ok(evaluation) => result.strategies.push(strategy_result(evaluation)),
            Err(e) => {
                result.error = Some(format!("{}: {}", pipeline.strategy_name(), e));
                break;
            },
        }
    }

    result.time_ms = start.elapsed().as_millis();
    result
}

fn strategy_result(evaluation: Evaluation) -> StrategyResult {
    StrategyResult {
        strategy: evaluation.strategy,
        penalty: evaluation.prima.penalty(),
        percentage: evaluation.prima.percentage(),
        recall: evaluation.recall.recall(),
        errors: evaluation.prima.errors(),
        scorer_calls: evaluation.stats.scorer_calls,
        cycles: evaluation.stats.cycles,
    }
}

fn generate_summary(pages: Vec<PageResult>, total_time_ms: u128) -> EvaluationSummary {
    let mut by_strategy: BTreeMap<&'static str, StrategySummary> = BTreeMap::new();
    for page in &pages {
        for result in &page.strategies {
            let summary = by_strategy.entry(result.strategy).or_default();
            summary.pages += 1;
            summary.mean_percentage += result.percentage;
            summary.mean_recall += result.recall;
            summary.total_penalty += u64::from(result.penalty);
        }
    }
    for summary in by_strategy.values_mut() {
        if summary.pages > 0 {
            summary.mean_percentage /= summary.pages as f64;
            summary.mean_recall /= summary.pages as f64;
        }
    }

    EvaluationSummary {
        total_pages: pages.len(),
        failed_pages: pages.iter().filter(|p| p.error.is_some()).count(),
        total_time_ms,
        by_strategy,
        pages,
    }
}

fn print_page(page: &PageResult, verbose: bool) {
    match &page.error {
        Some(error) => println!("✗ {} - {}", page.file, error),
        None => println!("✓ {} ({} text regions, {}ms)", page.file, page.text_regions, page.time_ms),
    }
    if let Some(number) = &page.page_number {
        println!("    page number region: {}", number);
    }
    for result in &page.strategies {
        println!(
            "    {:<28} penalty {:>5}  {:>6.2}%  recall {:>6.2}%",
            result.strategy, result.penalty, result.percentage, result.recall
        );
        if verbose {
            for error in &result.errors {
                println!("        {}", error);
            }
        }
    }
}

fn main() {
    env_logger::init();

    let config = match EvaluatorConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: evaluate_orders <fixture.json|dir>... [--output FILE] [--config FILE] [--verbose]");
            std::process::exit(2);
        },
    };

    let files = discover_fixtures(&config.inputs);
    println!("Evaluating {} page fixture(s)", files.len());

    let start = Instant::now();
    let mut pages = Vec::with_capacity(files.len());
    for path in &files {
        let page = evaluate_page(path, &config);
        print_page(&page, config.verbose);
        pages.push(page);
    }
    let summary = generate_summary(pages, start.elapsed().as_millis());

    println!();
    println!("{:<28} {:>6} {:>10} {:>10}", "strategy", "pages", "mean %", "recall %");
    for (name, s) in &summary.by_strategy {
        println!(
            "{:<28} {:>6} {:>10.2} {:>10.2}",
            name, s.pages, s.mean_percentage, s.mean_recall
        );
    }
    if summary.failed_pages > 0 {
        println!("{} page(s) failed", summary.failed_pages);
    }

    if let Some(output) = &config.output_file {
        let written = serde_json::to_string_pretty(&summary)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                File::create(output)
                    .and_then(|mut f| f.write_all(json.as_bytes()))
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(()) => println!("Summary written to {}", output.display()),
            Err(e) => {
                eprintln!("Error writing {}: {}", output.display(), e);
                std::process::exit(1);
            },
        }
    }
}
