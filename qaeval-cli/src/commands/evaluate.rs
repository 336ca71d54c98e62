//! Batch LLM scoring of standard pairs

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use qaeval_core::QaEvalConfig;
use qaeval_llm::{Evaluator, ProviderRegistry};
use qaeval_server::db::repos::PairFilter;
use qaeval_server::evaluation::{BatchEvaluator, BatchReport};

use super::{connect, print_json};
use crate::ui;

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Judge model name (see `qaeval models`)
    #[arg(long, short = 'm')]
    pub model: String,

    /// Only pairs with this tag
    #[arg(long, conflicts_with = "pair_id")]
    pub tag: Option<String>,

    /// Only this pair
    #[arg(long)]
    pub pair_id: Option<i64>,

    /// Maximum number of pairs
    #[arg(long)]
    pub limit: Option<u32>,

    /// Custom evaluation criteria (default: built-in rubric)
    #[arg(long)]
    pub criteria: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_evaluate(args: EvaluateArgs, config: &QaEvalConfig) -> Result<()> {
    let registry = ProviderRegistry::from_config(&config.llm).context("Failed to set up LLM providers")?;
    let evaluator = Evaluator::new(Arc::new(registry));
    // Fail fast on unknown or unconfigured models, before connecting.
    evaluator.check_model(&args.model)?;

    let pool = connect(config).await?;

    let filter = PairFilter {
        pair_id: args.pair_id,
        tag: args.tag,
        limit: args.limit,
    };

    let mut pb = None;
    let report = BatchEvaluator::new(&pool, &evaluator)
        .run_with_progress(&args.model, args.criteria.as_deref(), &filter, |done, total| {
            let bar = pb.get_or_insert_with(|| ui::progress_bar(total as u64, format!("Scoring with {}", args.model)));
            if let Some(bar) = bar {
                bar.set_position(done as u64);
            }
        })
        .await?;
    if let Some(bar) = pb.flatten() {
        bar.finish_and_clear();
    }

    if args.json {
        print_json(&report)?;
    } else {
        print_summary(&report);
    }

    if !report.success {
        bail!("{}", report.message);
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    for r in &report.results {
        if r.success {
            println!("✓ pair {:>5}  {:>6.2}  {}", r.pair_id, r.score, r.question);
        } else {
            let reason = r.error.as_deref().unwrap_or("unknown error");
            println!("✗ pair {:>5}  {}  ({})", r.pair_id, r.question, reason);
        }
    }
    println!("{} [{}]", report.message, report.model);
}
