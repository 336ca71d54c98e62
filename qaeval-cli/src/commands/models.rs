//! List judge models and whether their provider is configured

use anyhow::{Context, Result};
use clap::Parser;
use qaeval_core::QaEvalConfig;
use qaeval_llm::ProviderRegistry;

use super::print_json;

#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run_models(args: ModelsArgs, config: &QaEvalConfig) -> Result<()> {
    let registry = ProviderRegistry::from_config(&config.llm).context("Failed to set up LLM providers")?;
    let models = registry.models();

    if args.json {
        return print_json(&models);
    }

    println!("{:<20} {:<10} {:>10} {:>10}  available", "model", "provider", "params", "$/Mtok");
    for m in &models {
        println!(
            "{:<20} {:<10} {:>10} {:>10.2}  {}",
            m.spec.name,
            m.spec.provider.as_str(),
            human_params(m.spec.params),
            m.spec.cost_per_million_tokens,
            if m.available { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn human_params(params: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000_000, "T"), (1_000_000_000, "B"), (1_000_000, "M")];
    for (scale, suffix) in UNITS {
        if params >= scale {
            return format!("{:.1}{}", params as f64 / scale as f64, suffix);
        }
    }
    params.to_string()
}
