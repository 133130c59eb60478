//! tratch CLI - exception-handling miner for catch blocks.
//!
//! Features:
//! - Loads a front-end project model (JSON) with syntax trees and bindings
//! - Rayon-powered parallel per-file analysis
//! - Interprocedural possible-exception discovery with shared memoization
//! - Plaintext or JSON output

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use tratch_core::{
    analyze_model, init_structured_logging, load_config, load_model, print_json, print_plain,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Exception-handling miner for catch blocks")]
pub struct Cli {
    /// Path to the project model JSON produced by the front end
    model: PathBuf,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Directory containing tratch.toml (defaults to the current directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_structured_logging();
    let cli = Cli::parse();

    let config_root = cli.config.unwrap_or_else(|| PathBuf::from("."));
    let config = load_config(&config_root)
        .with_context(|| format!("loading configuration from {}", config_root.display()))?;
    let model = load_model(&cli.model)
        .with_context(|| format!("loading project model from {}", cli.model.display()))?;

    let result = analyze_model(&model, &config);

    let json = cli.json || config.output_format.as_deref() == Some("json");
    if json {
        print_json(&result);
    } else {
        print_plain(&result);
    }
    Ok(())
}
