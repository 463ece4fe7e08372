//! Headless kingdom simulation
//!
//! Runs a seeded kingdom for a number of years with no player input and
//! prints a JSON summary of the final state and chronicle.

use std::path::PathBuf;

use clap::Parser;
use stronghold::core::config::KingdomConfig;
use stronghold::core::error::Result;
use stronghold::kingdom::simulate;

/// Kingdom Sim - run a kingdom unattended
#[derive(Parser, Debug)]
#[command(name = "kingdom_sim")]
#[command(about = "Advance a seeded kingdom for N years and print a JSON summary")]
struct Args {
    /// Years to simulate
    #[arg(long, default_value_t = 50)]
    years: u32,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Kingdom name
    #[arg(long, default_value = "Default Kingdom")]
    name: String,

    /// TOML file overriding the starting kingdom
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log filter directive
    #[arg(long, default_value = "stronghold=info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => KingdomConfig::load(path)?,
        None => KingdomConfig::default(),
    };

    let output = simulate(&args.name, &config, args.seed, args.years);
    eprintln!("{}", output.summary());

    let json = output.to_json();
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            eprintln!("Full output written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
