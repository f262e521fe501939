use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use gossipsim::{
    run_digest, Explorer, NodeId, ScenarioFile, Simulation, SimulationBuilder, SimulationConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gossipsim")]
#[command(about = "Deterministic gossip spreading over a static network")]
#[command(version)]
struct Cli {
    /// JSON scenario file (defaults to the built-in five-node network)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the seed
    #[arg(long)]
    seed: Option<u64>,
    /// Override the number of snapshots (step 0 included)
    #[arg(long)]
    steps: Option<u64>,
    /// Override the start node
    #[arg(long)]
    start: Option<u64>,
    /// Output format for snapshots
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Replay the run and check both digests match
    #[arg(long)]
    verify: bool,
    /// Enumerate every possible outcome instead of a single seeded run
    #[arg(long)]
    explore: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.explore {
        let result = Explorer::new(config).explore()?;
        println!(
            "{} branches explored ({}), {} distinct outcomes",
            result.branches_explored,
            if result.exhausted { "complete" } else { "truncated" },
            result.outcomes.len()
        );
        return Ok(());
    }

    let sim = Simulation::new(config);
    let snapshots = sim.run()?;
    for snapshot in &snapshots {
        match cli.format {
            Format::Text => print!("{}", snapshot),
            Format::Json => println!("{}", snapshot.to_json()?),
        }
    }

    if cli.verify {
        let first = run_digest(&snapshots);
        let second = run_digest(&sim.run()?);
        info!(first, second, "replay digests");
        if first != second {
            bail!("determinism violation: {:016x} != {:016x}", first, second);
        }
        eprintln!("replay verified: {:016x}", first);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open scenario {}", path.display()))?;
            ScenarioFile::from_reader(file)?.into_config()?
        }
        None => SimulationBuilder::demo().config()?,
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(steps) = cli.steps {
        config = config.with_total_steps(steps)?;
    }
    if let Some(start) = cli.start {
        config = config.with_start_node(NodeId::new(start))?;
    }
    Ok(config)
}
