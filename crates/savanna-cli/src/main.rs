//! Command-line runner for the savanna simulation.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use savanna_core::SimulationConfig;
use savanna_world::{RunState, Simulation, TextRenderer};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Predator, grazer and plant savanna simulation")]
struct Cli {
    /// Path to a JSON simulation config (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of steps to run
    #[arg(long, default_value_t = 4000)]
    steps: u64,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of rows
    #[arg(long)]
    depth: Option<usize>,

    /// Override the number of columns
    #[arg(long)]
    width: Option<usize>,

    /// Draw the field every N steps (never when omitted)
    #[arg(long)]
    render_every: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(depth) = self.depth {
            config.world.depth = depth;
        }
        if let Some(width) = self.width {
            config.world.width = width;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.simulation_config()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    telemetry::init_telemetry(cli.json_logs)?;

    info!(
        seed = config.seed,
        depth = config.world.depth,
        width = config.world.width,
        steps = cli.steps,
        "Starting savanna simulation"
    );

    let mut sim = Simulation::seeded(config)?;
    sim.reset_and_populate()?;

    let mut renderer = TextRenderer::stdout();
    let chunk = match cli.render_every {
        Some(every) if every > 0 => every,
        _ => cli.steps,
    };

    if cli.render_every.is_some() {
        sim.render(&mut renderer);
    }

    let mut remaining = cli.steps;
    while remaining > 0 && sim.state() != RunState::Halted {
        let executed = match sim.run_for(chunk.min(remaining)) {
            Ok(executed) => executed,
            Err(e) if e.is_invariant_violation() => {
                return Err(anyhow::Error::new(e).context(format!(
                    "population state became inconsistent at step {}",
                    sim.step_count()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        remaining -= executed;
        if cli.render_every.is_some() && executed > 0 {
            sim.render(&mut renderer);
        }
        if executed == 0 {
            break;
        }
    }

    println!(
        "Simulation stopped after {} steps ({:?}). Population: {}",
        sim.step_count(),
        sim.state(),
        sim.census()
    );
    Ok(())
}
