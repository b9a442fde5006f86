//! rt-cli — run the road_traffic simulator from the command line.
//!
//! ```text
//! rt-cli run        [--graph DIR | --grid N] [--vehicles N] [--mode serial|concurrent] ...
//! rt-cli distribute [--graph DIR | --grid N] [--workers N] [--vehicles-per-worker N] ...
//! ```
//!
//! Without `--graph` a synthetic grid is simulated.  A JSON config file
//! (`--config`) supplies defaults that flags override.

mod config;
mod network;
mod progress;

use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;

use rt_core::SimRng;
use rt_graph::{CsvSource, RoadGraph, build_graph};
use rt_partition::run_distributed_with;

use config::{Cli, Command, GraphArgs};
use network::build_demo_grid;
use progress::ProgressLogger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Run { graph, sim, vehicles } => {
            let config = sim.sim_config(vehicles)?;
            let network = load_graph(&graph, config.seed)?;
            println!(
                "Road graph: {} vertices, {} edges  |  vehicles: {}  |  mode: {}  |  seed: {}",
                network.vertex_count(),
                network.edge_count(),
                config.vehicles,
                config.mode,
                config.seed
            );

            let start = Instant::now();
            let mut observer = ProgressLogger::new("sim", sim.progress_every);
            let summary = rt_sim::run(&network, config, &mut observer)?;
            println!("{summary}");
            println!("Completed in {:.2?}", start.elapsed());
        }

        Command::Distribute { graph, sim, workers, vehicles_per_worker } => {
            let config = sim.distribution_config(workers, vehicles_per_worker)?;
            let network = load_graph(&graph, config.sim.seed)?;
            println!(
                "Road graph: {} vertices, {} edges  |  workers: {}  |  vehicles per worker: {}",
                network.vertex_count(),
                network.edge_count(),
                config.workers,
                config.vehicles_per_worker
            );

            let start = Instant::now();
            let every = sim.progress_every;
            let outcomes = run_distributed_with(&network, &config, |rank| {
                ProgressLogger::new(format!("rank {rank}"), every)
            })?;

            let mut failed = 0;
            for o in &outcomes {
                match &o.result {
                    Ok(s) => println!("rank {}: {s}", o.rank),
                    Err(e) => {
                        failed += 1;
                        println!("rank {}: aborted: {e}", o.rank);
                    }
                }
            }
            println!("total: {}", rt_partition::total(&outcomes));
            println!("Completed in {:.2?}", start.elapsed());
            if failed > 0 {
                bail!("{failed} of {} workers aborted", outcomes.len());
            }
        }
    }
    Ok(())
}

fn load_graph(args: &GraphArgs, seed: u64) -> Result<RoadGraph> {
    let mut rng = SimRng::new(seed);
    match &args.graph {
        Some(dir) => build_graph(&CsvSource::from_dir(dir), &mut rng)
            .with_context(|| format!("loading graph from {}", dir.display())),
        None => Ok(build_demo_grid(args.grid, &mut rng)?),
    }
}
