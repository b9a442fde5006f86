//! Command-line flags and the JSON config file they override.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

use rt_core::{SimConfig, StepMode};
use rt_partition::DistributionConfig;

#[derive(Parser, Debug)]
#[command(name = "rt-cli")]
#[command(about = "Road-network traffic simulation")]
pub struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate vehicles on the whole graph in this process
    Run {
        #[command(flatten)]
        graph: GraphArgs,
        #[command(flatten)]
        sim: SimArgs,
        /// Number of vehicles
        #[arg(long)]
        vehicles: Option<usize>,
    },
    /// Partition the graph and simulate one column per worker rank
    Distribute {
        #[command(flatten)]
        graph: GraphArgs,
        #[command(flatten)]
        sim: SimArgs,
        /// Number of worker ranks
        #[arg(long)]
        workers: Option<usize>,
        /// Vehicles generated for each worker
        #[arg(long)]
        vehicles_per_worker: Option<usize>,
    },
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Directory holding vertices.csv and edges.csv; the demo grid is used
    /// when absent
    #[arg(long)]
    pub graph: Option<PathBuf>,

    /// Side length of the demo grid, in intersections
    #[arg(long, default_value = "10")]
    pub grid: u64,
}

#[derive(Args, Debug)]
pub struct SimArgs {
    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Abort a serial run after this many ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Log progress every N parked vehicles
    #[arg(long, default_value = "10")]
    pub progress_every: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Serial,
    Concurrent,
}

impl From<Mode> for StepMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Serial     => StepMode::Serial,
            Mode::Concurrent => StepMode::Concurrent,
        }
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))
}

impl SimArgs {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if self.max_ticks.is_some() {
            config.max_ticks = self.max_ticks;
        }
    }

    /// The file's `SimConfig` (or the default) with flags applied.
    pub fn sim_config(&self, vehicles: Option<usize>) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => load_json(path)?,
            None => SimConfig::default(),
        };
        self.apply(&mut config);
        if let Some(n) = vehicles {
            config.vehicles = n;
        }
        Ok(config)
    }

    /// The file's `DistributionConfig` (or the default) with flags applied.
    pub fn distribution_config(
        &self,
        workers:             Option<usize>,
        vehicles_per_worker: Option<usize>,
    ) -> Result<DistributionConfig> {
        let mut config = match &self.config {
            Some(path) => load_json(path)?,
            None => DistributionConfig::default(),
        };
        self.apply(&mut config.sim);
        if let Some(n) = workers {
            config.workers = n;
        }
        if let Some(n) = vehicles_per_worker {
            config.vehicles_per_worker = n;
        }
        Ok(config)
    }
}
