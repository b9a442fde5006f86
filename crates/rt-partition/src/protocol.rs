//! Coordinator / worker distribution protocol.
//!
//! # Message flow
//!
//! ```text
//! coordinator (rank 0)                         worker (rank r ≥ 1)
//!   rects  = divide_into_rects(root, W)
//!   edges  = edge_records(root)
//!   paths  = W × per_worker, slice r−1
//!            generated on rect r−1's subgraph
//!   for r in 1..=W:
//!     send RECTS ─────────────────────────────▶ rect  = rects[r − 1]
//!     send EDGES ─────────────────────────────▶ graph = subgraph_from_rect(edges, rect)
//!     send PATHS ─────────────────────────────▶ mine  = divide_slice(paths, W)[r − 1]
//!                                               run the simulation on graph
//! ```
//!
//! The scatter is one-shot.  A worker that fails to decode a message aborts;
//! the coordinator never hears about it.

use rt_core::{SimConfig, SimRng, VertexId};
use rt_graph::{EdgeRecord, PathGenerator, RoadGraph};
use rt_sim::{NoopObserver, RunSummary, SimBuilder, SimObserver};

use crate::rect::{Rect, divide_into_rects, divide_slice, edge_records, subgraph_from_rect};
use crate::transport::{ChannelTransport, Tag, Transport};
use crate::wire::{EdgesMessage, PathsMessage, RectsMessage, decode, encode};
use crate::{PartitionError, PartitionResult};

/// Rank of the coordinator.
pub const COORDINATOR: usize = 0;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Settings for a distributed run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DistributionConfig {
    /// Number of worker ranks.  The world has `workers + 1` ranks.
    pub workers:             usize,
    /// Paths generated for each worker.
    pub vehicles_per_worker: usize,
    /// Settings every worker runs its simulation with.  `sim.vehicles` is
    /// ignored; each worker gets one vehicle per received path.
    pub sim:                 SimConfig,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            workers:             2,
            vehicles_per_worker: 50,
            sim:                 SimConfig::default(),
        }
    }
}

impl DistributionConfig {
    pub fn validate(&self) -> PartitionResult<()> {
        if self.workers == 0 {
            return Err(PartitionError::Config("at least one worker is required".into()));
        }
        self.sim
            .validate()
            .map_err(|e| PartitionError::Config(e.to_string()))
    }
}

/// What one worker rank reported back.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub rank:   usize,
    pub result: PartitionResult<RunSummary>,
}

/// Merge the summaries of every worker that finished.
pub fn total(outcomes: &[WorkerOutcome]) -> RunSummary {
    let mut sum = RunSummary::default();
    for o in outcomes {
        if let Ok(s) = &o.result {
            sum.merge(s);
        }
    }
    sum
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Partition `graph`, generate paths and send every worker its three
/// messages.
pub fn run_coordinator<T: Transport>(
    transport: &T,
    graph:     &RoadGraph,
    config:    &DistributionConfig,
) -> PartitionResult<()> {
    let workers = transport.world_size().saturating_sub(1);
    if workers != config.workers {
        return Err(PartitionError::Config(format!(
            "world has {workers} worker ranks but {} were configured",
            config.workers
        )));
    }

    let rects = divide_into_rects(graph, workers)?;
    let edges = edge_records(graph);
    let paths = generate_paths(&rects, &edges, config)?;

    let rects_bytes = encode(&RectsMessage::new(&rects));
    let edges_bytes = encode(&EdgesMessage::new(&edges));
    let paths_bytes = encode(&PathsMessage {
        per_worker: u32::try_from(config.vehicles_per_worker)
            .map_err(|_| PartitionError::Config("vehicles_per_worker does not fit in u32".into()))?,
        paths,
    });

    log::info!(
        "scattering {} rects, {} edges and {} paths to {workers} workers",
        rects.len(),
        edges.len(),
        workers * config.vehicles_per_worker
    );

    for rank in 1..=workers {
        transport.send(rank, Tag::Rects, &rects_bytes)?;
        transport.send(rank, Tag::Edges, &edges_bytes)?;
        transport.send(rank, Tag::Paths, &paths_bytes)?;
    }
    Ok(())
}

/// `workers × per_worker` paths; worker `w`'s slice is generated on its own
/// subgraph so every path it receives is drivable there.
fn generate_paths(
    rects:  &[Rect],
    edges:  &[EdgeRecord],
    config: &DistributionConfig,
) -> PartitionResult<Vec<Vec<u64>>> {
    let mut rng = SimRng::new(config.sim.seed);
    let mut paths = Vec::with_capacity(rects.len() * config.vehicles_per_worker);

    for (w, rect) in rects.iter().enumerate() {
        let mut worker_rng = rng.child(w as u64);
        let sub = subgraph_from_rect(edges, rect, &mut worker_rng)?;
        let generator = PathGenerator::new(&sub, config.sim.max_path_attempts);

        let mut missing = 0usize;
        for _ in 0..config.vehicles_per_worker {
            match generator.generate(&mut worker_rng) {
                Ok(p) => paths.push(p.vertices().iter().map(|v| v.raw()).collect()),
                Err(_) => {
                    missing += 1;
                    paths.push(Vec::new());
                }
            }
        }
        if missing > 0 {
            log::warn!(
                "rect {w}: no path for {missing} of {} vehicles ({} vertices, {} edges)",
                config.vehicles_per_worker,
                sub.vertex_count(),
                sub.edge_count()
            );
        }
    }
    Ok(paths)
}

// ── Worker ────────────────────────────────────────────────────────────────────

/// Receive this rank's partition and paths, then simulate them.
///
/// Any receive or decode failure aborts the worker with an error.
pub fn run_worker<T: Transport, O: SimObserver>(
    transport: &T,
    sim:       &SimConfig,
    observer:  &mut O,
) -> PartitionResult<RunSummary> {
    let rank = transport.rank();
    let size = transport.world_size();
    if rank == COORDINATOR || rank >= size {
        return Err(PartitionError::RankOutOfRange { rank, size });
    }
    let workers = size - 1;

    let rects: RectsMessage = decode("RECTS", &transport.recv(COORDINATOR, Tag::Rects)?)?;
    let rect = rects
        .into_rects()
        .into_iter()
        .nth(rank - 1)
        .ok_or(PartitionError::RankOutOfRange { rank, size })?;

    let edges: EdgesMessage = decode("EDGES", &transport.recv(COORDINATOR, Tag::Edges)?)?;
    let mut rng = SimRng::new(sim.seed ^ rank as u64);
    let graph = subgraph_from_rect(&edges.into_records(), &rect, &mut rng)?;

    let paths: PathsMessage = decode("PATHS", &transport.recv(COORDINATOR, Tag::Paths)?)?;
    let slices = divide_slice(&paths.paths, workers);
    let mine = slices.get(rank - 1).copied().unwrap_or_default();

    let empty = mine.iter().filter(|p| p.is_empty()).count();
    if empty > 0 {
        log::warn!("rank {rank}: skipping {empty} empty path slots");
    }
    let vertex_paths: Vec<Vec<VertexId>> = mine
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.iter().copied().map(VertexId).collect())
        .collect();

    log::info!(
        "rank {rank}: {} vertices, {} edges, {} vehicles",
        graph.vertex_count(),
        graph.edge_count(),
        vertex_paths.len()
    );

    if graph.edge_count() == 0 || vertex_paths.is_empty() {
        log::warn!("rank {rank}: nothing to simulate");
        return Ok(RunSummary { skipped: empty, ..RunSummary::default() });
    }

    let mut summary = SimBuilder::new(&graph, sim.clone())
        .paths(vertex_paths)
        .build()?
        .run(observer)?;
    summary.skipped += empty;
    Ok(summary)
}

// ── In-process runtime ────────────────────────────────────────────────────────

/// Run the full protocol in this process: one thread per worker rank over
/// [`ChannelTransport`], the coordinator on the calling thread.
pub fn run_distributed(graph: &RoadGraph, config: &DistributionConfig) -> PartitionResult<Vec<WorkerOutcome>> {
    run_distributed_with(graph, config, |_| NoopObserver)
}

/// Like [`run_distributed`], with one observer per worker built by
/// `make_observer(rank)`.
pub fn run_distributed_with<O, F>(
    graph:         &RoadGraph,
    config:        &DistributionConfig,
    make_observer: F,
) -> PartitionResult<Vec<WorkerOutcome>>
where
    O: SimObserver,
    F: Fn(usize) -> O + Sync,
{
    config.validate()?;
    let mut endpoints = ChannelTransport::world(config.workers + 1);
    let coordinator = endpoints.remove(COORDINATOR);

    std::thread::scope(|s| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|transport| {
                let make_observer = &make_observer;
                let sim = &config.sim;
                s.spawn(move || {
                    let rank = transport.rank();
                    let mut observer = make_observer(rank);
                    let result = run_worker(&transport, sim, &mut observer);
                    if let Err(e) = &result {
                        log::error!("rank {rank} aborted: {e}");
                    }
                    WorkerOutcome { rank, result }
                })
            })
            .collect();

        // Dropping the coordinator's endpoint unblocks workers if it failed
        // before sending.
        let sent = run_coordinator(&coordinator, graph, config);
        drop(coordinator);

        let outcomes: Vec<WorkerOutcome> = handles
            .into_iter()
            .enumerate()
            .map(|(i, h)| {
                h.join().unwrap_or_else(|_| WorkerOutcome {
                    rank:   i + 1,
                    result: Err(PartitionError::Transport(format!("rank {} panicked", i + 1))),
                })
            })
            .collect();

        sent.map(|()| outcomes)
    })
}
