//! Fluent builder for constructing a [`Sim`].

use rt_core::{SimConfig, SimRng, VehicleId, VehicleRng, VertexId};
use rt_graph::{DijkstraRouter, GraphResult, Path, PathGenerator, RoadGraph, Router};
use rt_vehicle::Vehicle;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - `&RoadGraph` — the graph every vehicle drives on
/// - [`SimConfig`] — vehicle count, speed bands, mode, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                                     |
/// |-----------------------|---------------------------------------------|
/// | `.router(r)`          | `DijkstraRouter`                            |
/// | `.paths(v)`           | `config.vehicles` random shortest paths     |
/// | `.abort_on_fault(b)`  | `false` (a fault only ends that vehicle)    |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(&graph, config).build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<'g, R: Router = DijkstraRouter> {
    graph:          &'g RoadGraph,
    config:         SimConfig,
    router:         R,
    paths:          Option<Vec<Vec<VertexId>>>,
    abort_on_fault: bool,
}

impl<'g> SimBuilder<'g, DijkstraRouter> {
    pub fn new(graph: &'g RoadGraph, config: SimConfig) -> Self {
        Self {
            graph,
            config,
            router: DijkstraRouter,
            paths: None,
            abort_on_fault: false,
        }
    }
}

impl<'g, R: Router> SimBuilder<'g, R> {
    /// Route generated paths with `router` instead of Dijkstra.
    pub fn router<R2: Router>(self, router: R2) -> SimBuilder<'g, R2> {
        SimBuilder {
            graph: self.graph,
            config: self.config,
            router,
            paths: self.paths,
            abort_on_fault: self.abort_on_fault,
        }
    }

    /// Use pre-computed vertex paths, one vehicle per entry, instead of
    /// generating `config.vehicles` random ones.  Entries that are not a
    /// valid path on the graph are logged and skipped.
    pub fn paths(mut self, paths: Vec<Vec<VertexId>>) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Abort the whole run on the first vehicle fault.
    pub fn abort_on_fault(mut self, abort: bool) -> Self {
        self.abort_on_fault = abort;
        self
    }

    /// Validate inputs, create the vehicles and return a ready-to-run
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim<'g>> {
        self.config.validate()?;
        if self.graph.edge_count() == 0 {
            return Err(SimError::Config("the road graph has no edges".into()));
        }

        let mut rng = SimRng::new(self.config.seed);

        // ── Produce one path result per vehicle slot ──────────────────────
        let results: Vec<GraphResult<Path>> = match self.paths {
            Some(paths) => paths
                .into_iter()
                .map(|vertices| Path::from_vertices(self.graph, vertices))
                .collect(),
            None => {
                let generator = PathGenerator::with_router(
                    self.graph,
                    self.router,
                    self.config.max_path_attempts,
                );
                (0..self.config.vehicles)
                    .map(|_| generator.generate(&mut rng))
                    .collect()
            }
        };

        // ── Create vehicles, skipping failed slots ────────────────────────
        let mut vehicles = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (slot, result) in results.into_iter().enumerate() {
            match result {
                Ok(path) => {
                    let id = VehicleId::generate(rng.inner());
                    let speed = self.config.speed.sample(rng.inner());
                    let vehicle_rng = VehicleRng::new(self.config.seed, slot as u64);
                    vehicles.push(Vehicle::new(id, path, speed, self.config.speed.max, vehicle_rng));
                }
                Err(e) => {
                    log::warn!("skipping vehicle {slot}: {e}");
                    skipped.push((slot, e));
                }
            }
        }

        Ok(Sim {
            graph: self.graph,
            config: self.config,
            vehicles,
            skipped,
            abort_on_fault: self.abort_on_fault,
        })
    }
}
