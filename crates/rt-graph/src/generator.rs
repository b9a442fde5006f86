//! Random path generation.

use rt_core::{SimRng, VertexId};

use crate::network::RoadGraph;
use crate::path::Path;
use crate::router::{DijkstraRouter, Router};
use crate::{GraphError, GraphResult};

/// Produces random shortest paths between distinct vertices of one graph.
///
/// Endpoint candidates are the vertices that appear in at least one edge,
/// computed once at construction.  Each call to [`generate`](Self::generate)
/// draws endpoint pairs until one routes to a path of two or more vertices,
/// giving up after `max_attempts` draws.
pub struct PathGenerator<'g, R: Router = DijkstraRouter> {
    graph:        &'g RoadGraph,
    router:       R,
    candidates:   Vec<VertexId>,
    max_attempts: u32,
}

impl<'g> PathGenerator<'g, DijkstraRouter> {
    pub fn new(graph: &'g RoadGraph, max_attempts: u32) -> Self {
        Self::with_router(graph, DijkstraRouter, max_attempts)
    }
}

impl<'g, R: Router> PathGenerator<'g, R> {
    pub fn with_router(graph: &'g RoadGraph, router: R, max_attempts: u32) -> Self {
        Self {
            graph,
            router,
            candidates: graph.vertices_from_edges(),
            max_attempts,
        }
    }

    pub fn graph(&self) -> &'g RoadGraph {
        self.graph
    }

    /// Vertices eligible as path endpoints.
    pub fn candidates(&self) -> &[VertexId] {
        &self.candidates
    }

    /// Draw one random path.
    ///
    /// Fails with [`GraphError::PathGenerationExhausted`] when the graph has
    /// fewer than two candidate vertices (with `attempts: 0`) or when every
    /// draw failed.
    pub fn generate(&self, rng: &mut SimRng) -> GraphResult<Path> {
        if self.candidates.len() < 2 {
            return Err(GraphError::PathGenerationExhausted { attempts: 0 });
        }

        for attempt in 1..=self.max_attempts {
            let src = self.candidates[rng.gen_range(0..self.candidates.len())];
            let dst = self.candidates[rng.gen_range(0..self.candidates.len())];
            if src == dst {
                continue;
            }
            match self.router.route(self.graph, src, dst) {
                Ok(route) if route.vertices.len() >= 2 => {
                    log::trace!("path {src}→{dst} found on attempt {attempt}");
                    return Path::from_route(self.graph, route);
                }
                Ok(_) | Err(GraphError::NoPath { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(GraphError::PathGenerationExhausted { attempts: self.max_attempts })
    }
}
