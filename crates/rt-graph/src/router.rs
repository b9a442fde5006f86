//! Routing trait and default Dijkstra implementation.
//!
//! The path generator calls routing via the [`Router`] trait, so callers can
//! swap in A* or a congestion-aware model without touching the generator.
//! Costs are edge lengths.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use rt_core::{EdgeId, VertexId};

use crate::network::RoadGraph;
use crate::{GraphError, GraphResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Vertices visited in order, source first and destination last.
    pub vertices: Vec<VertexId>,
    /// Edges to traverse in order; always `vertices.len() - 1` long.
    pub edges: Vec<EdgeId>,
    /// Sum of edge lengths.
    pub total_length: f64,
}

impl Route {
    /// `true` if the source and destination are the same vertex.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so one router can serve every
/// worker that generates paths.
pub trait Router: Send + Sync {
    /// Compute the shortest route from `from` to `to`.
    ///
    /// `from == to` yields a trivial single-vertex route.  An unreachable
    /// destination yields [`GraphError::NoPath`].
    fn route(&self, graph: &RoadGraph, from: VertexId, to: VertexId) -> GraphResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over edge lengths.
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: VertexId, to: VertexId) -> GraphResult<Route> {
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

const NO_EDGE: u32 = u32::MAX;

fn dijkstra(graph: &RoadGraph, from: VertexId, to: VertexId) -> GraphResult<Route> {
    let src = graph.vertex_slot(from)?;
    let dst = graph.vertex_slot(to)?;

    if src == dst {
        return Ok(Route { vertices: vec![from], edges: vec![], total_length: 0.0 });
    }

    let n = graph.vertex_count();
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = edge slot that reached v; NO_EDGE for unreached vertices.
    let mut prev_edge = vec![NO_EDGE; n];

    dist[src as usize] = 0.0;

    // Min-heap on (cost, slot); the slot breaks ties deterministically.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, u32)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), src)));

    while let Some(Reverse((OrderedFloat(cost), slot))) = heap.pop() {
        if slot == dst {
            return Ok(reconstruct(graph, &prev_edge, dst, cost));
        }

        // Skip stale heap entries.
        if cost > dist[slot as usize] {
            continue;
        }

        for &edge_slot in &graph.vertex_at(slot).out {
            let edge = graph.edge_at(edge_slot);
            let Ok(next) = graph.vertex_slot(edge.to()) else { continue };
            let new_cost = cost + edge.length();

            if new_cost < dist[next as usize] {
                dist[next as usize] = new_cost;
                prev_edge[next as usize] = edge_slot;
                heap.push(Reverse((OrderedFloat(new_cost), next)));
            }
        }
    }

    Err(GraphError::NoPath { from, to })
}

fn reconstruct(graph: &RoadGraph, prev_edge: &[u32], dst: u32, total_length: f64) -> Route {
    let mut edges = Vec::new();
    let mut vertices = vec![graph.vertex_at(dst).id];
    let mut cur = dst;
    loop {
        let e = prev_edge[cur as usize];
        if e == NO_EDGE {
            break;
        }
        let edge = graph.edge_at(e);
        edges.push(edge.id());
        vertices.push(edge.from());
        match graph.vertex_slot(edge.from()) {
            Ok(s) => cur = s,
            Err(_) => break,
        }
    }
    edges.reverse();
    vertices.reverse();
    Route { vertices, edges, total_length }
}
