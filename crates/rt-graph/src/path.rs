//! Immutable vehicle paths.

use rt_core::{EdgeId, VertexId};

use crate::network::RoadGraph;
use crate::router::Route;
use crate::{GraphError, GraphResult};

/// An ordered sequence of at least two distinct vertices, each consecutive
/// pair joined by an edge of the graph it was built against.
///
/// Per-segment lengths and their running prefix sum are computed once at
/// construction.  `prefix[i]` is the distance from the start of the path to
/// the end of segment `i`, so `prefix.last()` is the total length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    vertices: Vec<VertexId>,
    edges:    Vec<EdgeId>,
    lengths:  Vec<f64>,
    prefix:   Vec<f64>,
}

impl Path {
    /// Build a path over `vertices`, resolving each segment in `graph`.
    pub fn from_vertices(graph: &RoadGraph, vertices: Vec<VertexId>) -> GraphResult<Self> {
        if vertices.len() < 2 {
            return Err(GraphError::InvalidPath(format!(
                "a path needs at least 2 vertices, got {}",
                vertices.len()
            )));
        }
        let mut seen = rustc_hash::FxHashSet::default();
        if let Some(dup) = vertices.iter().find(|v| !seen.insert(**v)) {
            return Err(GraphError::InvalidPath(format!("vertex {dup} appears more than once")));
        }

        let mut edges   = Vec::with_capacity(vertices.len() - 1);
        let mut lengths = Vec::with_capacity(vertices.len() - 1);
        let mut prefix  = Vec::with_capacity(vertices.len() - 1);
        let mut total = 0.0;
        for pair in vertices.windows(2) {
            let edge = graph.edge_between(pair[0], pair[1])?;
            total += edge.length();
            edges.push(edge.id());
            lengths.push(edge.length());
            prefix.push(total);
        }
        Ok(Self { vertices, edges, lengths, prefix })
    }

    /// Build a path from a router result.  Trivial routes are rejected.
    pub fn from_route(graph: &RoadGraph, route: Route) -> GraphResult<Self> {
        Self::from_vertices(graph, route.vertices)
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    pub fn prefix_lengths(&self) -> &[f64] {
        &self.prefix
    }

    /// Number of edges on the path.
    pub fn segment_count(&self) -> usize {
        self.edges.len()
    }

    pub fn total_length(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    pub fn origin(&self) -> VertexId {
        self.vertices[0]
    }

    pub fn destination(&self) -> VertexId {
        self.vertices[self.vertices.len() - 1]
    }

    /// The segment containing `distance` and how far into it `distance` is.
    ///
    /// Returns the smallest `i` with `distance < prefix[i]` together with
    /// `distance - prefix[i - 1]` (or `distance` itself for `i == 0`).
    /// `None` once `distance` reaches the total length.
    pub fn edge_index_at(&self, distance: f64) -> Option<(usize, f64)> {
        let i = self.prefix.partition_point(|&p| p <= distance);
        if i >= self.prefix.len() {
            return None;
        }
        let start = if i == 0 { 0.0 } else { self.prefix[i - 1] };
        Some((i, distance - start))
    }
}
