//! Road graph representation.
//!
//! # Data layout
//!
//! The graph owns its vertices and edges by value in two arenas (`Vec`s).
//! Vertex and edge IDs map to arena slots through hash indexes; adjacency is
//! stored per vertex as slot lists, so Dijkstra's inner loop never hashes.
//!
//! ```text
//! vertices[slot].out  → edge slots leaving the vertex
//! vertices[slot].inc  → edge slots entering the vertex
//! edges[slot].data    → EdgeData (ids, length, max speed)
//! edges[slot].occupancy → vehicles currently on the edge
//! ```
//!
//! Nothing inside the graph points back at the graph.  Operations that need
//! it (routing, stepping a vehicle) take `&RoadGraph` explicitly.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds every vertex that has coordinates.  It backs
//! the bounding box, rectangle queries used by the partitioner, and
//! nearest-vertex snapping.

use rand::Rng;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::{FxHashMap, FxHashSet};

use rt_core::{BoundingBox, EdgeId, Point, VertexId};

use crate::occupancy::OccupancyStore;
use crate::{GraphError, GraphResult};

/// Upper bound (exclusive) for randomly minted edge IDs.
pub const MAX_EDGE_ID: u32 = 1_000_000_000;

/// Random draws before [`RoadGraph::connect`] gives up on finding a free ID.
pub const MAX_EDGE_ID_ATTEMPTS: u32 = 64;

// ── R-tree vertex entry ───────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index.
#[derive(Clone, Debug)]
struct VertexEntry {
    point: [f64; 2], // [x, y]
    id:    VertexId,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Vertex / Edge ─────────────────────────────────────────────────────────────

/// A road-network vertex.  Immutable once inserted apart from its adjacency.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id:  VertexId,
    /// Coordinates, if the source supplied them.  Only the partitioner reads
    /// these.
    pub pos: Option<Point>,
    pub(crate) out: Vec<u32>,
    pub(crate) inc: Vec<u32>,
}

impl Vertex {
    /// Number of edges leaving this vertex.
    pub fn out_degree(&self) -> usize {
        self.out.len()
    }

    /// Number of edges entering this vertex.
    pub fn in_degree(&self) -> usize {
        self.inc.len()
    }
}

/// Static, typed payload of a directed edge.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeData {
    pub id:        EdgeId,
    pub from:      VertexId,
    pub to:        VertexId,
    /// Physical length; strictly positive.
    pub length:    f64,
    /// Speed limit; `0.0` means the source gave none.
    pub max_speed: f64,
}

impl EdgeData {
    fn validate(&self) -> GraphResult<()> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(GraphError::InvalidEdge(format!(
                "{} {}→{} has non-positive length {}",
                self.id, self.from, self.to, self.length
            )));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(GraphError::InvalidEdge(format!(
                "{} {}→{} has negative max speed {}",
                self.id, self.from, self.to, self.max_speed
            )));
        }
        Ok(())
    }
}

/// A directed edge: its data plus the exclusively owned occupancy store.
#[derive(Debug)]
pub struct Edge {
    pub data:      EdgeData,
    pub occupancy: OccupancyStore,
}

impl Edge {
    #[inline] pub fn id(&self) -> EdgeId { self.data.id }
    #[inline] pub fn from(&self) -> VertexId { self.data.from }
    #[inline] pub fn to(&self) -> VertexId { self.data.to }
    #[inline] pub fn length(&self) -> f64 { self.data.length }
    #[inline] pub fn max_speed(&self) -> f64 { self.data.max_speed }

    /// The speed limit as an upper bound, `None` if the edge has none.
    #[inline]
    pub fn speed_limit(&self) -> Option<f64> {
        (self.data.max_speed > 0.0).then_some(self.data.max_speed)
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road graph keyed by vertex ID.
///
/// `RoadGraph` is `Sync`: the only mutable state reachable through `&self` is
/// each edge's [`OccupancyStore`], which synchronises itself.  Share one graph
/// by reference across all vehicle tasks.
#[derive(Debug, Default)]
pub struct RoadGraph {
    vertices:     Vec<Vertex>,
    vertex_slot:  FxHashMap<VertexId, u32>,
    edges:        Vec<Edge>,
    edge_slot:    FxHashMap<EdgeId, u32>,
    edge_by_ends: FxHashMap<(VertexId, VertexId), u32>,
    spatial_idx:  RTree<VertexEntry>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Insert a vertex.  A vertex whose ID is already present is left
    /// untouched and the call is logged.
    ///
    /// Returns `true` if the vertex was inserted.
    pub fn add_vertex(&mut self, id: VertexId, pos: Option<Point>) -> bool {
        if self.vertex_slot.contains_key(&id) {
            log::warn!("vertex {id} already exists in the graph; ignoring");
            return false;
        }
        let slot = self.vertices.len() as u32;
        self.vertices.push(Vertex { id, pos, out: Vec::new(), inc: Vec::new() });
        self.vertex_slot.insert(id, slot);
        if let Some(p) = pos {
            self.spatial_idx.insert(VertexEntry { point: [p.x, p.y], id });
        }
        true
    }

    /// Insert an edge with a caller-chosen ID.
    ///
    /// Both endpoints must already exist.  An edge whose ID or `(from, to)`
    /// pair is already present is a logged no-op.  Returns `Ok(true)` if the
    /// edge was inserted.
    pub fn add_edge(&mut self, data: EdgeData) -> GraphResult<bool> {
        data.validate()?;
        let from_slot = self.slot_of(data.from)?;
        let to_slot   = self.slot_of(data.to)?;

        if self.edge_slot.contains_key(&data.id) {
            log::warn!("edge {} already exists in the graph; ignoring", data.id);
            return Ok(false);
        }
        if self.edge_by_ends.contains_key(&(data.from, data.to)) {
            log::warn!(
                "an edge {}→{} already exists in the graph; ignoring {}",
                data.from, data.to, data.id
            );
            return Ok(false);
        }

        let slot = self.edges.len() as u32;
        self.edges.push(Edge { data, occupancy: OccupancyStore::new() });
        self.edge_slot.insert(data.id, slot);
        self.edge_by_ends.insert((data.from, data.to), slot);
        self.vertices[from_slot as usize].out.push(slot);
        self.vertices[to_slot as usize].inc.push(slot);
        Ok(true)
    }

    /// Insert an edge under a freshly minted random ID.
    ///
    /// IDs are drawn uniformly from `0..MAX_EDGE_ID`; a collision is retried
    /// with a new draw, at most [`MAX_EDGE_ID_ATTEMPTS`] times.  Returns
    /// `Ok(None)` if an edge `from → to` already exists.
    pub fn connect<R: Rng + ?Sized>(
        &mut self,
        from:      VertexId,
        to:        VertexId,
        length:    f64,
        max_speed: f64,
        rng:       &mut R,
    ) -> GraphResult<Option<EdgeId>> {
        let id = self.mint_edge_id(rng)?;
        let data = EdgeData { id, from, to, length, max_speed };
        Ok(self.add_edge(data)?.then_some(id))
    }

    fn mint_edge_id<R: Rng + ?Sized>(&self, rng: &mut R) -> GraphResult<EdgeId> {
        for _ in 0..MAX_EDGE_ID_ATTEMPTS {
            let id = EdgeId(rng.gen_range(0..MAX_EDGE_ID));
            if !self.edge_slot.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(GraphError::EdgeIdSpaceExhausted { attempts: MAX_EDGE_ID_ATTEMPTS })
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    fn slot_of(&self, id: VertexId) -> GraphResult<u32> {
        self.vertex_slot
            .get(&id)
            .copied()
            .ok_or(GraphError::VertexNotFound(id))
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex_slot.contains_key(&id)
    }

    pub fn vertex(&self, id: VertexId) -> GraphResult<&Vertex> {
        Ok(&self.vertices[self.slot_of(id)? as usize])
    }

    pub fn edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.edge_slot
            .get(&id)
            .map(|&slot| &self.edges[slot as usize])
            .ok_or(GraphError::EdgeNotFound(id))
    }

    /// The edge `from → to`.
    pub fn edge_between(&self, from: VertexId, to: VertexId) -> GraphResult<&Edge> {
        self.edge_by_ends
            .get(&(from, to))
            .map(|&slot| &self.edges[slot as usize])
            .ok_or(GraphError::EdgeBetweenNotFound { from, to })
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Edges leaving `id`.
    pub fn out_edges(&self, id: VertexId) -> GraphResult<impl Iterator<Item = &Edge> + '_> {
        let v = self.vertex(id)?;
        Ok(v.out.iter().map(|&slot| &self.edges[slot as usize]))
    }

    /// Deduplicated, sorted vertex IDs derived purely from the edge list.
    ///
    /// Isolated vertices do not appear; they can never start or end a path.
    pub fn vertices_from_edges(&self) -> Vec<VertexId> {
        let set: FxHashSet<VertexId> = self
            .edges
            .iter()
            .flat_map(|e| [e.data.from, e.data.to])
            .collect();
        let mut ids: Vec<VertexId> = set.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    /// Total number of vehicles on all edges.
    pub fn occupancy_total(&self) -> usize {
        self.edges.iter().map(|e| e.occupancy.len()).sum()
    }

    // ── Slot-level access for the router ──────────────────────────────────

    pub(crate) fn vertex_slot(&self, id: VertexId) -> GraphResult<u32> {
        self.slot_of(id)
    }

    pub(crate) fn vertex_at(&self, slot: u32) -> &Vertex {
        &self.vertices[slot as usize]
    }

    pub(crate) fn edge_at(&self, slot: u32) -> &Edge {
        &self.edges[slot as usize]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Min/max X and Y over all positioned vertices.  `None` if no vertex
    /// has coordinates.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.spatial_idx.size() == 0 {
            return None;
        }
        let env = self.spatial_idx.root().envelope();
        let [x0, y0] = env.lower();
        let [x1, y1] = env.upper();
        Some(BoundingBox::new(Point::new(x0, y0), Point::new(x1, y1)))
    }

    /// Positioned vertices inside `bbox` (closed on all sides).
    pub fn vertices_within(&self, bbox: &BoundingBox) -> Vec<(VertexId, Point)> {
        let env = AABB::from_corners(
            [bbox.bottom_left.x, bbox.bottom_left.y],
            [bbox.top_right.x, bbox.top_right.y],
        );
        self.spatial_idx
            .locate_in_envelope(&env)
            .map(|e| (e.id, Point::new(e.point[0], e.point[1])))
            .collect()
    }

    /// The positioned vertex closest to `pos`.  `None` if no vertex has
    /// coordinates.
    pub fn nearest_vertex(&self, pos: Point) -> Option<VertexId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }
}
