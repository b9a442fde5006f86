//! Column-wise spatial partitioning.
//!
//! The graph's bounding box is cut into `n` equal-width columns spanning the
//! full Y range.  Columns are half-open on the right, `[bot_x, top_x)`,
//! except the last one, which is closed, so every positioned vertex lands in
//! exactly one rect.  Vertices without coordinates belong to no rect.
//!
//! ```text
//!  min_x                                    max_x
//!    ┌──────────┬──────────┬──────────┐
//!    │  rect 0  │  rect 1  │  rect 2  │   full Y range
//!    └──────────┴──────────┴──────────┘
//!    [         )[         )[          ]
//! ```

use rt_core::{BoundingBox, Point, SimRng, VertexId};
use rt_graph::{EdgeRecord, GraphResult, MemorySource, RoadGraph, VertexRecord, build_graph};

use crate::{PartitionError, PartitionResult};

/// One spatial partition: its bounds and the vertices assigned to it,
/// sorted by ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub bounds:   BoundingBox,
    pub vertices: Vec<(VertexId, Point)>,
}

impl Rect {
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.binary_search_by_key(&id, |&(v, _)| v).is_ok()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().map(|&(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Split the graph's bounding box into `n` equal-width columns.
pub fn divide_into_rects(graph: &RoadGraph, n: usize) -> PartitionResult<Vec<Rect>> {
    if n == 0 {
        return Err(PartitionError::Config("cannot divide a graph into 0 rects".into()));
    }
    let bbox = graph
        .bounding_box()
        .ok_or_else(|| PartitionError::Config("no vertex in the graph has coordinates".into()))?;

    let min_x = bbox.bottom_left.x;
    let width = bbox.width() / n as f64;

    let rects: Vec<Rect> = (0..n)
        .map(|i| {
            let last = i + 1 == n;
            let bot_x = min_x + i as f64 * width;
            let top_x = if last { bbox.top_right.x } else { min_x + (i + 1) as f64 * width };
            let bounds = BoundingBox::new(
                Point::new(bot_x, bbox.bottom_left.y),
                Point::new(top_x, bbox.top_right.y),
            );

            let mut vertices: Vec<(VertexId, Point)> = graph
                .vertices_within(&bounds)
                .into_iter()
                .filter(|(_, p)| last || p.x < top_x)
                .collect();
            vertices.sort_unstable_by_key(|&(id, _)| id);
            Rect { bounds, vertices }
        })
        .collect();

    for (i, r) in rects.iter().enumerate() {
        log::info!("rect {i}: {} vertices, x in [{:.3}, {:.3}]", r.len(), r.bounds.bottom_left.x, r.bounds.top_right.x);
    }
    Ok(rects)
}

/// Flatten the graph's edges into plain records (no IDs, no occupancy).
pub fn edge_records(graph: &RoadGraph) -> Vec<EdgeRecord> {
    graph
        .edges()
        .map(|e| EdgeRecord {
            from:      e.from(),
            to:        e.to(),
            length:    e.length(),
            max_speed: e.max_speed(),
        })
        .collect()
}

/// Build a fresh graph from the rect's vertices and exactly those parent
/// edges whose endpoints are both in the rect.  Edge IDs are minted anew.
pub fn subgraph_from_rect(
    parent_edges: &[EdgeRecord],
    rect:         &Rect,
    rng:          &mut SimRng,
) -> GraphResult<RoadGraph> {
    let vertices = rect
        .vertices
        .iter()
        .map(|&(id, p)| VertexRecord { id, pos: Some(p) })
        .collect();
    let edges = parent_edges
        .iter()
        .filter(|e| rect.contains_vertex(e.from) && rect.contains_vertex(e.to))
        .copied()
        .collect();
    build_graph(&MemorySource::new(vertices, edges), rng)
}

/// Split `items` into exactly `n` contiguous parts of `ceil(len / n)` items;
/// trailing parts may be short or empty.  `n == 0` yields no parts.
pub fn divide_slice<T>(items: &[T], n: usize) -> Vec<&[T]> {
    if n == 0 {
        return Vec::new();
    }
    let part = items.len().div_ceil(n);
    (0..n)
        .map(|i| {
            let start = (i * part).min(items.len());
            let end = ((i + 1) * part).min(items.len());
            &items[start..end]
        })
        .collect()
}
