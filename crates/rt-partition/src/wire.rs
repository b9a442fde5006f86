//! Binary wire format for the distribution protocol.
//!
//! Plain structs with `bitcode` derives, one per message tag.  Nothing here
//! is polymorphic: a message's tag fixes its type.

use bitcode::{Decode, Encode};

use rt_core::{BoundingBox, Point, VertexId};
use rt_graph::EdgeRecord;

use crate::rect::Rect;
use crate::{PartitionError, PartitionResult};

// ── Messages ──────────────────────────────────────────────────────────────────

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct WireVertex {
    pub id: u64,
    pub x:  f64,
    pub y:  f64,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct WireRect {
    /// `[min_x, min_y, max_x, max_y]`
    pub bounds:   [f64; 4],
    pub vertices: Vec<WireVertex>,
}

/// `RECTS`: every rect, indexed by worker rank − 1.
#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct RectsMessage {
    pub rects: Vec<WireRect>,
}

#[derive(Encode, Decode, Debug, Clone, Copy, PartialEq)]
pub struct WireEdge {
    pub from:      u64,
    pub to:        u64,
    pub length:    f64,
    pub max_speed: f64,
}

/// `EDGES`: the root graph's full edge list.
#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct EdgesMessage {
    pub edges: Vec<WireEdge>,
}

/// `PATHS`: `workers × per_worker` vertex paths; worker rank `r` owns the
/// `r − 1`th slice.  An empty path marks a slot no path was found for.
#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct PathsMessage {
    pub per_worker: u32,
    pub paths:      Vec<Vec<u64>>,
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<&Rect> for WireRect {
    fn from(r: &Rect) -> Self {
        WireRect {
            bounds: [
                r.bounds.bottom_left.x,
                r.bounds.bottom_left.y,
                r.bounds.top_right.x,
                r.bounds.top_right.y,
            ],
            vertices: r
                .vertices
                .iter()
                .map(|&(id, p)| WireVertex { id: id.raw(), x: p.x, y: p.y })
                .collect(),
        }
    }
}

impl From<WireRect> for Rect {
    fn from(w: WireRect) -> Self {
        let [x0, y0, x1, y1] = w.bounds;
        let mut vertices: Vec<(VertexId, Point)> = w
            .vertices
            .into_iter()
            .map(|v| (VertexId(v.id), Point::new(v.x, v.y)))
            .collect();
        vertices.sort_unstable_by_key(|&(id, _)| id);
        Rect {
            bounds: BoundingBox::new(Point::new(x0, y0), Point::new(x1, y1)),
            vertices,
        }
    }
}

impl From<&EdgeRecord> for WireEdge {
    fn from(e: &EdgeRecord) -> Self {
        WireEdge {
            from:      e.from.raw(),
            to:        e.to.raw(),
            length:    e.length,
            max_speed: e.max_speed,
        }
    }
}

impl From<WireEdge> for EdgeRecord {
    fn from(w: WireEdge) -> Self {
        EdgeRecord {
            from:      VertexId(w.from),
            to:        VertexId(w.to),
            length:    w.length,
            max_speed: w.max_speed,
        }
    }
}

impl RectsMessage {
    pub fn new(rects: &[Rect]) -> Self {
        Self { rects: rects.iter().map(WireRect::from).collect() }
    }

    pub fn into_rects(self) -> Vec<Rect> {
        self.rects.into_iter().map(Rect::from).collect()
    }
}

impl EdgesMessage {
    pub fn new(edges: &[EdgeRecord]) -> Self {
        Self { edges: edges.iter().map(WireEdge::from).collect() }
    }

    pub fn into_records(self) -> Vec<EdgeRecord> {
        self.edges.into_iter().map(EdgeRecord::from).collect()
    }
}

// ── Codec ─────────────────────────────────────────────────────────────────────

pub fn encode<T: Encode + ?Sized>(msg: &T) -> Vec<u8> {
    bitcode::encode(msg)
}

/// Decode a message, naming it in the error.
pub fn decode<T>(what: &'static str, bytes: &[u8]) -> PartitionResult<T>
where
    T: for<'a> Decode<'a>,
{
    bitcode::decode(bytes).map_err(|e| PartitionError::Decode { what, reason: e.to_string() })
}
