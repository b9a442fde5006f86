//! Built-in demo road network.
//!
//! A square grid of two-way streets, 100 m apart.  Every third row and
//! column is an arterial with a 50 km/h limit; the rest are residential
//! streets limited to 30 km/h.  Speeds are in metres per tick (1 tick = 1 s).

use rt_core::{Point, SimRng, VertexId};
use rt_graph::{EdgeRecord, GraphResult, MemorySource, RoadGraph, VertexRecord, build_graph};

const BLOCK_METRES:     f64 = 100.0;
const ARTERIAL_SPEED:   f64 = 13.9;
const RESIDENTIAL_SPEED: f64 = 8.3;

/// Vertex records and both directions of every street for a `side × side`
/// grid.  Vertex `row * side + col` sits at `(col, row) × 100 m`.
pub fn grid_records(side: u64) -> (Vec<VertexRecord>, Vec<EdgeRecord>) {
    let vertices = (0..side * side)
        .map(|i| VertexRecord {
            id:  VertexId(i),
            pos: Some(Point::new((i % side) as f64 * BLOCK_METRES, (i / side) as f64 * BLOCK_METRES)),
        })
        .collect();

    let mut edges = Vec::new();
    let mut street = |a: u64, b: u64, arterial: bool| {
        let max_speed = if arterial { ARTERIAL_SPEED } else { RESIDENTIAL_SPEED };
        for (from, to) in [(a, b), (b, a)] {
            edges.push(EdgeRecord { from: VertexId(from), to: VertexId(to), length: BLOCK_METRES, max_speed });
        }
    };
    for row in 0..side {
        for col in 0..side {
            let v = row * side + col;
            if col + 1 < side {
                street(v, v + 1, row % 3 == 0);
            }
            if row + 1 < side {
                street(v, v + side, col % 3 == 0);
            }
        }
    }
    (vertices, edges)
}

/// Build the demo grid as a [`RoadGraph`].
pub fn build_demo_grid(side: u64, rng: &mut SimRng) -> GraphResult<RoadGraph> {
    let (vertices, edges) = grid_records(side);
    build_graph(&MemorySource::new(vertices, edges), rng)
}
