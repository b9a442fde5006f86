//! Graph-source collaborators and root-graph construction.
//!
//! The core does not care where graph data comes from.  A [`GraphSource`]
//! hands over plain vertex and edge records; [`build_graph`] turns them into
//! a [`RoadGraph`], logging and skipping records it cannot use.
//!
//! # CSV format
//!
//! [`CsvSource`] reads two files:
//!
//! ```csv
//! id,x,y
//! 0,0.0,0.0
//! 1,100.0,0.0
//! ```
//!
//! ```csv
//! from,to,length,max_speed
//! 0,1,100.0,13.9
//! 1,0,100.0,
//! ```
//!
//! `x`/`y` may both be empty for a vertex without coordinates.  `max_speed`
//! is free text: empty means no limit, anything non-numeric is read as no
//! limit with a warning.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use rt_core::{Point, SimRng, VertexId};

use crate::network::RoadGraph;
use crate::{GraphError, GraphResult};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRecord {
    pub id:  VertexId,
    pub pos: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from:      VertexId,
    pub to:        VertexId,
    pub length:    f64,
    pub max_speed: f64,
}

// ── GraphSource trait ─────────────────────────────────────────────────────────

/// Supplier of raw graph data.
pub trait GraphSource {
    fn fetch_vertices(&self) -> GraphResult<Vec<VertexRecord>>;
    fn fetch_edges(&self) -> GraphResult<Vec<EdgeRecord>>;
}

/// In-memory source, for tests and generated demo networks.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub vertices: Vec<VertexRecord>,
    pub edges:    Vec<EdgeRecord>,
}

impl MemorySource {
    pub fn new(vertices: Vec<VertexRecord>, edges: Vec<EdgeRecord>) -> Self {
        Self { vertices, edges }
    }
}

impl GraphSource for MemorySource {
    fn fetch_vertices(&self) -> GraphResult<Vec<VertexRecord>> {
        Ok(self.vertices.clone())
    }

    fn fetch_edges(&self) -> GraphResult<Vec<EdgeRecord>> {
        Ok(self.edges.clone())
    }
}

// ── CsvSource ─────────────────────────────────────────────────────────────────

/// Reads `vertices.csv` / `edges.csv` style files.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub vertices_path: PathBuf,
    pub edges_path:    PathBuf,
}

impl CsvSource {
    pub fn new(vertices_path: impl Into<PathBuf>, edges_path: impl Into<PathBuf>) -> Self {
        Self { vertices_path: vertices_path.into(), edges_path: edges_path.into() }
    }

    /// `dir/vertices.csv` and `dir/edges.csv`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self::new(dir.join("vertices.csv"), dir.join("edges.csv"))
    }
}

impl GraphSource for CsvSource {
    fn fetch_vertices(&self) -> GraphResult<Vec<VertexRecord>> {
        load_vertices_reader(File::open(&self.vertices_path)?)
    }

    fn fetch_edges(&self) -> GraphResult<Vec<EdgeRecord>> {
        load_edges_reader(File::open(&self.edges_path)?)
    }
}

#[derive(Deserialize)]
struct VertexRow {
    id: u64,
    x:  Option<f64>,
    y:  Option<f64>,
}

#[derive(Deserialize)]
struct EdgeRow {
    from:      u64,
    to:        u64,
    length:    f64,
    max_speed: Option<String>,
}

/// Parse vertex rows from any `Read` source.  Malformed rows are logged and
/// skipped.
pub fn load_vertices_reader<R: Read>(reader: R) -> GraphResult<Vec<VertexRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();

    for (line, result) in csv_reader.deserialize::<VertexRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("skipping vertex row {}: {e}", line + 1);
                continue;
            }
        };
        let pos = match (row.x, row.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            (None, None) => None,
            _ => {
                log::warn!("vertex {} has only one coordinate; treating it as unpositioned", row.id);
                None
            }
        };
        out.push(VertexRecord { id: VertexId(row.id), pos });
    }
    Ok(out)
}

/// Parse edge rows from any `Read` source.  Malformed rows are logged and
/// skipped; an unparseable `max_speed` becomes `0.0`.
pub fn load_edges_reader<R: Read>(reader: R) -> GraphResult<Vec<EdgeRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();

    for (line, result) in csv_reader.deserialize::<EdgeRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("skipping edge row {}: {e}", line + 1);
                continue;
            }
        };
        out.push(EdgeRecord {
            from:      VertexId(row.from),
            to:        VertexId(row.to),
            length:    row.length,
            max_speed: parse_max_speed(row.max_speed.as_deref()),
        });
    }
    Ok(out)
}

/// Free-text speed limit → `f64`; empty or garbage means no limit.
pub fn parse_max_speed(raw: Option<&str>) -> f64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0.0;
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            log::warn!("unreadable max speed {s:?}; treating as no limit");
            0.0
        }
    }
}

// ── Graph construction ────────────────────────────────────────────────────────

/// Build the root graph from `source`.
///
/// A failure to fetch either record list aborts construction.  Individual
/// records that cannot be inserted (duplicate IDs, unknown endpoints, bad
/// lengths) are logged and skipped, so the result may be a partial graph.
/// Edge IDs are minted from `rng`.
pub fn build_graph<S: GraphSource + ?Sized>(source: &S, rng: &mut SimRng) -> GraphResult<RoadGraph> {
    let vertices = source.fetch_vertices()?;
    let edges = source.fetch_edges()?;

    let mut graph = RoadGraph::new();
    for v in vertices {
        graph.add_vertex(v.id, v.pos);
    }

    let mut skipped = 0usize;
    for e in edges {
        match graph.connect(e.from, e.to, e.length, e.max_speed, rng.inner()) {
            Ok(Some(_)) => {}
            Ok(None) => skipped += 1,
            Err(err @ GraphError::EdgeIdSpaceExhausted { .. }) => return Err(err),
            Err(err) => {
                log::warn!("skipping edge {}→{}: {err}", e.from, e.to);
                skipped += 1;
            }
        }
    }

    log::info!(
        "built graph with {} vertices and {} edges ({} edge records skipped)",
        graph.vertex_count(),
        graph.edge_count(),
        skipped
    );
    Ok(graph)
}
