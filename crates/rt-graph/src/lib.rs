//! `rt-graph` — road graph, per-edge occupancy, routing and path generation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`network`]   | `RoadGraph` (arena + R-tree), `Vertex`, `Edge`, `EdgeData`  |
//! | [`occupancy`] | `OccupancyStore`, `Occupant`                                |
//! | [`router`]    | `Router` trait, `Route`, `DijkstraRouter`                   |
//! | [`path`]      | `Path` (segments + prefix lengths)                          |
//! | [`generator`] | `PathGenerator` (bounded random shortest paths)             |
//! | [`source`]    | `GraphSource`, `MemorySource`, `CsvSource`, `build_graph`   |
//! | [`error`]     | `GraphError`, `GraphResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `EdgeData` and `Path`.  |

pub mod error;
pub mod generator;
pub mod network;
pub mod occupancy;
pub mod path;
pub mod router;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use generator::PathGenerator;
pub use network::{Edge, EdgeData, RoadGraph, Vertex};
pub use occupancy::{OccupancyStore, Occupant};
pub use path::Path;
pub use router::{DijkstraRouter, Route, Router};
pub use source::{
    CsvSource, EdgeRecord, GraphSource, MemorySource, VertexRecord, build_graph,
};
