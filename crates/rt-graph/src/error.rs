//! Graph-subsystem error type.

use thiserror::Error;

use rt_core::{EdgeId, VertexId};

/// Errors produced by `rt-graph`.
///
/// These are data errors: callers at the graph-construction boundary log and
/// skip the offending record; the simulation driver treats a failed path
/// generation as a skipped vehicle.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("vertex {0} not found in graph")]
    VertexNotFound(VertexId),

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),

    #[error("no edge from {from} to {to}")]
    EdgeBetweenNotFound { from: VertexId, to: VertexId },

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("no path from {from} to {to}")]
    NoPath { from: VertexId, to: VertexId },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("no valid path found after {attempts} attempts")]
    PathGenerationExhausted { attempts: u32 },

    #[error("could not mint a unique edge id after {attempts} attempts")]
    EdgeIdSpaceExhausted { attempts: u32 },

    #[error("graph source error: {0}")]
    Source(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
