use rt_graph::GraphError;
use rt_sim::SimError;
use thiserror::Error;

use crate::Tag;

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("partition configuration error: {0}")]
    Config(String),

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("failed to decode {what} message: {reason}")]
    Decode {
        what:   &'static str,
        reason: String,
    },

    #[error("expected a {expected} message, got tag {got}")]
    UnexpectedTag {
        expected: Tag,
        got:      u8,
    },

    #[error("rank {rank} is out of range (world size {size})")]
    RankOutOfRange {
        rank: usize,
        size: usize,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PartitionResult<T> = Result<T, PartitionError>;
