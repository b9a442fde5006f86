//! `rt-partition` — spatial partitioning and distribution across workers.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`rect`]      | `Rect`, `divide_into_rects`, `subgraph_from_rect`, `divide_slice` |
//! | [`wire`]      | `bitcode` message structs for the three tags                  |
//! | [`transport`] | `Transport` trait, `Tag`, frame codec, `ChannelTransport`     |
//! | [`protocol`]  | `run_coordinator`, `run_worker`, `run_distributed`            |
//! | [`error`]     | `PartitionError`, `PartitionResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `DistributionConfig`.   |

pub mod error;
pub mod protocol;
pub mod rect;
pub mod transport;
pub mod wire;


pub use error::{PartitionError, PartitionResult};
pub use protocol::{
    COORDINATOR, DistributionConfig, WorkerOutcome, run_coordinator, run_distributed,
    run_distributed_with, run_worker, total,
};
pub use rect::{Rect, divide_into_rects, divide_slice, edge_records, subgraph_from_rect};
pub use transport::{ChannelTransport, Tag, Transport, read_frame, write_frame};
