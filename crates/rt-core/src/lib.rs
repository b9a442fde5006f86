//! `rt-core` — foundational types for the `road_traffic` simulator.
//!
//! This crate is a dependency of every other `rt-*` crate.  It has no `rt-*`
//! dependencies and minimal external ones (`rand`, `thiserror` and `uuid`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `VertexId`, `EdgeId`, `VehicleId`                         |
//! | [`geo`]      | `Point`, `BoundingBox`                                    |
//! | [`rng`]      | `VehicleRng` (per-vehicle), `SimRng` (global)             |
//! | [`config`]   | `SimConfig`, `SpeedRange`, `StepMode`                     |
//! | [`error`]    | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimConfig, SpeedRange, StepMode};
pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, Point};
pub use ids::{EdgeId, VehicleId, VertexId};
pub use rng::{SimRng, VehicleRng};
