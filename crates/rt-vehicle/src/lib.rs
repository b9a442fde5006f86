//! `rt-vehicle` — the per-vehicle state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`state`]   | `VehicleState` — `Created → Travelling → Parked` lifecycle   |
//! | [`vehicle`] | `Vehicle`, `StepReport` — distance tracking, car-following   |
//! | [`error`]   | `VehicleFault`, `StepResult<T>`                              |
//!
//! # Sharing
//!
//! A `Vehicle` is owned by exactly one task.  The only state it shares is its
//! entry in the occupancy store of the edge it is on, through which vehicles
//! behind it read its distance and speed.

pub mod error;
pub mod state;
pub mod vehicle;


pub use error::{StepResult, VehicleFault};
pub use state::VehicleState;
pub use vehicle::{StepReport, Vehicle};
