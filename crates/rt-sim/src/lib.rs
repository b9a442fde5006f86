//! `rt-sim` — simulation driver for the road_traffic simulator.
//!
//! # Stepping modes
//!
//! ```text
//! Serial:
//!   for tick in 0..:
//!     for vehicle in active (creation order):
//!       vehicle.step()
//!     drop parked / faulted vehicles from active
//!     stop when active is empty (or max_ticks reached → TickLimit)
//!
//! Concurrent:
//!   one Rayon task per vehicle:
//!     loop { vehicle.step() } until parked or faulted
//!     send one Progress event → calling thread
//!   calling thread counts events and drives the observer
//! ```
//!
//! Serial runs are deterministic for a fixed seed.  Concurrent runs are not:
//! the order in which vehicles on one edge update its occupancy store depends
//! on scheduling, so car-following decisions differ between runs.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rt_core::SimConfig;
//! use rt_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(&graph, SimConfig::default()).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! assert!(summary.all_parked());
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{Sim, run, run_with_paths};
pub use summary::RunSummary;
