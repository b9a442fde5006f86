//! Simulation observer trait for progress reporting.

use rt_core::VehicleId;
use rt_graph::{GraphError, Path};
use rt_vehicle::VehicleFault;

use crate::RunSummary;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run].
///
/// Observers are pure sinks: nothing they do feeds back into the
/// simulation.  All methods have default no-op implementations so
/// implementors only override what they care about.
///
/// Callbacks always run on the thread that called `run`, also in concurrent
/// mode, so an observer needs neither `Send` nor `Sync`.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_vehicle_parked(&mut self, _id: &VehicleId, parked: usize, total: usize) {
///         println!("{parked}/{total} vehicles parked");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once per vehicle, in creation order, before the first step.
    fn on_vehicle_created(&mut self, _id: &VehicleId, _path: &Path) {}

    /// Called for every vehicle slot whose path could not be produced.
    fn on_vehicle_skipped(&mut self, _slot: usize, _error: &GraphError) {}

    /// Called each time a vehicle parks.  `parked` counts vehicles parked so
    /// far; `total` is the number of vehicles created.
    fn on_vehicle_parked(&mut self, _id: &VehicleId, _parked: usize, _total: usize) {}

    /// Called when a vehicle is abandoned after a fault.
    fn on_vehicle_faulted(&mut self, _fault: &VehicleFault) {}

    /// Serial mode only: called after every tick with the number of vehicles
    /// still active.
    fn on_tick_end(&mut self, _tick: u64, _active: usize) {}

    /// Called once after the last vehicle finished.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
