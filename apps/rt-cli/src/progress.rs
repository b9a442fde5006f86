//! Progress logging observer.

use rt_core::VehicleId;
use rt_graph::GraphError;
use rt_sim::{RunSummary, SimObserver};
use rt_vehicle::VehicleFault;

/// Logs "parked / total" every `every` parked vehicles, plus skips, faults
/// and the final summary.
pub struct ProgressLogger {
    label: String,
    every: usize,
}

impl ProgressLogger {
    pub fn new(label: impl Into<String>, every: usize) -> Self {
        Self { label: label.into(), every: every.max(1) }
    }
}

impl SimObserver for ProgressLogger {
    fn on_vehicle_skipped(&mut self, slot: usize, error: &GraphError) {
        log::warn!("{}: vehicle slot {slot} skipped: {error}", self.label);
    }

    fn on_vehicle_parked(&mut self, id: &VehicleId, parked: usize, total: usize) {
        if parked % self.every == 0 || parked == total {
            log::info!("{}: {parked}/{total} vehicles parked (last: {id})", self.label);
        }
    }

    fn on_vehicle_faulted(&mut self, fault: &VehicleFault) {
        log::error!("{}: {fault}", self.label);
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        log::info!("{}: {summary}", self.label);
    }
}
