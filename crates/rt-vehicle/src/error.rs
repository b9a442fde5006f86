//! Unrecoverable vehicle faults.

use thiserror::Error;

use rt_core::{EdgeId, VehicleId, VertexId};

/// An invariant violation detected while stepping a vehicle.
///
/// A fault means the vehicle's view of the graph is inconsistent.  The
/// vehicle's run is over: the driver abandons it and records the fault.
/// Every variant carries enough context to reconstruct where it happened.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VehicleFault {
    /// The travelled distance does not map to any segment of the path.
    #[error("vehicle {vehicle}: distance {distance} resolves to no edge of path {path:?}")]
    EdgeIndexUnresolved {
        vehicle:  VehicleId,
        path:     Vec<VertexId>,
        distance: f64,
    },

    /// A path segment refers to an edge the graph does not have.
    #[error("vehicle {vehicle}: edge {edge} (segment {index} of path {path:?}) is missing from the graph")]
    EdgeMissing {
        vehicle: VehicleId,
        path:    Vec<VertexId>,
        index:   usize,
        edge:    EdgeId,
    },

    /// The vehicle covered its whole path but was never parked.
    #[error("vehicle {vehicle}: distance {distance} reached path length {total} while still active")]
    ParkedButActive {
        vehicle:  VehicleId,
        distance: f64,
        total:    f64,
    },

    /// The vehicle was not in the occupancy store of the edge it believed it
    /// was on.
    #[error("vehicle {vehicle}: not found on edge {edge} (segment {index} of path {path:?})")]
    OccupancyDesync {
        vehicle: VehicleId,
        path:    Vec<VertexId>,
        index:   usize,
        edge:    EdgeId,
    },
}

impl VehicleFault {
    /// The vehicle the fault belongs to.
    pub fn vehicle(&self) -> &VehicleId {
        match self {
            VehicleFault::EdgeIndexUnresolved { vehicle, .. }
            | VehicleFault::EdgeMissing { vehicle, .. }
            | VehicleFault::ParkedButActive { vehicle, .. }
            | VehicleFault::OccupancyDesync { vehicle, .. } => vehicle,
        }
    }
}

pub type StepResult<T> = Result<T, VehicleFault>;
