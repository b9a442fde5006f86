//! The vehicle and its step function.
//!
//! # Motion model
//!
//! A vehicle tracks one number, its distance travelled along the whole path.
//! Each step resolves that distance to a path segment, makes sure the vehicle
//! is registered in exactly that segment's occupancy store, negotiates speed
//! with the vehicle immediately ahead on the same edge, then advances by the
//! negotiated speed.  The vehicle parks as soon as its distance reaches the
//! path length.
//!
//! Speed negotiation:
//!
//! | Situation                      | Target speed                       |
//! |--------------------------------|------------------------------------|
//! | Leader slower than us          | leader's speed (applied at once)   |
//! | Leader as fast or faster       | edge limit, capped at `max_speed`  |
//! | No leader                      | cruise speed, capped by edge limit |
//!
//! Slowing to a target happens immediately.  Speeding up happens by one
//! random increment from the acceleration band per step, never past the
//! target.

use std::sync::Arc;

use rt_core::{SpeedRange, VehicleId, VehicleRng};
use rt_graph::{Edge, Occupant, Path, RoadGraph};

use crate::{StepResult, VehicleFault, VehicleState};

/// Outcome of one [`Vehicle::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Speed used to advance this step; `0.0` for a terminal vehicle.
    pub applied_speed: f64,
    /// Segment the step was taken on.
    pub edge_index:    Option<usize>,
    /// `true` if the vehicle moved onto a new segment this step.
    pub entered_edge:  bool,
    /// State after the step.
    pub state:         VehicleState,
}

impl StepReport {
    fn idle(state: VehicleState) -> Self {
        Self { applied_speed: 0.0, edge_index: None, entered_edge: false, state }
    }

    pub fn parked(&self) -> bool {
        self.state == VehicleState::Parked
    }
}

/// One simulated vehicle.
///
/// The vehicle exclusively owns its path, state and RNG.  The [`Occupant`]
/// handle is the part other vehicles on the same edge can read.
#[derive(Debug)]
pub struct Vehicle {
    path:         Path,
    motion:       Arc<Occupant>,
    cruise_speed: f64,
    max_speed:    f64,
    state:        VehicleState,
    rng:          VehicleRng,
}

impl Vehicle {
    /// `cruise_speed` is both the starting speed and the speed resumed on a
    /// free road.  `max_speed` is the top of the configured speed band.
    pub fn new(
        id:           VehicleId,
        path:         Path,
        cruise_speed: f64,
        max_speed:    f64,
        rng:          VehicleRng,
    ) -> Self {
        Self {
            path,
            motion: Arc::new(Occupant::new(id, cruise_speed)),
            cruise_speed,
            max_speed: max_speed.max(cruise_speed),
            state: VehicleState::Created,
            rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> &VehicleId {
        self.motion.id()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn is_parked(&self) -> bool {
        self.state == VehicleState::Parked
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn distance_travelled(&self) -> f64 {
        self.motion.distance()
    }

    /// Current speed (possibly throttled by a leader).
    pub fn speed(&self) -> f64 {
        self.motion.speed()
    }

    pub fn cruise_speed(&self) -> f64 {
        self.cruise_speed
    }

    pub fn occupant(&self) -> &Arc<Occupant> {
        &self.motion
    }

    // ── Step ──────────────────────────────────────────────────────────────

    /// Advance the vehicle by one step.
    ///
    /// A terminal vehicle is left untouched.  A returned fault leaves the
    /// vehicle where it was; the caller is expected to [`abandon`] it.
    ///
    /// [`abandon`]: Self::abandon
    pub fn step(&mut self, graph: &RoadGraph, accel: &SpeedRange) -> StepResult<StepReport> {
        if self.state.is_terminal() {
            return Ok(StepReport::idle(self.state));
        }

        // ── Resolve the current segment ───────────────────────────────────
        let distance = self.motion.distance();
        if !distance.is_finite() || distance < 0.0 {
            return Err(VehicleFault::EdgeIndexUnresolved {
                vehicle:  self.id().clone(),
                path:     self.path.vertices().to_vec(),
                distance,
            });
        }
        let Some((index, _delta)) = self.path.edge_index_at(distance) else {
            return Err(VehicleFault::ParkedButActive {
                vehicle:  self.id().clone(),
                distance,
                total:    self.path.total_length(),
            });
        };
        let edge = self.edge(graph, index)?;

        // ── Leave the previous edge ───────────────────────────────────────
        let previous = self.state.edge_index();
        let entered_edge = previous != Some(index);
        if let Some(prev) = previous.filter(|&p| p != index) {
            self.leave(graph, prev)?;
            log::trace!("{} left segment {prev}", self.id());
        }

        // ── Join the current edge and negotiate speed ─────────────────────
        edge.occupancy.push(&self.motion);
        self.state = VehicleState::Travelling { edge_index: index };
        if entered_edge {
            log::trace!("{} entered {} (segment {index})", self.id(), edge.id());
        }

        let speed = self.negotiate_speed(edge, accel);
        self.motion.set_speed(speed);

        // ── Advance ───────────────────────────────────────────────────────
        let travelled = distance + speed;
        self.motion.set_distance(travelled);
        edge.occupancy.resort();

        if travelled >= self.path.total_length() {
            if !edge.occupancy.remove(&self.motion) {
                return Err(self.desync(index, edge));
            }
            self.state = VehicleState::Parked;
            log::debug!(
                "{} parked after {:.2} of {:.2}",
                self.id(),
                travelled,
                self.path.total_length()
            );
        }

        Ok(StepReport {
            applied_speed: speed,
            edge_index: Some(index),
            entered_edge,
            state: self.state,
        })
    }

    /// Take the vehicle out of the run: drop it from whatever occupancy store
    /// it is in and mark it [`VehicleState::Abandoned`].
    pub fn abandon(&mut self, graph: &RoadGraph) {
        if let Some(index) = self.state.edge_index() {
            if let Some(edge) = self.path.edges().get(index).and_then(|&id| graph.edge(id).ok()) {
                edge.occupancy.remove(&self.motion);
            }
        }
        if self.state != VehicleState::Parked {
            self.state = VehicleState::Abandoned;
        }
    }

    /// Log a one-line summary at trace level.
    pub fn log_info(&self) {
        log::trace!(
            "vehicle {} parked={} speed={:.2} distance={:.2} path_lengths={:?}",
            self.id(),
            self.is_parked(),
            self.speed(),
            self.distance_travelled(),
            self.path.lengths()
        );
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn edge<'g>(&self, graph: &'g RoadGraph, index: usize) -> StepResult<&'g Edge> {
        let id = self.path.edges()[index];
        graph.edge(id).map_err(|_| VehicleFault::EdgeMissing {
            vehicle: self.id().clone(),
            path:    self.path.vertices().to_vec(),
            index,
            edge:    id,
        })
    }

    fn leave(&self, graph: &RoadGraph, index: usize) -> StepResult<()> {
        let edge = self.edge(graph, index)?;
        if edge.occupancy.remove(&self.motion) {
            Ok(())
        } else {
            Err(self.desync(index, edge))
        }
    }

    fn desync(&self, index: usize, edge: &Edge) -> VehicleFault {
        VehicleFault::OccupancyDesync {
            vehicle: self.id().clone(),
            path:    self.path.vertices().to_vec(),
            index,
            edge:    edge.id(),
        }
    }

    fn negotiate_speed(&mut self, edge: &Edge, accel: &SpeedRange) -> f64 {
        let current = self.motion.speed();
        let limit = edge
            .speed_limit()
            .map_or(self.max_speed, |l| l.min(self.max_speed));

        let target = match edge.occupancy.vehicle_ahead(&self.motion) {
            Some(leader) if leader.speed() < current => leader.speed(),
            Some(leader) if leader.speed() == current => current.min(limit),
            Some(leader) => leader.speed().min(limit),
            None => self.cruise_speed.min(limit),
        };

        if target < current {
            target
        } else if target > current {
            (current + accel.sample(self.rng.inner())).min(target)
        } else {
            current
        }
    }
}
