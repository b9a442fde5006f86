//! The `Sim` struct and its two stepping modes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use rayon::prelude::*;

use rt_core::{SimConfig, StepMode, VehicleId, VertexId};
use rt_graph::{GraphError, RoadGraph};
use rt_vehicle::{Vehicle, VehicleFault};

use crate::{RunSummary, SimBuilder, SimError, SimObserver, SimResult};

// ── Progress events (concurrent mode) ─────────────────────────────────────────

/// Sent by a vehicle task when it finishes.  The calling thread is the only
/// receiver, so all counting happens in one place.
enum Progress {
    Parked  { id: VehicleId, steps: u64 },
    Faulted { fault: VehicleFault, steps: u64 },
    Stopped { steps: u64 },
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation runner.
///
/// Holds the vehicles and a shared reference to the graph they drive on.
/// Vehicles stay owned by the `Sim` after the run, so their final state can
/// be inspected.
///
/// Create via [`SimBuilder`].
pub struct Sim<'g> {
    pub(crate) graph:          &'g RoadGraph,
    pub(crate) config:         SimConfig,
    pub(crate) vehicles:       Vec<Vehicle>,
    /// Vehicle slots whose path could not be produced.
    pub(crate) skipped:        Vec<(usize, GraphError)>,
    pub(crate) abort_on_fault: bool,
}

impl<'g> Sim<'g> {
    pub fn graph(&self) -> &'g RoadGraph {
        self.graph
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle slots that were skipped at creation and why.
    pub fn skipped(&self) -> &[(usize, GraphError)] {
        &self.skipped
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Step every vehicle until it parks (or faults).
    ///
    /// In [`StepMode::Serial`] all active vehicles are stepped once per tick
    /// in creation order.  In [`StepMode::Concurrent`] each vehicle runs to
    /// completion as its own task on Rayon's pool and the call returns once
    /// every task has finished.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let mut summary = RunSummary {
            created: self.vehicles.len(),
            skipped: self.skipped.len(),
            ..RunSummary::default()
        };

        for (slot, error) in &self.skipped {
            observer.on_vehicle_skipped(*slot, error);
        }
        for v in &self.vehicles {
            observer.on_vehicle_created(v.id(), v.path());
        }

        log::info!(
            "running {} vehicles in {} mode ({} skipped)",
            summary.created,
            self.config.mode,
            summary.skipped
        );

        match self.config.mode {
            StepMode::Serial => self.run_serial(observer, &mut summary)?,
            StepMode::Concurrent => self.run_concurrent(observer, &mut summary)?,
        }

        summary.total_distance = self.vehicles.iter().map(Vehicle::distance_travelled).sum();
        log::info!("{summary}");
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    // ── Serial mode ───────────────────────────────────────────────────────

    fn run_serial<O: SimObserver>(
        &mut self,
        observer: &mut O,
        summary:  &mut RunSummary,
    ) -> SimResult<()> {
        let graph = self.graph;
        let accel = self.config.accel;
        let total = self.vehicles.len();

        let mut active: Vec<usize> = (0..total).filter(|&i| !self.vehicles[i].is_finished()).collect();
        let mut tick = 0u64;

        while !active.is_empty() {
            if let Some(limit) = self.config.max_ticks.filter(|&l| tick >= l) {
                let still_active = active.len();
                self.abandon_all();
                return Err(SimError::TickLimit { ticks: limit, active: still_active });
            }

            for &i in &active {
                let vehicle = &mut self.vehicles[i];
                let stepped = vehicle.step(graph, &accel);
                vehicle.log_info();
                match stepped {
                    Ok(report) if report.parked() => {
                        summary.parked += 1;
                        observer.on_vehicle_parked(vehicle.id(), summary.parked, total);
                    }
                    Ok(_) => {}
                    Err(fault) => {
                        vehicle.abandon(graph);
                        summary.faulted += 1;
                        log::error!("abandoning vehicle: {fault}");
                        observer.on_vehicle_faulted(&fault);
                        if self.abort_on_fault {
                            self.abandon_all();
                            return Err(SimError::Fault(fault));
                        }
                    }
                }
            }

            active.retain(|&i| !self.vehicles[i].is_finished());
            tick += 1;
            observer.on_tick_end(tick, active.len());
        }

        summary.ticks = tick;
        Ok(())
    }

    // ── Concurrent mode ───────────────────────────────────────────────────

    fn run_concurrent<O: SimObserver>(
        &mut self,
        observer: &mut O,
        summary:  &mut RunSummary,
    ) -> SimResult<()> {
        let graph = self.graph;
        let accel = self.config.accel;
        let total = self.vehicles.len();
        let stop  = AtomicBool::new(false);
        let abort_on_fault = self.abort_on_fault;
        let mut first_fault = None;

        std::thread::scope(|s| {
            let (tx, rx) = mpsc::channel::<Progress>();
            let vehicles = &mut self.vehicles;
            let stop = &stop;

            s.spawn(move || {
                vehicles
                    .par_iter_mut()
                    .filter(|v| !v.is_finished())
                    .for_each_with(tx, |tx, vehicle| {
                        let mut steps = 0u64;
                        let event = loop {
                            if stop.load(Ordering::Relaxed) {
                                vehicle.abandon(graph);
                                break Progress::Stopped { steps };
                            }
                            let stepped = vehicle.step(graph, &accel);
                            vehicle.log_info();
                            match stepped {
                                Ok(report) => {
                                    steps += 1;
                                    if report.parked() {
                                        break Progress::Parked { id: vehicle.id().clone(), steps };
                                    }
                                }
                                Err(fault) => {
                                    vehicle.abandon(graph);
                                    break Progress::Faulted { fault, steps };
                                }
                            }
                        };
                        // The receiver outlives every sender.
                        let _ = tx.send(event);
                    });
            });

            // Fan-in: every task reports exactly once; the loop ends when the
            // last sender is dropped.
            for event in rx {
                match event {
                    Progress::Parked { id, steps } => {
                        summary.parked += 1;
                        summary.ticks = summary.ticks.max(steps);
                        observer.on_vehicle_parked(&id, summary.parked, total);
                    }
                    Progress::Faulted { fault, steps } => {
                        summary.faulted += 1;
                        summary.ticks = summary.ticks.max(steps);
                        log::error!("abandoning vehicle: {fault}");
                        observer.on_vehicle_faulted(&fault);
                        if abort_on_fault && first_fault.is_none() {
                            stop.store(true, Ordering::Relaxed);
                            first_fault = Some(fault);
                        }
                    }
                    Progress::Stopped { steps } => {
                        summary.ticks = summary.ticks.max(steps);
                    }
                }
            }
        });

        match first_fault {
            Some(fault) => Err(SimError::Fault(fault)),
            None => Ok(()),
        }
    }

    fn abandon_all(&mut self) {
        for v in self.vehicles.iter_mut().filter(|v| !v.is_finished()) {
            v.abandon(self.graph);
        }
    }
}

// ── Convenience entry points ──────────────────────────────────────────────────

/// Create `config.vehicles` vehicles on random shortest paths and run them to
/// completion.
pub fn run<O: SimObserver>(
    graph:    &RoadGraph,
    config:   SimConfig,
    observer: &mut O,
) -> SimResult<RunSummary> {
    SimBuilder::new(graph, config).build()?.run(observer)
}

/// Run one vehicle per pre-computed vertex path.
pub fn run_with_paths<O: SimObserver>(
    graph:    &RoadGraph,
    config:   SimConfig,
    paths:    Vec<Vec<VertexId>>,
    observer: &mut O,
) -> SimResult<RunSummary> {
    SimBuilder::new(graph, config).paths(paths).build()?.run(observer)
}
