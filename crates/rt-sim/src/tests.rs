//! Integration tests for rt-sim.

use rt_core::{EdgeId, SimConfig, StepMode, VehicleId, VehicleRng, VertexId};
use rt_graph::{EdgeData, GraphError, Path, RoadGraph};
use rt_vehicle::{Vehicle, VehicleFault};

use crate::{NoopObserver, RunSummary, Sim, SimBuilder, SimError, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(vehicles: usize, mode: StepMode) -> SimConfig {
    SimConfig { vehicles, mode, seed: 7, ..SimConfig::default() }
}

/// `n × n` grid, vertex `r * n + c`, two-way streets of length 10.
fn grid(n: u64) -> RoadGraph {
    let mut g = RoadGraph::new();
    for v in 0..n * n {
        g.add_vertex(VertexId(v), None);
    }
    let mut id = 0;
    let mut road = |g: &mut RoadGraph, a: u64, b: u64| {
        for (from, to) in [(a, b), (b, a)] {
            g.add_edge(EdgeData {
                id: EdgeId(id),
                from: VertexId(from),
                to: VertexId(to),
                length: 10.0,
                max_speed: 0.0,
            })
            .unwrap();
            id += 1;
        }
    };
    for r in 0..n {
        for c in 0..n {
            let v = r * n + c;
            if c + 1 < n {
                road(&mut g, v, v + 1);
            }
            if r + 1 < n {
                road(&mut g, v, v + n);
            }
        }
    }
    g
}

/// 0 → 1 → 2 with edge ids starting at `first_id`.
fn line(first_id: u32) -> RoadGraph {
    let mut g = RoadGraph::new();
    for v in 0..3 {
        g.add_vertex(VertexId(v), None);
    }
    for i in 0..2 {
        g.add_edge(EdgeData {
            id: EdgeId(first_id + i as u32),
            from: VertexId(i),
            to: VertexId(i + 1),
            length: 10.0,
            max_speed: 0.0,
        })
        .unwrap();
    }
    g
}

fn vehicle_on(g: &RoadGraph, name: &str, speed: f64) -> Vehicle {
    let path = Path::from_vertices(g, vec![VertexId(0), VertexId(1), VertexId(2)]).unwrap();
    Vehicle::new(VehicleId::from(name), path, speed, 8.5, VehicleRng::new(1, 0))
}

#[derive(Default)]
struct Recorder {
    created: usize,
    skipped: Vec<usize>,
    parked:  Vec<(usize, usize)>,
    faults:  Vec<VehicleFault>,
    ticks:   Vec<(u64, usize)>,
    ended:   Option<RunSummary>,
}

impl SimObserver for Recorder {
    fn on_vehicle_created(&mut self, _id: &VehicleId, _path: &Path) {
        self.created += 1;
    }
    fn on_vehicle_skipped(&mut self, slot: usize, _error: &GraphError) {
        self.skipped.push(slot);
    }
    fn on_vehicle_parked(&mut self, _id: &VehicleId, parked: usize, total: usize) {
        self.parked.push((parked, total));
    }
    fn on_vehicle_faulted(&mut self, fault: &VehicleFault) {
        self.faults.push(fault.clone());
    }
    fn on_tick_end(&mut self, tick: u64, active: usize) {
        self.ticks.push((tick, active));
    }
    fn on_sim_end(&mut self, summary: &RunSummary) {
        self.ended = Some(summary.clone());
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn empty_graph_is_rejected() {
        let g = RoadGraph::new();
        let err = SimBuilder::new(&g, test_config(3, StepMode::Serial)).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let g = grid(3);
        let mut config = test_config(3, StepMode::Serial);
        config.speed.min = 0.0;
        let err = SimBuilder::new(&g, config).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn creates_requested_vehicles() {
        let g = grid(3);
        let sim = SimBuilder::new(&g, test_config(20, StepMode::Serial)).build().unwrap();
        assert_eq!(sim.vehicles().len(), 20);
        assert!(sim.skipped().is_empty());

        let mut ids: Vec<_> = sim.vehicles().iter().map(|v| v.id().clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);

        for v in sim.vehicles() {
            assert!(sim.config().speed.contains(v.cruise_speed()));
            assert!(v.path().vertices().len() >= 2);
        }
    }

    #[test]
    fn bad_precomputed_paths_are_skipped() {
        let g = grid(3);
        let paths = vec![
            vec![VertexId(0), VertexId(1), VertexId(2)],
            vec![VertexId(0), VertexId(8)], // not adjacent
            vec![VertexId(4)],              // too short
            vec![VertexId(3), VertexId(4)],
        ];
        let mut sim = SimBuilder::new(&g, test_config(0, StepMode::Serial))
            .paths(paths)
            .build()
            .unwrap();
        assert_eq!(sim.vehicles().len(), 2);

        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();
        assert_eq!(rec.skipped, vec![1, 2]);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.skipped, 2);
        assert!(summary.all_parked());
    }
}

// ── Serial mode ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod serial {
    use super::*;

    #[test]
    fn every_vehicle_parks() {
        let g = grid(4);
        let mut sim = SimBuilder::new(&g, test_config(50, StepMode::Serial)).build().unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert_eq!(summary.created, 50);
        assert!(summary.all_parked());
        assert_eq!(summary.faulted, 0);
        assert!(sim.vehicles().iter().all(Vehicle::is_parked));
        assert_eq!(g.occupancy_total(), 0);

        // Progress is reported as parked / total, counting up.
        assert_eq!(rec.created, 50);
        assert_eq!(rec.parked.len(), 50);
        for (i, &(parked, total)) in rec.parked.iter().enumerate() {
            assert_eq!(parked, i + 1);
            assert_eq!(total, 50);
        }

        // One tick callback per tick; the last one reports nobody active.
        assert_eq!(rec.ticks.len() as u64, summary.ticks);
        assert_eq!(rec.ticks.last().map(|t| t.1), Some(0));
        assert_eq!(rec.ended.as_ref(), Some(&summary));
    }

    /// Inspects every occupancy store between serial steps.
    struct StoreAuditor<'g> {
        graph:     &'g RoadGraph,
        parked:    Vec<VehicleId>,
        ticks:     u64,
        max_crowd: usize,
    }

    impl StoreAuditor<'_> {
        fn assert_parked_absent(&self) {
            for e in self.graph.edges() {
                for o in e.occupancy.snapshot() {
                    assert!(!self.parked.contains(o.id()), "parked {} still on {}", o.id(), e.id());
                }
            }
        }
    }

    impl SimObserver for StoreAuditor<'_> {
        fn on_vehicle_parked(&mut self, id: &VehicleId, _parked: usize, _total: usize) {
            self.parked.push(id.clone());
            self.assert_parked_absent();
        }

        fn on_tick_end(&mut self, tick: u64, _active: usize) {
            self.ticks = tick;
            for e in self.graph.edges() {
                assert!(e.occupancy.is_ordered(), "{} out of order after tick {tick}", e.id());
                self.max_crowd = self.max_crowd.max(e.occupancy.len());
            }
            self.assert_parked_absent();
        }
    }

    #[test]
    fn stores_stay_ordered_and_parked_vehicles_stay_out() {
        let g = grid(4);
        let mut sim = SimBuilder::new(&g, test_config(50, StepMode::Serial)).build().unwrap();
        let mut auditor = StoreAuditor { graph: &g, parked: Vec::new(), ticks: 0, max_crowd: 0 };
        let summary = sim.run(&mut auditor).unwrap();

        assert_eq!(auditor.ticks, summary.ticks);
        assert_eq!(auditor.parked.len(), 50);
        // Some edge carried more than one vehicle at once.
        assert!(auditor.max_crowd >= 2);
    }

    #[test]
    fn distance_equals_sum_of_summary() {
        let g = grid(3);
        let mut sim = SimBuilder::new(&g, test_config(10, StepMode::Serial)).build().unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        let total: f64 = sim.vehicles().iter().map(|v| v.distance_travelled()).sum();
        assert_eq!(summary.total_distance, total);
        for v in sim.vehicles() {
            assert!(v.distance_travelled() >= v.path().total_length());
        }
    }

    #[test]
    fn same_seed_same_run() {
        let g = grid(4);
        let a = crate::run(&g, test_config(30, StepMode::Serial), &mut NoopObserver).unwrap();
        let b = crate::run(&g, test_config(30, StepMode::Serial), &mut NoopObserver).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tick_limit_aborts_and_cleans_up() {
        let g = grid(5);
        let mut config = test_config(20, StepMode::Serial);
        config.max_ticks = Some(1);
        let err = crate::run(&g, config, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::TickLimit { ticks: 1, .. }));
        assert_eq!(g.occupancy_total(), 0);
    }

    #[test]
    fn fault_only_ends_that_vehicle() {
        let g = line(1);
        let elsewhere = line(100);
        let mut sim = Sim {
            graph: &g,
            config: test_config(2, StepMode::Serial),
            vehicles: vec![vehicle_on(&g, "good", 3.0), vehicle_on(&elsewhere, "bad", 3.0)],
            skipped: vec![],
            abort_on_fault: false,
        };
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert_eq!(summary.parked, 1);
        assert_eq!(summary.faulted, 1);
        assert_eq!(rec.faults.len(), 1);
        assert_eq!(rec.faults[0].vehicle().as_str(), "bad");
        assert!(sim.vehicles()[0].is_parked());
        assert!(sim.vehicles()[1].is_finished());
        assert_eq!(g.occupancy_total(), 0);
    }

    /// Keeps the per-step vehicle lines logged for the vehicle named "traced".
    struct TraceCapture(std::sync::Mutex<Vec<String>>);

    impl log::Log for TraceCapture {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            let line = record.args().to_string();
            if record.level() == log::Level::Trace && line.starts_with("vehicle traced ") {
                if let Ok(mut lines) = self.0.lock() {
                    lines.push(line);
                }
            }
        }

        fn flush(&self) {}
    }

    static TRACE: TraceCapture = TraceCapture(std::sync::Mutex::new(Vec::new()));

    #[test]
    fn every_step_is_traced() {
        let _ = log::set_logger(&TRACE);
        log::set_max_level(log::LevelFilter::Trace);

        let g = line(1);
        let mut sim = Sim {
            graph: &g,
            config: test_config(1, StepMode::Serial),
            vehicles: vec![vehicle_on(&g, "traced", 3.0)],
            skipped: vec![],
            abort_on_fault: false,
        };
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.ticks, 7);

        let lines = TRACE.0.lock().unwrap();
        assert_eq!(lines.len(), 7);
        assert!(lines[..6].iter().all(|l| l.contains("parked=false")));
        assert!(lines[6].contains("parked=true"));
    }

    #[test]
    fn abort_on_fault_stops_the_run() {
        let g = line(1);
        let elsewhere = line(100);
        let mut sim = Sim {
            graph: &g,
            config: test_config(2, StepMode::Serial),
            vehicles: vec![vehicle_on(&g, "good", 3.0), vehicle_on(&elsewhere, "bad", 3.0)],
            skipped: vec![],
            abort_on_fault: true,
        };
        let err = sim.run(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            SimError::Fault(VehicleFault::EdgeMissing { edge: EdgeId(100), .. })
        ));
        assert_eq!(g.occupancy_total(), 0);
    }
}

// ── Concurrent mode ───────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrent {
    use super::*;

    #[test]
    fn every_vehicle_parks() {
        let g = grid(5);
        let mut sim = SimBuilder::new(&g, test_config(200, StepMode::Concurrent)).build().unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert_eq!(summary.created, 200);
        assert!(summary.all_parked());
        assert!(summary.ticks > 0);
        assert!(sim.vehicles().iter().all(Vehicle::is_parked));
        assert_eq!(g.occupancy_total(), 0);
        assert_eq!(rec.parked.last(), Some(&(200, 200)));
        // No ticks in concurrent mode.
        assert!(rec.ticks.is_empty());
    }

    #[test]
    fn distance_covers_every_path() {
        let g = grid(4);
        let mut sim = SimBuilder::new(&g, test_config(64, StepMode::Concurrent)).build().unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        let total: f64 = sim.vehicles().iter().map(|v| v.distance_travelled()).sum();
        assert_eq!(summary.total_distance, total);
        for v in sim.vehicles() {
            assert!(v.distance_travelled() >= v.path().total_length());
        }
    }

    #[test]
    fn fault_only_ends_that_vehicle() {
        let g = line(1);
        let elsewhere = line(100);
        let mut sim = Sim {
            graph: &g,
            config: test_config(3, StepMode::Concurrent),
            vehicles: vec![
                vehicle_on(&g, "a", 3.0),
                vehicle_on(&elsewhere, "bad", 3.0),
                vehicle_on(&g, "b", 4.0),
            ],
            skipped: vec![],
            abort_on_fault: false,
        };
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.parked, 2);
        assert_eq!(summary.faulted, 1);
        assert_eq!(g.occupancy_total(), 0);
    }
}

// ── RunSummary ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod summary {
    use super::*;

    #[test]
    fn merge_adds_counts_and_keeps_longest_run() {
        let mut a = RunSummary { created: 2, parked: 2, ticks: 5, total_distance: 10.0, ..Default::default() };
        let b = RunSummary { created: 3, parked: 2, faulted: 1, skipped: 1, ticks: 9, total_distance: 4.0 };
        a.merge(&b);
        assert_eq!(a.created, 5);
        assert_eq!(a.parked, 4);
        assert_eq!(a.faulted, 1);
        assert_eq!(a.skipped, 1);
        assert_eq!(a.ticks, 9);
        assert_eq!(a.total_distance, 14.0);
        assert!(!a.all_parked());
    }
}
