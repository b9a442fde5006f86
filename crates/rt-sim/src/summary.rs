//! End-of-run totals.

use std::fmt;

/// What happened during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Vehicles that got a path and were stepped.
    pub created:        usize,
    /// Vehicle slots dropped because no path could be produced.
    pub skipped:        usize,
    /// Vehicles that reached their destination.
    pub parked:         usize,
    /// Vehicles abandoned after a fault.
    pub faulted:        usize,
    /// Serial mode: ticks run.  Concurrent mode: the most steps any single
    /// vehicle took.
    pub ticks:          u64,
    /// Sum of all vehicles' distance travelled.
    pub total_distance: f64,
}

impl RunSummary {
    /// `true` if every created vehicle parked.
    pub fn all_parked(&self) -> bool {
        self.parked == self.created
    }

    /// Fold another run's totals into this one.  `ticks` keeps the larger
    /// value.
    pub fn merge(&mut self, other: &RunSummary) {
        self.created        += other.created;
        self.skipped        += other.skipped;
        self.parked         += other.parked;
        self.faulted        += other.faulted;
        self.ticks           = self.ticks.max(other.ticks);
        self.total_distance += other.total_distance;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} vehicles parked, {} faulted, {} skipped, {} ticks, {:.1} distance travelled",
            self.parked, self.created, self.faulted, self.skipped, self.ticks, self.total_distance
        )
    }
}
