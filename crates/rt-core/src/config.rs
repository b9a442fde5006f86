//! Run configuration.
//!
//! Typically built from defaults, optionally overlaid with a JSON file by the
//! application crate, then passed to the simulation driver.

use std::fmt;

use rand::Rng;

use crate::{CoreError, CoreResult};

// ── SpeedRange ────────────────────────────────────────────────────────────────

/// Closed interval `[min, max]` of speeds (distance units per tick).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw a speed uniformly from the range.  A degenerate range (`min ==
    /// max`) always yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    #[inline]
    pub fn contains(&self, speed: f64) -> bool {
        speed >= self.min && speed <= self.max
    }

    fn validate(&self, what: &str) -> CoreResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CoreError::Config(format!("{what} range must be finite")));
        }
        if self.min <= 0.0 {
            return Err(CoreError::Config(format!(
                "{what} minimum must be positive, got {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(CoreError::Config(format!(
                "{what} minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SpeedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

// ── StepMode ──────────────────────────────────────────────────────────────────

/// How the driver steps vehicles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StepMode {
    /// One control loop steps every active vehicle once per tick, in
    /// creation order.
    #[default]
    Serial,
    /// Every vehicle runs its whole lifetime as an independent task.
    Concurrent,
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepMode::Serial     => "serial",
            StepMode::Concurrent => "concurrent",
        })
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Number of vehicles to create.
    pub vehicles: usize,

    /// Cruising speed band; each vehicle draws its base speed from it and
    /// never exceeds `speed.max`.
    pub speed: SpeedRange,

    /// Band of the random increment applied when a vehicle speeds up again
    /// behind a faster leader.
    pub accel: SpeedRange,

    /// Serial or concurrent stepping.
    pub mode: StepMode,

    /// Master RNG seed.
    pub seed: u64,

    /// Random endpoint draws per vehicle before path generation gives up.
    pub max_path_attempts: u32,

    /// Serial mode aborts once this many ticks have run with vehicles still
    /// active.  `None` runs until every vehicle is parked.
    pub max_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicles:          100,
            speed:             SpeedRange::new(5.5, 8.5),
            accel:             SpeedRange::new(0.1, 0.5),
            mode:              StepMode::Serial,
            seed:              42,
            max_path_attempts: 1_000,
            max_ticks:         None,
        }
    }
}

impl SimConfig {
    /// Check the configuration for values the driver cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        self.speed.validate("speed")?;
        self.accel.validate("acceleration")?;
        if self.max_path_attempts == 0 {
            return Err(CoreError::Config("max_path_attempts must be at least 1".into()));
        }
        if self.max_ticks == Some(0) {
            return Err(CoreError::Config("max_ticks must be at least 1 when set".into()));
        }
        Ok(())
    }
}
