use rt_core::CoreError;
use rt_graph::GraphError;
use rt_vehicle::VehicleFault;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("vehicle fault: {0}")]
    Fault(#[from] VehicleFault),

    #[error("tick limit {ticks} reached with {active} vehicles still active")]
    TickLimit {
        ticks:  u64,
        active: usize,
    },
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::Config(e.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
