//! Vehicle lifecycle state.

/// Where a vehicle is in its lifecycle.
///
/// `Created` and `Travelling` behave the same when stepped; `Created` just
/// has not entered its first edge yet.  `Parked` and `Abandoned` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VehicleState {
    #[default]
    Created,
    /// On path segment `edge_index`.
    Travelling { edge_index: usize },
    /// Reached the end of its path.
    Parked,
    /// Removed from the run after a fault.
    Abandoned,
}

impl VehicleState {
    /// `true` once the vehicle will never move again.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, VehicleState::Parked | VehicleState::Abandoned)
    }

    /// Segment index the vehicle currently occupies, if any.
    #[inline]
    pub fn edge_index(self) -> Option<usize> {
        match self {
            VehicleState::Travelling { edge_index } => Some(edge_index),
            _ => None,
        }
    }
}
