//! Strongly typed identifier wrappers.
//!
//! Vertex and edge IDs are `Copy + Ord + Hash` so they can be used as map keys
//! and sorted collection elements without ceremony.  Vertex IDs come from the
//! graph source (OSM node IDs are 64-bit); edge IDs are minted by the graph
//! itself.  Vehicle IDs are random UUID codes.

use std::fmt;

use rand::Rng;
use uuid::Builder;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The raw integer value.
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of a road-network vertex, as supplied by the graph source.
    pub struct VertexId(u64);
}

typed_id! {
    /// Synthetic identifier of a directed edge.  Unique within one graph.
    pub struct EdgeId(u32);
}

// ── VehicleId ─────────────────────────────────────────────────────────────────

/// Collision-resistant text code identifying a vehicle: a random (v4)
/// UUID in its 32-digit hex form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(String);

impl VehicleId {
    /// Draw a fresh random code from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let uuid = Builder::from_random_bytes(rng.r#gen()).into_uuid();
        VehicleId(uuid.simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VehicleId {
    fn from(code: &str) -> Self {
        VehicleId(code.to_owned())
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
