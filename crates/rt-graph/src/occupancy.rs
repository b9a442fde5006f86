//! Per-edge occupancy: the ordered, thread-safe set of vehicles on one edge.
//!
//! # Ordering
//!
//! Members are kept from most-advanced (front, index 0) to least-advanced
//! (back) by each vehicle's distance travelled along its *whole path*.  Every
//! mutation re-sorts, because vehicles advance at different rates between
//! sorts.  Ties keep their previous relative order (the sort is stable), so
//! the vehicle that entered first stays in front.
//!
//! # Sharing
//!
//! The store holds `Arc<Occupant>` handles.  An [`Occupant`] is the part of a
//! vehicle other vehicles may observe (its id, distance and current speed),
//! published through atomics.  Only the owning vehicle writes them; everyone
//! else reads.  The store's own `Mutex` guards membership and order.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ordered_float::OrderedFloat;

use rt_core::VehicleId;

// ── Occupant ──────────────────────────────────────────────────────────────────

/// Observable motion state of one vehicle.
///
/// `f64` values are stored as their bit patterns in `AtomicU64`.  Relaxed
/// ordering is enough: each field is an independent snapshot and membership
/// changes synchronise through the store's mutex.
#[derive(Debug)]
pub struct Occupant {
    id:       VehicleId,
    distance: AtomicU64,
    speed:    AtomicU64,
}

impl Occupant {
    pub fn new(id: VehicleId, speed: f64) -> Self {
        Self {
            id,
            distance: AtomicU64::new(0.0_f64.to_bits()),
            speed:    AtomicU64::new(speed.to_bits()),
        }
    }

    #[inline]
    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    /// Distance travelled along the whole path.
    #[inline]
    pub fn distance(&self) -> f64 {
        f64::from_bits(self.distance.load(Ordering::Relaxed))
    }

    /// Current (possibly throttled) speed.
    #[inline]
    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_distance(&self, distance: f64) {
        self.distance.store(distance.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn set_speed(&self, speed: f64) {
        self.speed.store(speed.to_bits(), Ordering::Relaxed);
    }
}

// ── OccupancyStore ────────────────────────────────────────────────────────────

/// Ordered, internally synchronised collection of the vehicles on one edge.
///
/// Membership is by handle identity (`Arc::ptr_eq`), so two distinct
/// occupants never alias even if a caller reuses an id.
#[derive(Debug, Default)]
pub struct OccupancyStore {
    members: Mutex<Vec<Arc<Occupant>>>,
}

impl OccupancyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the member list.  A poisoned lock is still structurally valid, so
    /// its guard is taken over.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Occupant>>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `occupant` if it is not already present, then re-sort.
    ///
    /// Returns `true` if the occupant was newly inserted.
    pub fn push(&self, occupant: &Arc<Occupant>) -> bool {
        let mut members = self.lock();
        let inserted = !members.iter().any(|m| Arc::ptr_eq(m, occupant));
        if inserted {
            members.push(Arc::clone(occupant));
        }
        sort_members(&mut members);
        inserted
    }

    /// Remove `occupant`.  Returns `true` if it was present.
    pub fn remove(&self, occupant: &Occupant) -> bool {
        let mut members = self.lock();
        let before = members.len();
        members.retain(|m| !std::ptr::eq(Arc::as_ptr(m), occupant));
        let removed = members.len() != before;
        if removed {
            sort_members(&mut members);
        }
        removed
    }

    /// Position of `occupant` from the front, or `None` if absent.
    pub fn index_of(&self, occupant: &Occupant) -> Option<usize> {
        self.lock()
            .iter()
            .position(|m| std::ptr::eq(Arc::as_ptr(m), occupant))
    }

    /// `true` if `occupant` is on this edge.
    pub fn contains(&self, occupant: &Occupant) -> bool {
        self.index_of(occupant).is_some()
    }

    /// The vehicle immediately in front of `occupant`.
    ///
    /// `None` if `occupant` is at the front or is not on this edge.
    pub fn vehicle_ahead(&self, occupant: &Occupant) -> Option<Arc<Occupant>> {
        let members = self.lock();
        let idx = members
            .iter()
            .position(|m| std::ptr::eq(Arc::as_ptr(m), occupant))?;
        idx.checked_sub(1).map(|i| Arc::clone(&members[i]))
    }

    /// Re-establish front-to-back order after members moved.
    pub fn resort(&self) {
        sort_members(&mut self.lock());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current member list, front first.
    pub fn snapshot(&self) -> Vec<Arc<Occupant>> {
        self.lock().clone()
    }

    /// `true` if the members are in descending distance order right now.
    ///
    /// Only meaningful while no vehicle on the edge is moving (between serial
    /// ticks, or after a concurrent run finished).
    pub fn is_ordered(&self) -> bool {
        self.lock()
            .windows(2)
            .all(|w| w[0].distance() >= w[1].distance())
    }
}

/// Stable sort by descending distance.  Each key is read once, so a
/// concurrent writer cannot make the comparison inconsistent mid-sort.
fn sort_members(members: &mut [Arc<Occupant>]) {
    members.sort_by_cached_key(|m| Reverse(OrderedFloat(m.distance())));
}
