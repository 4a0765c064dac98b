//! Best-route snapshots for observers.
//!
//! Routes are rewritten in place during recombination and mutation, so the
//! loop never hands out references into its population. It publishes an
//! owned [`Snapshot`] after every generation instead. [`SnapshotCell`] lets
//! another thread poll the latest one: publishing swaps a single `Arc`.

use crate::route::Route;
use std::sync::{Arc, Mutex, MutexGuard};

/// Immutable view of the best route at the end of a generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Generations completed when the snapshot was taken.
    pub generation: usize,
    /// Best route found so far, 0-based vertex order.
    pub route: Route,
    /// Cyclic length of `route`.
    pub distance: f64,
}

/// Shared slot holding the most recent [`Snapshot`].
///
/// ```
/// use std::sync::Arc;
/// use tsp_evolve::ga::{Snapshot, SnapshotCell};
///
/// let cell = Arc::new(SnapshotCell::new());
/// assert!(cell.latest().is_none());
/// cell.publish(Snapshot { generation: 1, route: vec![0, 2, 1], distance: 3.0 });
/// assert_eq!(cell.latest().unwrap().generation, 1);
/// ```
#[derive(Debug, Default)]
pub struct SnapshotCell {
    slot: Mutex<Option<Arc<Snapshot>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        *self.lock() = Some(next);
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.lock().clone()
    }

    /// Observer closure that publishes every snapshot it receives.
    pub fn observer(&self) -> impl FnMut(&Snapshot) + '_ {
        move |snapshot| self.publish(snapshot.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Snapshot>>> {
        // The guarded value is a single pointer and cannot be left half-written.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
