//! Best tour shared by all workers of one branch-and-cut run.
//!
//! The upper bound lives in an `AtomicI64` so pruning checks never lock;
//! the tour itself sits behind a `Mutex`, which is the source of truth.
//! `i64::MAX` means no tour has been installed yet.

use crate::graph::{Cost, Tour};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub(crate) struct SharedIncumbent {
    upper_bound: AtomicI64,
    best: Mutex<Option<(Tour, Cost)>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIncumbent {
    pub(crate) fn new() -> Self {
        Self {
            upper_bound: AtomicI64::new(i64::MAX),
            best: Mutex::new(None),
        }
    }

    #[inline]
    pub(crate) fn upper_bound(&self) -> Cost {
        self.upper_bound.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn has_tour(&self) -> bool {
        self.upper_bound() < i64::MAX
    }

    pub(crate) fn snapshot(&self) -> Option<(Tour, Cost)> {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `tour` if `cost` is strictly below the current best.
    pub(crate) fn try_install(&self, tour: &Tour, cost: Cost) -> bool {
        if cost >= self.upper_bound() {
            return false;
        }
        let mut guard = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        // Re-check under the lock: another worker may have won the race.
        if guard.as_ref().is_some_and(|(_, best)| cost >= *best) {
            return false;
        }
        *guard = Some((tour.clone(), cost));
        self.upper_bound.store(cost, Ordering::Relaxed);
        true
    }
}
