//! Idle / in-flight flag for one operation.
//!
//! Beginning an operation flips the flag and hands back a guard; dropping
//! the guard flips it back whether the operation succeeded, failed or
//! returned early. A second begin while in flight is refused, which is what
//! a disabled submit button does in a form.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyState {
    #[default]
    Idle,
    InFlight,
}

#[derive(Debug, Clone, Default)]
pub struct Busy {
    in_flight: Arc<AtomicBool>,
}

impl Busy {
    pub fn state(&self) -> BusyState {
        if self.in_flight.load(Ordering::SeqCst) {
            BusyState::InFlight
        } else {
            BusyState::Idle
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state() == BusyState::InFlight
    }

    /// Moves Idle → InFlight. Returns `None` if already in flight.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(BusyGuard {
            in_flight: Arc::clone(&self.in_flight),
        })
    }
}

#[derive(Debug)]
#[must_use = "the operation is only in flight while the guard lives"]
pub struct BusyGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
