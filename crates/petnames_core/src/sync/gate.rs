//! Scoped mutual exclusion for reconciliation passes.
//!
//! A pass holds the gate for its whole read-diff-write sequence. Store writes
//! notify subscribers synchronously, so a pass can re-enter the bridge on the
//! same thread; that re-entry is refused instead of deadlocking. Passes on
//! other threads wait until the gate is released.

use parking_lot::{Condvar, Mutex};
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
pub struct SyncGate {
    owner: Mutex<Option<ThreadId>>,
    released: Condvar,
}

impl SyncGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the gate for the calling thread.
    ///
    /// Returns `None` when the calling thread already holds it. Blocks while
    /// another thread holds it; the guard then reports `waited()`.
    pub fn enter(&self) -> Option<SyncGuard<'_>> {
        let current = thread::current().id();
        let mut owner = self.owner.lock();
        let mut waited = false;
        loop {
            match *owner {
                None => {
                    *owner = Some(current);
                    return Some(SyncGuard { gate: self, waited });
                }
                Some(holder) if holder == current => return None,
                Some(_) => {
                    waited = true;
                    self.released.wait(&mut owner);
                }
            }
        }
    }

    pub fn is_held(&self) -> bool {
        self.owner.lock().is_some()
    }
}

/// Releases the gate on drop, including early returns and unwinding.
#[derive(Debug)]
pub struct SyncGuard<'gate> {
    gate: &'gate SyncGate,
    waited: bool,
}

impl SyncGuard<'_> {
    /// True when another thread's pass ran between the caller's notification
    /// and this acquisition, so any payload captured before may be stale.
    pub fn waited(&self) -> bool {
        self.waited
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        *self.gate.owner.lock() = None;
        self.gate.released.notify_all();
    }
}
