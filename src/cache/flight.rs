//! In-flight computations shared between callers of the same key.

use crate::error::NearbyError;
use parking_lot::{Condvar, Mutex};

/// Delivered to waiters when the computing caller unwinds before producing a
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputationAborted;

impl From<ComputationAborted> for NearbyError {
    fn from(_: ComputationAborted) -> Self {
        NearbyError::Unavailable("computation aborted before completing".to_string())
    }
}

/// A one-shot result slot that any number of callers can block on.
pub(crate) struct Flight<V, E> {
    slot: Mutex<Option<Result<V, E>>>,
    ready: Condvar,
}

impl<V: Clone, E: Clone> Flight<V, E> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Stores the result and wakes every waiter. Only the first result sticks.
    pub(crate) fn publish(&self, result: Result<V, E>) {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(result);
        }
        drop(slot);
        self.ready.notify_all();
    }

    /// Blocks until a result is published.
    pub(crate) fn wait(&self) -> Result<V, E> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            self.ready.wait(&mut slot);
        }
    }
}
