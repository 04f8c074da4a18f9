use std::sync::{Arc, Condvar, Mutex};

use crate::{PoolError, Result};

/// Slot shared between the producing worker and all consumer handles.
struct Shared<T> {
    slot: Mutex<Option<Result<T>>>,
    ready: Condvar,
}

/// A write-once, read-many handle to the result of a submitted job.
///
/// A `Contract` is created by [`Pool::submit_contract`](crate::Pool::submit_contract)
/// and fulfilled exactly once by whichever worker executes the job — with the
/// job's return value, or with [`PoolError::JobPanicked`] if the job panicked,
/// or with [`PoolError::Cancelled`] if the pool was stopped before the job ran.
/// Handles can be cloned freely; every clone observes the same outcome.
pub struct Contract<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Contract<T> {
    fn clone(&self) -> Self {
        Contract {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Contract<T> {
    /// Creates an unfulfilled contract together with its single-use writer.
    pub(crate) fn new() -> (Contract<T>, ContractWriter<T>) {
        let shared = Arc::new(Shared {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        });
        let contract = Contract {
            shared: Arc::clone(&shared),
        };
        let writer = ContractWriter { shared };
        (contract, writer)
    }

    /// Blocks until the contract is fulfilled, then returns the outcome.
    ///
    /// May be called any number of times, from any number of cloned handles;
    /// all calls observe the same value. A panic inside the job surfaces here
    /// as [`PoolError::JobPanicked`] rather than a default value.
    pub fn get(&self) -> Result<T>
    where
        T: Clone,
    {
        let mut slot = self.shared.slot.lock().expect("contract lock poisoned");
        while slot.is_none() {
            slot = self
                .shared
                .ready
                .wait(slot)
                .expect("contract lock poisoned");
        }
        slot.as_ref().cloned().expect("fulfilled contract is empty")
    }

    /// Blocks until the contract is fulfilled, discarding the outcome.
    ///
    /// Useful for jobs run purely for their side effects, where only the
    /// completion point matters.
    pub fn wait(&self) {
        let mut slot = self.shared.slot.lock().expect("contract lock poisoned");
        while slot.is_none() {
            slot = self
                .shared
                .ready
                .wait(slot)
                .expect("contract lock poisoned");
        }
    }

    /// Returns the outcome if the contract has been fulfilled, without blocking.
    pub fn try_get(&self) -> Option<Result<T>>
    where
        T: Clone,
    {
        let slot = self.shared.slot.lock().expect("contract lock poisoned");
        slot.clone()
    }

    /// Returns `true` if the contract has been fulfilled.
    ///
    /// Best-effort snapshot: a `false` result may be stale by the time the
    /// caller acts on it.
    pub fn is_ready(&self) -> bool {
        self.shared
            .slot
            .lock()
            .expect("contract lock poisoned")
            .is_some()
    }
}

/// Producer half of a contract, owned by the queued job closure.
///
/// Fulfills the slot at most once. If the closure is dropped without running
/// (the pool discarded it during a hard stop), the writer's `Drop` fulfills
/// the contract with `Cancelled` so consumers never block forever.
pub(crate) struct ContractWriter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> ContractWriter<T> {
    pub(crate) fn fulfill(self, value: Result<T>) {
        self.write(value);
        // Drop runs next but finds the slot occupied.
    }

    fn write(&self, value: Result<T>) {
        let mut slot = self.shared.slot.lock().expect("contract lock poisoned");
        if slot.is_none() {
            *slot = Some(value);
            self.shared.ready.notify_all();
        }
    }
}

impl<T> Drop for ContractWriter<T> {
    fn drop(&mut self) {
        self.write(Err(PoolError::Cancelled));
    }
}
