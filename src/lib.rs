#![deny(missing_docs)]

//! A thread pool distributing jobs from one shared FIFO queue across a
//! bounded, resizable set of worker threads.
//!
//! Work is submitted in two forms: fire-and-forget via
//! [`Pool::submit_task`], or future-returning via [`Pool::submit_contract`],
//! which hands back a [`Contract`] carrying the job's result or failure.
//! The pool supports waiting for quiescence, dynamic resizing, detaching
//! its workers, and both hard-stop and draining teardown. The [`global`]
//! module exposes the same operations on one lazily-created process-wide
//! pool.
//!
//! ```
//! use workpool::Pool;
//!
//! let pool = Pool::with_threads(4);
//! let contract = pool.submit_contract(|| 54 + 12).unwrap();
//! assert_eq!(contract.get(), Ok(66));
//! ```

mod contract;
mod error;
pub mod global;
mod pool;

pub use contract::Contract;
pub use error::{PoolError, Result};
pub use pool::Pool;
