//! Free-function access to one process-wide [`Pool`].
//!
//! A convenience façade for programs that want a default pool without
//! threading a handle through every call site. The pool is created lazily
//! on first use, sized to the detected hardware concurrency, and lives for
//! the rest of the process. Every function here is a plain delegation to
//! the underlying [`Pool`]; no extra synchronization is introduced.
//!
//! The instance is shared by everything in the process, so tests should
//! construct their own [`Pool`] values instead of going through this
//! module.

use std::sync::OnceLock;

use crate::{Contract, Pool, Result};

static INSTANCE: OnceLock<Pool> = OnceLock::new();

/// Returns the process-wide pool, creating it on first use.
pub fn instance() -> &'static Pool {
    INSTANCE.get_or_init(Pool::new)
}

/// Enqueues a fire-and-forget job on the process-wide pool.
///
/// See [`Pool::submit_task`].
pub fn submit_task<F>(job: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    instance().submit_task(job)
}

/// Enqueues a job on the process-wide pool and returns its [`Contract`].
///
/// See [`Pool::submit_contract`].
pub fn submit_contract<F, R>(job: F) -> Result<Contract<R>>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    instance().submit_contract(job)
}

/// Resizes the process-wide pool. See [`Pool::resize`].
pub fn resize(new_count: usize) {
    instance().resize(new_count)
}

/// Returns the worker count of the process-wide pool.
pub fn thread_count() -> usize {
    instance().thread_count()
}

/// Detaches the process-wide pool's workers. See [`Pool::detach`].
pub fn detach() {
    instance().detach()
}

/// Blocks until the process-wide pool is quiescent.
///
/// See [`Pool::wait_for_all_jobs`].
pub fn wait_for_all_jobs() {
    instance().wait_for_all_jobs()
}

/// Returns `true` if the process-wide pool is quiescent.
///
/// See [`Pool::all_jobs_complete`].
pub fn all_jobs_complete() -> bool {
    instance().all_jobs_complete()
}
