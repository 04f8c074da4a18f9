use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::contract::Contract;
use crate::{PoolError, Result};

/// A captured, zero-argument unit of deferred work.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queue and bookkeeping guarded by the pool's single exclusive lock.
struct Shared {
    queue: VecDeque<Job>,
    /// Workers currently executing a job (not idle). Never exceeds the
    /// worker count.
    running_threads: usize,
    /// Cleared once teardown begins; workers exit instead of dequeuing.
    running: bool,
}

impl Shared {
    fn quiescent(&self) -> bool {
        self.queue.is_empty() && self.running_threads == 0
    }
}

struct Inner {
    shared: Mutex<Shared>,
    /// Wakes workers when work arrives or stop is signaled.
    work_signal: Condvar,
    /// Wakes threads blocked in `wait_for_all_jobs`.
    quiet_signal: Condvar,
}

/// Worker-thread handles plus the logical worker count.
///
/// The count survives `detach`: detached workers keep serving the queue, so
/// `thread_count` keeps reporting them until the next resize or shutdown.
struct Workers {
    handles: Vec<JoinHandle<()>>,
    count: usize,
}

/// A fixed-size (but resizable) pool of worker threads sharing one FIFO
/// job queue.
///
/// Jobs capture all of their arguments at submission time and run to
/// completion on some worker. Submit with [`submit_task`](Pool::submit_task)
/// when completion is only observed through [`wait_for_all_jobs`](Pool::wait_for_all_jobs),
/// or with [`submit_contract`](Pool::submit_contract) to get a [`Contract`]
/// conveying the job's result.
///
/// Dropping the pool performs a hard stop: workers finish their current job
/// and exit, and jobs still queued are discarded without running. Call
/// [`drain`](Pool::drain) first (or instead) when the backlog must complete.
///
/// # Sharing state with jobs
///
/// Jobs capture by move. A job that should observe or mutate caller-owned
/// state must be given an explicitly shared handle such as an
/// `Arc<Mutex<T>>`; moving a plain value into the closure hands it a private
/// copy and the caller's binding is untouched.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use workpool::Pool;
///
/// let pool = Pool::with_threads(4);
/// let total = Arc::new(Mutex::new(0u64));
///
/// for i in 1..=100u64 {
///     let total = Arc::clone(&total);
///     pool.submit_task(move || {
///         *total.lock().unwrap() += i;
///     })
///     .unwrap();
/// }
///
/// pool.wait_for_all_jobs();
/// assert_eq!(*total.lock().unwrap(), 5050);
/// ```
pub struct Pool {
    inner: Arc<Inner>,
    workers: Mutex<Workers>,
}

impl Pool {
    /// Creates a pool with one worker per detected hardware thread.
    pub fn new() -> Pool {
        Pool::with_threads(num_cpus::get())
    }

    /// Creates a pool with `threads` workers. A count of `0` is clamped
    /// to `1` rather than reported as an error.
    pub fn with_threads(threads: usize) -> Pool {
        let threads = threads.max(1);
        let inner = Arc::new(Inner {
            shared: Mutex::new(Shared {
                queue: VecDeque::new(),
                running_threads: 0,
                running: true,
            }),
            work_signal: Condvar::new(),
            quiet_signal: Condvar::new(),
        });
        let handles = spawn_workers(&inner, threads);
        Pool {
            inner,
            workers: Mutex::new(Workers {
                handles,
                count: threads,
            }),
        }
    }

    /// Enqueues a fire-and-forget job.
    ///
    /// Lowest-overhead submission form: there is no handle, so completion is
    /// only observable through [`wait_for_all_jobs`](Pool::wait_for_all_jobs)
    /// or [`all_jobs_complete`](Pool::all_jobs_complete), and a panicking job
    /// is contained and logged but otherwise lost. Use
    /// [`submit_contract`](Pool::submit_contract) when failure must be
    /// visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolClosed`] once teardown has begun.
    pub fn submit_task<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Box::new(job))
    }

    /// Enqueues a job and returns a [`Contract`] conveying its result.
    ///
    /// The contract is fulfilled exactly once: with the job's return value,
    /// with [`PoolError::JobPanicked`] if the job panics, or with
    /// [`PoolError::Cancelled`] if a hard stop discards the job before it
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::PoolClosed`] once teardown has begun.
    pub fn submit_contract<F, R>(&self, job: F) -> Result<Contract<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (contract, writer) = Contract::new();
        self.push(Box::new(move || {
            match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(value) => writer.fulfill(Ok(value)),
                Err(payload) => writer.fulfill(Err(PoolError::JobPanicked(panic_message(
                    payload.as_ref(),
                )))),
            }
        }))?;
        Ok(contract)
    }

    fn push(&self, job: Job) -> Result<()> {
        {
            let mut shared = self.lock_shared();
            if !shared.running {
                return Err(PoolError::PoolClosed);
            }
            shared.queue.push_back(job);
        }
        self.inner.work_signal.notify_one();
        Ok(())
    }

    /// Blocks until the queue is empty and no worker is executing a job.
    ///
    /// Multiple waiters are all released together when quiescence is
    /// reached.
    pub fn wait_for_all_jobs(&self) {
        let mut shared = self.lock_shared();
        while !shared.quiescent() {
            shared = self
                .inner
                .quiet_signal
                .wait(shared)
                .expect("pool lock poisoned");
        }
    }

    /// Returns `true` if the queue is empty and no worker is executing a job.
    ///
    /// Best-effort snapshot: another thread may submit immediately after the
    /// check.
    pub fn all_jobs_complete(&self) -> bool {
        self.lock_shared().quiescent()
    }

    /// Returns the current worker count.
    pub fn thread_count(&self) -> usize {
        self.workers.lock().expect("worker set lock poisoned").count
    }

    /// Stops all current workers and spawns `new_count` fresh ones against
    /// the same queue. A count of `0` is clamped to `1`; an unchanged count
    /// is a no-op.
    ///
    /// This is a hard stop followed by a full respawn: every worker is
    /// joined (finishing its current job first), so the call is expensive
    /// and also discards any thread-local state the old workers had built
    /// up. Jobs still queued at the moment of the resize remain queued and
    /// are picked up by the new workers.
    pub fn resize(&self, new_count: usize) {
        let new_count = new_count.max(1);
        let mut workers = self.workers.lock().expect("worker set lock poisoned");
        if new_count == workers.count {
            return;
        }
        self.stop(&mut workers);
        workers.handles = spawn_workers(&self.inner, new_count);
        workers.count = new_count;
    }

    /// Releases ownership of the worker threads without joining them.
    ///
    /// The workers keep serving the queue; teardown afterwards only flips
    /// the stop flag and no longer waits for them to exit. Useful when the
    /// pool's lifetime should not bound the workers' lifetime, e.g. when
    /// process exit will reclaim them anyway.
    pub fn detach(&self) {
        let mut workers = self.workers.lock().expect("worker set lock poisoned");
        workers.handles.clear();
    }

    /// Performs a hard stop: signals every worker to exit, joins the ones
    /// still owned, and discards jobs left in the queue.
    ///
    /// Workers finish the job they are executing but dequeue nothing
    /// further. Contracts of discarded jobs are fulfilled with
    /// [`PoolError::Cancelled`]. Idempotent; also invoked by `Drop`.
    pub fn shutdown(&self) {
        let mut workers = self.workers.lock().expect("worker set lock poisoned");
        self.stop(&mut workers);
        workers.count = 0;
        // Dropping the closures cancels their contracts.
        let discarded = {
            let mut shared = self.lock_shared();
            std::mem::take(&mut shared.queue)
        };
        if !discarded.is_empty() {
            debug!("shutdown discarded {} queued jobs", discarded.len());
        }
        // The queue is now empty and every worker has exited, so any thread
        // still blocked in wait_for_all_jobs must be released here.
        self.inner.quiet_signal.notify_all();
    }

    /// Waits for every queued and in-flight job to complete, then shuts the
    /// pool down.
    ///
    /// The drain alternative to the default hard-stop teardown: nothing is
    /// discarded, at the cost of waiting out the whole backlog.
    pub fn drain(&self) {
        self.wait_for_all_jobs();
        self.shutdown();
    }

    /// Signals stop and joins every owned worker. Caller holds the worker
    /// set lock.
    fn stop(&self, workers: &mut Workers) {
        {
            let mut shared = self.lock_shared();
            shared.running = false;
        }
        self.inner.work_signal.notify_all();
        for handle in workers.handles.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked outside a job");
            }
        }
    }

    fn lock_shared(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.inner.shared.lock().expect("pool lock poisoned")
    }
}

impl Default for Pool {
    fn default() -> Self {
        Pool::new()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Marks the queue live again and spawns `count` workers against it.
fn spawn_workers(inner: &Arc<Inner>, count: usize) -> Vec<JoinHandle<()>> {
    {
        let mut shared = inner.shared.lock().expect("pool lock poisoned");
        shared.running = true;
    }
    (0..count)
        .map(|id| {
            let inner = Arc::clone(inner);
            thread::Builder::new()
                .name(format!("pool-worker-{id}"))
                .spawn(move || worker_loop(&inner, id))
                .expect("failed to spawn worker thread")
        })
        .collect()
}

/// Idle/active loop run by every worker until the stop flag is observed.
fn worker_loop(inner: &Inner, id: usize) {
    let mut shared = inner.shared.lock().expect("pool lock poisoned");
    shared.running_threads += 1;
    loop {
        shared.running_threads -= 1;
        if shared.quiescent() {
            inner.quiet_signal.notify_all();
        }
        while shared.queue.is_empty() && shared.running {
            shared = inner
                .work_signal
                .wait(shared)
                .expect("pool lock poisoned");
        }
        if !shared.running {
            debug!("worker {id}: stop observed, exiting");
            break;
        }
        shared.running_threads += 1;
        let job = shared
            .queue
            .pop_front()
            .expect("woken worker found an empty queue");
        drop(shared);
        debug!("worker {id}: executing job");
        // Catch panics so the worker loop continues
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("worker {id}: job panicked, continuing");
        }
        shared = inner.shared.lock().expect("pool lock poisoned");
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
