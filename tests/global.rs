//! Smoke tests for the process-wide pool façade.
//!
//! The global pool is shared by the whole process, so this file keeps to a
//! single test exercising the free functions end to end; everything else is
//! covered against isolated `Pool` instances in `tests/pool.rs`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use workpool::global;

#[test]
fn global_facade_delegates_to_one_pool() {
    assert!(global::thread_count() >= 1);

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..100 {
        let counter = Arc::clone(&counter);
        global::submit_task(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    let contract = global::submit_contract(|| 54 + 12).unwrap();
    assert_eq!(contract.get(), Ok(66));

    global::wait_for_all_jobs();
    assert_eq!(counter.load(Ordering::SeqCst), 100);
    assert!(global::all_jobs_complete());

    // Repeated calls keep returning the same instance.
    assert!(std::ptr::eq(global::instance(), global::instance()));
}
