use super::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_jobs_run_and_wait_idle_drains() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let pool = CompilerPool::start(2, 16, move |n: usize| {
        seen.fetch_add(n, Ordering::SeqCst);
    });
    for n in 1..=4 {
        assert_eq!(pool.submit(n), Ok(()));
    }
    pool.wait_idle();
    assert_eq!(count.load(Ordering::SeqCst), 10);
}

#[test]
fn test_full_queue_rejects_without_blocking() {
    let (started_tx, started_rx) = channel::unbounded::<()>();
    let (gate_tx, gate_rx) = channel::unbounded::<()>();
    let pool = CompilerPool::start(1, 1, move |_: u8| {
        let _ = started_tx.send(());
        let _ = gate_rx.recv();
    });

    assert_eq!(pool.submit(1), Ok(()));
    // The worker holds job 1; job 2 fills the queue.
    assert!(started_rx.recv().is_ok());
    assert_eq!(pool.submit(2), Ok(()));
    assert_eq!(pool.submit(3), Err(JitError::QueueFull));

    let _ = gate_tx.send(());
    let _ = gate_tx.send(());
    pool.wait_idle();
}

#[test]
fn test_drop_finishes_queued_jobs() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let pool = CompilerPool::start(1, 8, move |_: ()| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    for _ in 0..3 {
        assert_eq!(pool.submit(()), Ok(()));
    }
    drop(pool);
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_zero_workers_still_starts_one() {
    let pool = CompilerPool::start(0, 1, |(): ()| {});
    assert_eq!(pool.worker_count(), 1);
}

#[test]
fn test_wait_idle_on_fresh_pool_returns() {
    let pool = CompilerPool::start(1, 1, |(): ()| {});
    pool.wait_idle();
}
