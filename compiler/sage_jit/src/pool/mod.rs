//! Bounded pool of background compile workers.
//!
//! Jobs are submitted without blocking: a full queue rejects the job rather
//! than stalling the interpreter. On `Drop` the channel is closed, workers
//! finish whatever is already queued, and every thread is joined.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;

use crate::JitError;

/// Jobs queued or running, so callers can wait for the pool to drain.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn start(&self) {
        *self.count.lock() += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.idle.wait(&mut count);
        }
    }
}

/// Decrements the pending count even if the handler panics.
struct FinishGuard<'a>(&'a Pending);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

pub struct CompilerPool<J: Send + 'static> {
    sender: Option<Sender<J>>,
    workers: Vec<thread::JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl<J: Send + 'static> CompilerPool<J> {
    /// Start `workers` threads (at least one) that run `handler` on each job.
    pub fn start<F>(workers: usize, queue_capacity: usize, handler: F) -> Self
    where
        F: Fn(J) + Send + Sync + 'static,
    {
        let (sender, receiver) = channel::bounded::<J>(queue_capacity.max(1));
        let handler = Arc::new(handler);
        let pending = Arc::new(Pending::default());

        let mut handles = Vec::with_capacity(workers.max(1));
        for index in 0..workers.max(1) {
            let receiver: Receiver<J> = receiver.clone();
            let handler = Arc::clone(&handler);
            let pending = Arc::clone(&pending);
            let spawned = thread::Builder::new()
                .name(format!("sage-jit-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        let _finish = FinishGuard(&pending);
                        handler(job);
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => tracing::warn!(worker = index, error = %e, "failed to spawn compile worker"),
            }
        }

        CompilerPool {
            // With no worker alive nothing would drain the queue.
            sender: (!handles.is_empty()).then_some(sender),
            workers: handles,
            pending,
        }
    }

    /// Queue a job without blocking.
    pub fn submit(&self, job: J) -> Result<(), JitError> {
        let Some(sender) = &self.sender else {
            return Err(JitError::PoolClosed);
        };
        self.pending.start();
        match sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.pending.finish();
                Err(match e {
                    TrySendError::Full(_) => JitError::QueueFull,
                    TrySendError::Disconnected(_) => JitError::PoolClosed,
                })
            }
        }
    }

    /// Block until every queued or running job has finished.
    pub fn wait_idle(&self) {
        self.pending.wait_idle();
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<J: Send + 'static> Drop for CompilerPool<J> {
    fn drop(&mut self) {
        // Closing the channel ends each worker's recv loop.
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("compile worker panicked");
            }
        }
    }
}

impl<J: Send + 'static> std::fmt::Debug for CompilerPool<J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerPool")
            .field("workers", &self.workers.len())
            .field("active", &self.sender.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests;
