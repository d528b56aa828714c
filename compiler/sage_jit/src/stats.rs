//! Counters for compiled-tier activity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, shared with the compile workers.
#[derive(Debug, Default)]
pub struct JitStats {
    triggers: AtomicU64,
    skipped: AtomicU64,
    compiled: AtomicU64,
    failed: AtomicU64,
    compiled_calls: AtomicU64,
    guard_fallbacks: AtomicU64,
}

/// Point-in-time copy of [`JitStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct JitStatsSnapshot {
    /// Compile attempts claimed by a call.
    pub triggers: u64,
    /// Attempts dropped before compiling: unsupported argument types or a
    /// rejected job.
    pub skipped: u64,
    pub compiled: u64,
    /// Attempts whose lowering or verification failed.
    pub failed: u64,
    /// Calls answered by compiled code.
    pub compiled_calls: u64,
    /// Calls to compiled functions that fell back to the interpreter.
    pub guard_fallbacks: u64,
}

impl JitStats {
    #[inline]
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_trigger(&self) {
        Self::bump(&self.triggers);
    }

    pub(crate) fn record_skipped(&self) {
        Self::bump(&self.skipped);
    }

    pub(crate) fn record_compiled(&self) {
        Self::bump(&self.compiled);
    }

    pub(crate) fn record_failed(&self) {
        Self::bump(&self.failed);
    }

    pub(crate) fn record_compiled_call(&self) {
        Self::bump(&self.compiled_calls);
    }

    pub(crate) fn record_guard_fallback(&self) {
        Self::bump(&self.guard_fallbacks);
    }

    pub fn snapshot(&self) -> JitStatsSnapshot {
        JitStatsSnapshot {
            triggers: self.triggers.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            compiled: self.compiled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            compiled_calls: self.compiled_calls.load(Ordering::Relaxed),
            guard_fallbacks: self.guard_fallbacks.load(Ordering::Relaxed),
        }
    }
}
