//! Per-function tier state.
//!
//! ```text
//! Interpreted ──try_begin──▶ CompileAttempted ──publish──▶ Compiled
//!                                   │
//!                                   └──abandon──▶ PermanentlyInterpreted
//! ```
//!
//! `try_begin` is a compare-and-swap, so at most one compile is ever
//! attempted per function no matter how many calls race to trigger it.

use parking_lot::Mutex;
use sage_value::ValueKind;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use crate::CompiledFunction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TierState {
    Interpreted = 0,
    CompileAttempted = 1,
    Compiled = 2,
    PermanentlyInterpreted = 3,
}

impl TierState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TierState::Interpreted,
            1 => TierState::CompileAttempted,
            2 => TierState::Compiled,
            _ => TierState::PermanentlyInterpreted,
        }
    }
}

/// What a call should do, decided from the tier state and the call site's
/// counter.
#[derive(Clone, Debug)]
pub enum TierDecision {
    /// This call won the one-shot trigger: observe its arguments and queue a
    /// compile, then interpret.
    Attempt,
    /// Compiled code is installed.
    Compiled(Arc<CompiledFunction>),
    /// Interpret and count the call at its site.
    Count,
}

/// Tier bookkeeping for one function definition.
///
/// Redefining a function creates a fresh slot; a slot is never reset.
#[derive(Debug)]
pub struct JitSlot {
    state: AtomicU8,
    compiled: OnceLock<Arc<CompiledFunction>>,
    /// Argument kinds observed at the trigger, empty if observation failed.
    signature: Mutex<Vec<ValueKind>>,
}

impl Default for JitSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl JitSlot {
    pub fn new() -> Self {
        JitSlot {
            state: AtomicU8::new(TierState::Interpreted as u8),
            compiled: OnceLock::new(),
            signature: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> TierState {
        TierState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Claim the single compile attempt. Returns `false` if it was already
    /// claimed or the function left the `Interpreted` state.
    pub fn try_begin(&self) -> bool {
        self.state
            .compare_exchange(
                TierState::Interpreted as u8,
                TierState::CompileAttempted as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Install compiled code. Only the claimed attempt publishes.
    pub fn publish(&self, compiled: Arc<CompiledFunction>) {
        if self.compiled.set(compiled).is_ok() {
            self.state
                .store(TierState::Compiled as u8, Ordering::Release);
        }
    }

    /// Give up on compiling this function for good.
    pub fn abandon(&self) {
        self.state
            .store(TierState::PermanentlyInterpreted as u8, Ordering::Release);
    }

    pub fn compiled(&self) -> Option<&Arc<CompiledFunction>> {
        self.compiled.get()
    }

    pub fn signature(&self) -> Vec<ValueKind> {
        self.signature.lock().clone()
    }

    pub(crate) fn record_signature(&self, signature: Vec<ValueKind>) {
        *self.signature.lock() = signature;
    }

    /// Decide how a call proceeds.
    ///
    /// The trigger is checked first, then installed code, and only then is
    /// the call counted, so the triggering call itself is not counted.
    pub fn decide(&self, enabled: bool, site_calls: u64, threshold: u64) -> TierDecision {
        if enabled
            && site_calls >= threshold
            && self.state() == TierState::Interpreted
            && self.compiled().is_none()
            && self.try_begin()
        {
            return TierDecision::Attempt;
        }
        match self.compiled() {
            Some(compiled) => TierDecision::Compiled(Arc::clone(compiled)),
            None => TierDecision::Count,
        }
    }
}
