//! Adaptive compiled tier for hot user functions.
//!
//! A function starts out interpreted. When one of its call sites has counted
//! `threshold` calls, the next call claims the function's single compile
//! attempt, records the kinds of its arguments, and queues a compile job;
//! the call itself still interprets. A background worker lowers the function
//! to bytecode specialized for those kinds, verifies it, and publishes it.
//! Later calls whose arguments match the signature run the bytecode instead
//! of the tree.
//!
//! Every failure is fail-soft: it is logged, the function is marked
//! permanently interpreted (or the single call falls back), and evaluation
//! continues. Correctness never depends on a compile succeeding.

mod bytecode;
mod config;
mod error;
mod lower;
mod pool;
mod slot;
mod stats;
mod verify;
mod vm;

use sage_ir::{FunctionDecl, SharedInterner};
use sage_value::{Value, ValueKind};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub use bytecode::{CompiledFunction, Op};
pub use config::JitConfig;
pub use error::JitError;
pub use lower::lower;
pub use pool::CompilerPool;
pub use slot::{JitSlot, TierDecision, TierState};
pub use stats::{JitStats, JitStatsSnapshot};
pub use verify::verify;
pub use vm::execute;

/// Record one kind per argument, rejecting kinds the tier cannot specialize on.
pub fn observe_signature(args: &[Value]) -> Result<Vec<ValueKind>, JitError> {
    args.iter()
        .enumerate()
        .map(|(position, arg)| match arg.kind() {
            kind @ (ValueKind::Float | ValueKind::Str | ValueKind::Bool) => Ok(kind),
            kind => Err(JitError::UnsupportedArgument { position, kind }),
        })
        .collect()
}

struct CompileJob {
    decl: Arc<FunctionDecl>,
    slot: Arc<JitSlot>,
    signature: Vec<ValueKind>,
}

/// Lower, verify and publish. Runs on a worker thread.
fn compile(job: &CompileJob, interner: &SharedInterner, stats: &JitStats) {
    let name = interner.lookup(job.decl.name.name);
    debug!(function = %name, "attempting to compile");

    let result = lower(&job.decl, &job.signature, interner).and_then(|compiled| {
        verify(&compiled, &job.decl, interner)?;
        Ok(compiled)
    });
    match result {
        Ok(compiled) => {
            debug!(function = %name, listing = %compiled, "compiled");
            job.slot.publish(Arc::new(compiled));
            stats.record_compiled();
        }
        Err(e) => {
            debug!(function = %name, error = %e, "failed to compile, bailing out to the interpreter");
            job.slot.abandon();
            stats.record_failed();
        }
    }
}

/// Handle to the compiled tier, shared by every interpreter that uses it.
pub struct Jit {
    config: JitConfig,
    interner: SharedInterner,
    stats: Arc<JitStats>,
    pool: Option<CompilerPool<CompileJob>>,
}

impl Jit {
    /// Create the tier. Workers are only started when the tier is enabled.
    pub fn new(config: JitConfig, interner: SharedInterner) -> Self {
        let stats = Arc::new(JitStats::default());
        let pool = config.enabled.then(|| {
            let interner = interner.clone();
            let stats = Arc::clone(&stats);
            CompilerPool::start(config.workers, config.queue_capacity, move |job: CompileJob| {
                let outcome = catch_unwind(AssertUnwindSafe(|| compile(&job, &interner, &stats)));
                if outcome.is_err() {
                    warn!(
                        function = %interner.lookup(job.decl.name.name),
                        "compile job panicked"
                    );
                    job.slot.abandon();
                    stats.record_failed();
                }
            })
        });
        Jit {
            config,
            interner,
            stats,
            pool,
        }
    }

    pub fn config(&self) -> &JitConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Decide how a call to the function owning `slot` proceeds.
    pub fn decide(&self, slot: &JitSlot, site_calls: u64) -> TierDecision {
        slot.decide(self.config.enabled, site_calls, self.config.threshold)
    }

    /// Act on a won trigger: observe the argument kinds and queue a compile.
    ///
    /// Never blocks and never fails the caller. Unsupported argument kinds or
    /// a rejected job leave the function permanently interpreted.
    pub fn request_compile(&self, decl: &Arc<FunctionDecl>, slot: &Arc<JitSlot>, args: &[Value]) {
        self.stats.record_trigger();
        let name = self.interner.lookup(decl.name.name);

        let signature = match observe_signature(args) {
            Ok(signature) => signature,
            Err(e) => {
                debug!(function = %name, error = %e, "skipping compilation");
                slot.record_signature(Vec::new());
                slot.abandon();
                self.stats.record_skipped();
                return;
            }
        };
        slot.record_signature(signature.clone());

        let job = CompileJob {
            decl: Arc::clone(decl),
            slot: Arc::clone(slot),
            signature,
        };
        let submitted = match &self.pool {
            Some(pool) => pool.submit(job),
            None => Err(JitError::PoolClosed),
        };
        if let Err(e) = submitted {
            debug!(function = %name, error = %e, "compile job rejected");
            slot.abandon();
            self.stats.record_skipped();
        }
    }

    /// Run compiled code, or return `None` to make the caller interpret.
    pub fn invoke(&self, compiled: &CompiledFunction, args: &[Value]) -> Option<Value> {
        if !compiled.accepts(args) {
            trace!(function = %compiled.display_name, "argument kinds differ from signature");
            self.stats.record_guard_fallback();
            return None;
        }
        match execute(compiled, args) {
            Ok(value) => {
                self.stats.record_compiled_call();
                Some(value)
            }
            Err(e) => {
                debug!(function = %compiled.display_name, error = %e, "compiled code faulted");
                self.stats.record_guard_fallback();
                None
            }
        }
    }

    pub fn stats(&self) -> JitStatsSnapshot {
        self.stats.snapshot()
    }

    /// Block until no compile job is queued or running.
    pub fn wait_idle(&self) {
        if let Some(pool) = &self.pool {
            pool.wait_idle();
        }
    }
}

impl std::fmt::Debug for Jit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jit")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
