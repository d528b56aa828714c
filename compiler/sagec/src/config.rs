//! Runtime configuration.
//!
//! Flag parsing belongs to whatever front end embeds the runtime; this module
//! only holds the resulting settings and can read them from `SAGE_*`
//! environment variables.

use sage_diagnostic::DiagnosticConfig;
use sage_eval::{BuiltinFn, Interpreter};
use sage_ir::{Node, Token};
use sage_jit::JitConfig;
use sage_value::EvalResult;
use std::sync::Arc;
use tracing::warn;

/// Number of errors reported when all-errors mode is off.
pub const DEFAULT_ERROR_LIMIT: usize = 3;

#[derive(Clone)]
pub struct RuntimeConfig {
    pub jit: JitConfig,
    /// Verbose `debug`-level logging, including compiled listings.
    pub debug: bool,
    /// Report every error instead of the first few.
    pub all_errors: bool,
    functions: Vec<(String, BuiltinFn)>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            jit: JitConfig::default(),
            debug: false,
            all_errors: false,
            functions: Vec::new(),
        }
    }
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl RuntimeConfig {
    /// Read `SAGE_JIT`, `SAGE_JIT_THRESHOLD`, `SAGE_JIT_WORKERS`,
    /// `SAGE_DEBUG` and `SAGE_ALL_ERRORS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`RuntimeConfig::from_env`], reading variables through `lookup`.
    ///
    /// Unparseable numbers keep the default and log a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = RuntimeConfig::default();

        if let Some(raw) = lookup("SAGE_JIT") {
            config.jit.enabled = truthy(&raw);
        }
        if let Some(raw) = lookup("SAGE_JIT_THRESHOLD") {
            match raw.trim().parse() {
                Ok(threshold) => config.jit.threshold = threshold,
                Err(e) => warn!(value = %raw, error = %e, "ignoring SAGE_JIT_THRESHOLD"),
            }
        }
        if let Some(raw) = lookup("SAGE_JIT_WORKERS") {
            match raw.trim().parse() {
                Ok(workers) => config.jit.workers = workers,
                Err(e) => warn!(value = %raw, error = %e, "ignoring SAGE_JIT_WORKERS"),
            }
        }
        config.debug = lookup("SAGE_DEBUG").is_some_and(|raw| truthy(&raw));
        config.all_errors = lookup("SAGE_ALL_ERRORS").is_some_and(|raw| truthy(&raw));
        config
    }

    #[must_use]
    pub fn with_jit(mut self, jit: JitConfig) -> Self {
        self.jit = jit;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_all_errors(mut self, all_errors: bool) -> Self {
        self.all_errors = all_errors;
        self
    }

    /// Expose a host function to scripts under `name`.
    ///
    /// Host functions are registered after the default built-ins, so they
    /// can replace one.
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&mut Interpreter, &Token, &[Node]) -> EvalResult + Send + Sync + 'static,
    {
        self.functions.push((name.into(), Arc::new(function)));
        self
    }

    pub fn functions(&self) -> &[(String, BuiltinFn)] {
        &self.functions
    }

    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        if self.all_errors {
            DiagnosticConfig::unlimited()
        } else {
            DiagnosticConfig::first(DEFAULT_ERROR_LIMIT)
        }
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.functions.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("RuntimeConfig")
            .field("jit", &self.jit)
            .field("debug", &self.debug)
            .field("all_errors", &self.all_errors)
            .field("functions", &names)
            .finish()
    }
}
