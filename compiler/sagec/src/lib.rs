//! Sage runtime - embeds the evaluator, the compiled tier and diagnostic
//! reporting behind one entry point.
//!
//! ```text
//! let interner = SharedInterner::new();
//! let b = AstBuilder::new(interner.clone());
//! let mut runtime = Runtime::new(RuntimeConfig::from_env(), interner);
//! let output = runtime.run(&b.root(vec![b.call("println", vec![b.string("hi")])]));
//! output.report(ColorMode::Auto);
//! ```

mod builtins;
mod config;
mod report;
mod runtime;
mod tracing_setup;

pub use builtins::register_defaults;
pub use config::{RuntimeConfig, DEFAULT_ERROR_LIMIT};
pub use report::to_diagnostic;
pub use runtime::{RunOutput, Runtime};
pub use tracing_setup::init_tracing;

pub use sage_diagnostic::ColorMode;
