//! Tracing subscriber setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber.
///
/// Safe to call more than once; only the first call has an effect. `RUST_LOG`
/// takes precedence over `debug`. In debug mode spans are rendered as a tree,
/// which follows nested calls and the compile requests they trigger.
pub fn init_tracing(debug: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if debug {
                EnvFilter::new("sage_eval=debug,sage_jit=debug,sagec=debug")
            } else {
                EnvFilter::new("warn")
            }
        });

        // A host may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(debug.then(|| HierarchicalLayer::new(2).with_targets(true)))
            .with((!debug).then(|| fmt::layer().with_target(true).with_level(true)))
            .with(filter)
            .try_init();
    });
}
