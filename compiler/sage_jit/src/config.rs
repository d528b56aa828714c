//! Compiled-tier configuration.

/// Configuration for the compiled tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JitConfig {
    /// Whether hot functions are compiled at all.
    pub enabled: bool,
    /// Calls counted at a single call site before a compile is attempted.
    pub threshold: u64,
    /// Number of background compile workers. One worker serializes every
    /// compilation process-wide.
    pub workers: usize,
    /// Compile jobs that may wait for a worker; a full queue abandons the
    /// attempt.
    pub queue_capacity: usize,
}

impl Default for JitConfig {
    fn default() -> Self {
        JitConfig {
            enabled: true,
            threshold: 5,
            workers: 1,
            queue_capacity: 32,
        }
    }
}

impl JitConfig {
    /// A configuration with the compiled tier switched off.
    pub fn disabled() -> Self {
        JitConfig {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}
