//! Runtime configuration for the per-thread hook registry.
//!
//! # Example
//!
//! ```
//! use framehook_core::{configure, RuntimeConfig};
//!
//! configure(RuntimeConfig::default().with_buffer_capacity(256));
//! ```

/// Behavior knobs for the hook registry of the current thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of records a single event binding keeps buffered.
    ///
    /// When the buffer is full the oldest record is dropped. `None` means
    /// unbounded.
    pub buffer_capacity: Option<usize>,
    /// Tear down bindings that were not touched during a frame when that
    /// frame ends.
    ///
    /// When disabled, bindings live until [`clear_hooks`](crate::clear_hooks).
    pub teardown_unused: bool,
}

impl Default for RuntimeConfig {
    /// - `buffer_capacity = None` (unbounded)
    /// - `teardown_unused = true`
    fn default() -> Self {
        Self {
            buffer_capacity: None,
            teardown_unused: true,
        }
    }
}

impl RuntimeConfig {
    /// Bound every event buffer to `capacity` records.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Enable or disable teardown of bindings not touched during a frame.
    pub fn with_teardown_unused(mut self, teardown_unused: bool) -> Self {
        self.teardown_unused = teardown_unused;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.buffer_capacity, None);
        assert!(cfg.teardown_unused);
    }

    #[test]
    fn builders_override_defaults() {
        let cfg = RuntimeConfig::default()
            .with_buffer_capacity(8)
            .with_teardown_unused(false);
        assert_eq!(cfg.buffer_capacity, Some(8));
        assert!(!cfg.teardown_unused);
    }
}
